use std::collections::HashMap;

use quill_core::Location;
use serde::Serialize;
use thiserror::Error;

use crate::types::Type;

#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub name: String,
    pub location: Location,
    pub kind: SymbolKind,
    pub ty: Type,
    pub scope_id: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SymbolKind {
    Variable { mutable: bool },
    Parameter,
    Function,
}

impl SymbolKind {
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function)
    }
}

/// Conflict returned by [`SymbolTable::declare`] when the name is already
/// bound in the innermost scope. Shadowing an outer scope is not a conflict.
#[derive(Debug, Clone, Error)]
#[error("'{name}' is already declared in this scope")]
pub struct DeclareConflict {
    pub name: String,
    pub previous: Location,
}

#[derive(Debug, Clone)]
struct Scope {
    parent: Option<usize>,
    symbols: HashMap<String, Symbol>,
}

/// Lexical scope stack. Scope frames live in an arena indexed by id so the
/// finished table can still be inspected after analysis; the active chain
/// is the `stack`, innermost last. The global scope is created on
/// construction and never exited.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    stack: Vec<usize>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                symbols: HashMap::new(),
            }],
            stack: vec![0],
        }
    }

    pub fn enter_scope(&mut self) -> usize {
        let scope_id = self.scopes.len();
        self.scopes.push(Scope {
            parent: self.stack.last().copied(),
            symbols: HashMap::new(),
        });
        self.stack.push(scope_id);
        scope_id
    }

    /// Leaves the innermost scope. Exiting the global scope is a bug in the
    /// caller, not a condition to diagnose.
    pub fn exit_scope(&mut self) {
        assert!(
            self.stack.len() > 1,
            "exit_scope called without a matching enter_scope"
        );
        self.stack.pop();
    }

    /// Binds a name in the innermost scope. Names are unique per scope;
    /// the previous binding wins on conflict and the caller reports it.
    pub fn declare(
        &mut self,
        name: String,
        location: Location,
        kind: SymbolKind,
        ty: Type,
    ) -> Result<(), DeclareConflict> {
        let scope_id = self.current_scope_id();
        let scope = &mut self.scopes[scope_id];

        if let Some(previous) = scope.symbols.get(&name) {
            return Err(DeclareConflict {
                name,
                previous: previous.location,
            });
        }

        scope.symbols.insert(
            name.clone(),
            Symbol {
                name,
                location,
                kind,
                ty,
                scope_id,
            },
        );
        Ok(())
    }

    /// Innermost-first search along the active scope chain.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope_id = self.stack.last().copied();
        while let Some(id) = scope_id {
            if let Some(symbol) = self.scopes[id].symbols.get(name) {
                return Some(symbol);
            }
            scope_id = self.scopes[id].parent;
        }
        None
    }

    pub fn current_scope_id(&self) -> usize {
        *self
            .stack
            .last()
            .expect("symbol table has no active scope")
    }

    /// Number of scopes on the active chain; 1 means only the global scope
    /// is open, which is the balanced state after a full traversal.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn symbols_in_scope(&self, scope_id: usize) -> impl Iterator<Item = &Symbol> {
        self.scopes
            .get(scope_id)
            .into_iter()
            .flat_map(|scope| scope.symbols.values())
    }
}
