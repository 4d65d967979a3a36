use std::collections::HashMap;

use quill_core::{Diagnostic, DiagnosticKind, Diagnostics, Location};
use quill_syntax::ast::{
    Assign, Ast, Block, Call, ErrorNode, Expr, FunctionDecl, IfStmt, ReturnStmt, Stmt, TypeRef,
    VariableDecl, WhileStmt,
};
use quill_token::{Primitive, TokenKind};

use crate::symbol_table::{SymbolKind, SymbolTable};
use crate::types::{self, FunctionType, Type};

/// Everything one analysis run produces: the finished scope/symbol
/// structure, the resolved type of every expression (keyed by its span),
/// and the diagnostics in detection order.
#[derive(Debug)]
pub struct SemanticInfo {
    pub symbol_table: SymbolTable,
    pub expr_types: HashMap<Location, Type>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
struct FunctionContext {
    name: String,
    ret: Type,
}

/// Walks the tree once, depth first, threading the scope stack and the
/// diagnostics collector through every node. Detected problems never stop
/// the traversal; the offending expression is typed `Error` and analysis
/// carries on so a run reports everything it can find.
#[derive(Debug, Default)]
pub struct SemanticAnalyzer<'src> {
    content: &'src str,
    symbol_table: SymbolTable,
    expr_types: HashMap<Location, Type>,
    diagnostics: Diagnostics,
    current_function: Option<FunctionContext>,
}

impl<'src> SemanticAnalyzer<'src> {
    pub fn new(content: &'src str) -> Self {
        Self {
            content,
            symbol_table: SymbolTable::new(),
            expr_types: HashMap::new(),
            diagnostics: Diagnostics::new(),
            current_function: None,
        }
    }

    pub fn analyze(&mut self, ast: &Ast) -> SemanticInfo {
        // pass 1: register top-level function signatures so bodies may call
        // functions declared later in the file
        for decl in &ast.decls {
            if let Stmt::Function(function) = decl {
                self.register_function(function);
            }
        }

        // pass 2: analyze bodies and global variables in source order;
        // globals are visible only from their declaration onward
        for decl in &ast.decls {
            match decl {
                Stmt::Function(function) => self.analyze_function(function),
                Stmt::Variable(variable) => self.analyze_variable_decl(variable),
                Stmt::Error(error) => self.report_error_node(error),
                other => panic!("non-declaration node at the top level: {other:?}"),
            }
        }

        SemanticInfo {
            symbol_table: std::mem::take(&mut self.symbol_table),
            expr_types: std::mem::take(&mut self.expr_types),
            diagnostics: std::mem::take(&mut self.diagnostics).items(),
        }
    }

    fn register_function(&mut self, function: &FunctionDecl) {
        let name = self.node_text(function.name);

        let params = function
            .params
            .iter()
            .map(|param| match Type::from(param.ty.name) {
                // diagnosed in pass 2 when the parameter is declared
                Type::Void => Type::Error,
                ty => ty,
            })
            .collect();
        let ret = Type::from(function.return_type.name);

        let ty = Type::Function(FunctionType {
            params,
            ret: Box::new(ret),
        });

        if let Err(conflict) =
            self.symbol_table
                .declare(name.to_string(), function.name, SymbolKind::Function, ty)
        {
            self.diagnostics.error(
                DiagnosticKind::Redeclaration,
                function.name,
                conflict.to_string(),
            );
        }
    }

    fn analyze_function(&mut self, function: &FunctionDecl) {
        let name = self.node_text(function.name).to_string();
        let ret = Type::from(function.return_type.name);

        // parameters and the body share one scope, so a local redeclaring a
        // parameter is a conflict rather than a shadow
        self.symbol_table.enter_scope();

        for param in &function.params {
            let ty = self.resolve_value_type(&param.ty, "parameters");
            let param_name = self.node_text(param.name).to_string();

            if let Err(conflict) =
                self.symbol_table
                    .declare(param_name, param.name, SymbolKind::Parameter, ty)
            {
                self.diagnostics.error(
                    DiagnosticKind::Redeclaration,
                    param.name,
                    conflict.to_string(),
                );
            }
        }

        self.current_function = Some(FunctionContext {
            name: name.clone(),
            ret: ret.clone(),
        });

        for stmt in &function.body.statements {
            self.analyze_stmt(stmt);
        }

        self.current_function = None;
        self.symbol_table.exit_scope();

        if ret != Type::Void && !block_always_returns(&function.body) {
            self.diagnostics.warning(
                DiagnosticKind::MissingReturn,
                function.name,
                format!("non-void function '{name}' does not return a value on every path"),
            );
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Variable(variable) => self.analyze_variable_decl(variable),
            Stmt::If(if_stmt) => self.analyze_if(if_stmt),
            Stmt::While(while_stmt) => self.analyze_while(while_stmt),
            Stmt::Return(return_stmt) => self.analyze_return(return_stmt),
            Stmt::Expr(expr_stmt) => {
                self.analyze_expr(&expr_stmt.expr);
            }
            Stmt::Block(block) => self.analyze_block(block),
            Stmt::Error(error) => self.report_error_node(error),
            Stmt::Function(_) => panic!("function declaration below the top level"),
        }
    }

    fn analyze_block(&mut self, block: &Block) {
        self.symbol_table.enter_scope();
        for stmt in &block.statements {
            self.analyze_stmt(stmt);
        }
        self.symbol_table.exit_scope();
    }

    fn analyze_if(&mut self, if_stmt: &IfStmt) {
        self.check_condition(&if_stmt.condition);
        self.analyze_block(&if_stmt.then_branch);
        if let Some(else_branch) = &if_stmt.else_branch {
            self.analyze_stmt(else_branch);
        }
    }

    fn analyze_while(&mut self, while_stmt: &WhileStmt) {
        self.check_condition(&while_stmt.condition);
        self.analyze_block(&while_stmt.body);
    }

    fn check_condition(&mut self, condition: &Expr) {
        let ty = self.analyze_expr(condition);
        if !ty.is_error() && ty != Type::Bool {
            self.diagnostics.error(
                DiagnosticKind::TypeMismatch,
                condition.location(),
                format!("condition must be 'bool', found '{ty}'"),
            );
        }
    }

    fn analyze_return(&mut self, return_stmt: &ReturnStmt) {
        let context = self
            .current_function
            .clone()
            .expect("return statement outside of a function body");

        match (&return_stmt.value, context.ret == Type::Void) {
            (None, true) => {}
            (None, false) => self.diagnostics.error(
                DiagnosticKind::TypeMismatch,
                return_stmt.location,
                format!(
                    "function '{}' must return a value of type '{}'",
                    context.name, context.ret
                ),
            ),
            (Some(value), true) => {
                self.analyze_expr(value);
                self.diagnostics.error(
                    DiagnosticKind::TypeMismatch,
                    value.location(),
                    format!("returning a value in void function '{}'", context.name),
                );
            }
            (Some(value), false) => {
                let ty = self.analyze_expr(value);
                if !types::is_assignable(&ty, &context.ret) {
                    self.diagnostics.error(
                        DiagnosticKind::TypeMismatch,
                        value.location(),
                        format!(
                            "returning '{ty}' but function '{}' has return type '{}'",
                            context.name, context.ret
                        ),
                    );
                }
            }
        }
    }

    fn analyze_variable_decl(&mut self, variable: &VariableDecl) {
        let name = self.node_text(variable.name).to_string();

        // the initializer is analyzed before the name is declared, so
        // `var x = x;` is a reference to an undeclared identifier
        let init_ty = variable
            .init
            .as_ref()
            .map(|init| self.analyze_expr(init));

        let declared_ty = variable
            .annotation
            .as_ref()
            .map(|annotation| self.resolve_value_type(annotation, "variables"));

        let ty = match (declared_ty, init_ty) {
            (Some(declared), Some(init)) => {
                if !types::is_assignable(&init, &declared) {
                    let init_location = variable.init.as_ref().map(|e| e.location());
                    self.diagnostics.error(
                        DiagnosticKind::TypeMismatch,
                        init_location.unwrap_or(variable.location),
                        format!("mismatched types: expected '{declared}', found '{init}'"),
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(Type::Void)) => {
                let init_location = variable.init.as_ref().map(|e| e.location());
                self.diagnostics.error(
                    DiagnosticKind::TypeMismatch,
                    init_location.unwrap_or(variable.location),
                    "'void' expression cannot be used as a value",
                );
                Type::Error
            }
            (None, Some(init)) => init,
            // the parser rejects declarations with neither a type nor a value
            (None, None) => Type::Error,
        };

        let kind = SymbolKind::Variable {
            mutable: variable.mutable,
        };
        if let Err(conflict) = self.symbol_table.declare(name, variable.name, kind, ty) {
            self.diagnostics.error(
                DiagnosticKind::Redeclaration,
                variable.name,
                conflict.to_string(),
            );
        }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Type {
        let ty = self.expr_type(expr);
        self.expr_types.insert(expr.location(), ty.clone());
        ty
    }

    fn expr_type(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Primitive(primitive) => match primitive.value {
                Primitive::Bool(_) => Type::Bool,
                Primitive::Int(_) => Type::Int,
                Primitive::Float(_) => Type::Float,
            },
            Expr::Str(_) => Type::Str,
            Expr::Ident(location) => self.resolve_identifier(*location),
            Expr::Unary(unary) => {
                let operand = self.analyze_expr(&unary.expr);
                match types::unary_result(unary.op, &operand) {
                    Some(ty) => ty,
                    None => {
                        self.diagnostics.error(
                            DiagnosticKind::InvalidOperation,
                            unary.location,
                            format!("operator '{}' cannot be applied to '{operand}'", unary.op),
                        );
                        Type::Error
                    }
                }
            }
            Expr::Binary(binary) => {
                let lhs = self.analyze_expr(&binary.lhs);
                let rhs = self.analyze_expr(&binary.rhs);
                match types::binary_result(binary.op, &lhs, &rhs) {
                    Some(ty) => ty,
                    None => {
                        self.diagnostics.error(
                            DiagnosticKind::InvalidOperation,
                            binary.location,
                            format!(
                                "operator '{}' cannot be applied to '{lhs}' and '{rhs}'",
                                binary.op
                            ),
                        );
                        Type::Error
                    }
                }
            }
            Expr::Assign(assign) => self.analyze_assignment(assign),
            Expr::Call(call) => self.analyze_call(call),
            Expr::Error(error) => {
                self.diagnostics.error(
                    DiagnosticKind::SyntaxError,
                    error.location,
                    syntax_error_message(error.token),
                );
                Type::Error
            }
        }
    }

    fn resolve_identifier(&mut self, location: Location) -> Type {
        let name = self.node_text(location);
        match self.symbol_table.lookup(name) {
            Some(symbol) => symbol.ty.clone(),
            None => {
                self.diagnostics.error(
                    DiagnosticKind::UndeclaredIdentifier,
                    location,
                    format!("reference to undeclared identifier '{name}'"),
                );
                Type::Error
            }
        }
    }

    fn analyze_assignment(&mut self, assign: &Assign) -> Type {
        let value_ty = self.analyze_expr(&assign.value);
        let name = self.node_text(assign.target);

        let (symbol_ty, kind) = match self.symbol_table.lookup(name) {
            Some(symbol) => (symbol.ty.clone(), symbol.kind),
            None => {
                self.diagnostics.error(
                    DiagnosticKind::UndeclaredIdentifier,
                    assign.target,
                    format!("assignment to undeclared identifier '{name}'"),
                );
                return Type::Error;
            }
        };

        match kind {
            SymbolKind::Function => {
                self.diagnostics.error(
                    DiagnosticKind::InvalidOperation,
                    assign.target,
                    format!("cannot assign to function '{name}'"),
                );
                return Type::Error;
            }
            SymbolKind::Variable { mutable: false } => {
                self.diagnostics.error(
                    DiagnosticKind::ConstReassignment,
                    assign.target,
                    format!("constant '{name}' cannot be reassigned"),
                );
                return symbol_ty;
            }
            SymbolKind::Variable { mutable: true } | SymbolKind::Parameter => {}
        }

        if !types::is_assignable(&value_ty, &symbol_ty) {
            self.diagnostics.error(
                DiagnosticKind::TypeMismatch,
                assign.value.location(),
                format!("mismatched types: expected '{symbol_ty}', found '{value_ty}'"),
            );
        }

        symbol_ty
    }

    fn analyze_call(&mut self, call: &Call) -> Type {
        let arg_types: Vec<Type> = call.args.iter().map(|arg| self.analyze_expr(arg)).collect();
        let name = self.node_text(call.callee);

        let (symbol_ty, kind) = match self.symbol_table.lookup(name) {
            Some(symbol) => (symbol.ty.clone(), symbol.kind),
            None => {
                self.diagnostics.error(
                    DiagnosticKind::UndeclaredIdentifier,
                    call.callee,
                    format!("call to undeclared function '{name}'"),
                );
                return Type::Error;
            }
        };

        if !kind.is_callable() {
            self.diagnostics.error(
                DiagnosticKind::InvalidOperation,
                call.callee,
                format!("'{name}' is not a function"),
            );
            return Type::Error;
        }

        let Type::Function(signature) = symbol_ty else {
            // function symbols always carry a function type
            return Type::Error;
        };

        if signature.params.len() != arg_types.len() {
            let plural = if arg_types.len() == 1 { "" } else { "s" };
            self.diagnostics.error(
                DiagnosticKind::ArityMismatch,
                call.location,
                format!(
                    "{} argument{plural} passed to function '{name}' (expected {})",
                    arg_types.len(),
                    signature.params.len()
                ),
            );
            return Type::Error;
        }

        for ((arg, arg_ty), param_ty) in call.args.iter().zip(&arg_types).zip(&signature.params) {
            if !types::is_assignable(arg_ty, param_ty) {
                self.diagnostics.error(
                    DiagnosticKind::TypeMismatch,
                    arg.location(),
                    format!("mismatched types: expected '{param_ty}', found '{arg_ty}'"),
                );
            }
        }

        *signature.ret
    }

    fn resolve_value_type(&mut self, type_ref: &TypeRef, what: &str) -> Type {
        match Type::from(type_ref.name) {
            Type::Void => {
                self.diagnostics.error(
                    DiagnosticKind::TypeMismatch,
                    type_ref.location,
                    format!("{what} cannot have type 'void'"),
                );
                Type::Error
            }
            ty => ty,
        }
    }

    fn report_error_node(&mut self, error: &ErrorNode) {
        self.diagnostics.error(
            DiagnosticKind::SyntaxError,
            error.location,
            syntax_error_message(error.token),
        );
    }

    fn node_text(&self, location: Location) -> &'src str {
        &self.content[location.to_range()]
    }
}

fn syntax_error_message(token: TokenKind) -> String {
    match token {
        TokenKind::Error(lex_error) => lex_error.to_string(),
        token => format!("unexpected token '{token}'"),
    }
}

fn block_always_returns(block: &Block) -> bool {
    block.statements.last().is_some_and(stmt_always_returns)
}

/// Structural reachability: a statement "always returns" only when every
/// path through it ends in a return. Loops never count, even `while (true)`.
fn stmt_always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => block_always_returns(block),
        Stmt::If(if_stmt) => match &if_stmt.else_branch {
            Some(else_branch) => {
                block_always_returns(&if_stmt.then_branch) && stmt_always_returns(else_branch)
            }
            None => false,
        },
        _ => false,
    }
}
