use std::ops::Range;

use serde::Serialize;

/// Byte span of a construct in the source text.
#[derive(Debug, Default, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start_byte: start,
            end_byte: end,
        }
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    pub fn merge(&self, other: Location) -> Location {
        Location::new(self.start_byte, other.end_byte)
    }

    pub fn contains(&self, byte_offset: usize) -> bool {
        byte_offset >= self.start_byte && byte_offset <= self.end_byte
    }

    /// 1-based line and column of the start of this span within `content`.
    pub fn line_col(&self, content: &str) -> (usize, usize) {
        let offset = self.start_byte.min(content.len());
        let prefix = &content[..offset];
        let line_start = prefix.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        let line = prefix.matches('\n').count() + 1;
        let col = content[line_start..offset].chars().count() + 1;
        (line, col)
    }
}

impl From<(usize, usize)> for Location {
    fn from((start_byte, end_byte): (usize, usize)) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }
}

impl From<Range<usize>> for Location {
    fn from(range: Range<usize>) -> Self {
        Self {
            start_byte: range.start,
            end_byte: range.end,
        }
    }
}
