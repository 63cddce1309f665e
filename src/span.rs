use core::fmt;

/// A location in source text. `index` counts characters, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.column)
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.index - self.start.index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
