//! Source locations.
//!
//! Every node produced by the lexer, the raw parser and the semantic
//! analyser carries a [`SourceCode`]: a half-open region of the source text
//! together with the file it came from. Diagnostics point at these regions
//! rather than at raw offsets so that messages can be rendered with a
//! line/column the way `TypeError`/`FileLoadError` did in the teacher crate.

use std::{fmt::Display, rc::Rc};

use serde::Serialize;

/// A single line/column position, one-indexed like the rest of the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl LineCol {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A half-open `[start, end)` region of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceCode {
    pub file: Rc<str>,
    pub start: LineCol,
    pub end: LineCol,
}

impl SourceCode {
    pub fn new(file: Rc<str>, start: LineCol, end: LineCol) -> Self {
        Self { file, start, end }
    }

    /// A zero-width region at a single position, used for synthetic nodes
    /// (e.g. synthesised constructors) that have no real source text.
    pub fn point(file: Rc<str>, at: LineCol) -> Self {
        Self {
            file,
            start: at,
            end: at,
        }
    }

    /// The union of `self` and `other`: the smallest region spanning both.
    /// Both regions must belong to the same file.
    pub fn concat(&self, other: &SourceCode) -> SourceCode {
        debug_assert_eq!(self.file, other.file, "cannot union spans across files");
        SourceCode {
            file: self.file.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// A zero-width location immediately before this region.
    pub fn before(&self) -> SourceCode {
        SourceCode::point(self.file.clone(), self.start)
    }

    /// A zero-width location immediately after this region.
    pub fn after(&self) -> SourceCode {
        SourceCode::point(self.file.clone(), self.end)
    }
}

impl Display for SourceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}:{}", self.file, self.start)
        } else {
            write!(f, "{}:{}-{}", self.file, self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(file: &str) -> Rc<str> {
        Rc::from(file)
    }

    #[test]
    fn concat_takes_the_union() {
        let file = src("a.co");
        let a = SourceCode::new(file.clone(), LineCol::new(1, 1), LineCol::new(1, 5));
        let b = SourceCode::new(file.clone(), LineCol::new(1, 10), LineCol::new(2, 3));

        let union = a.concat(&b);

        assert_eq!(union.start, LineCol::new(1, 1));
        assert_eq!(union.end, LineCol::new(2, 3));
    }

    #[test]
    fn before_and_after_are_zero_width() {
        let file = src("a.co");
        let span = SourceCode::new(file.clone(), LineCol::new(3, 1), LineCol::new(3, 8));

        let before = span.before();
        let after = span.after();

        assert_eq!(before.start, before.end);
        assert_eq!(before.start, LineCol::new(3, 1));
        assert_eq!(after.start, after.end);
        assert_eq!(after.start, LineCol::new(3, 8));
    }
}
