//! Source location tracking for diagnostics and editor services.
//!
//! Positions are zero-based `(line, character)` pairs, matching the wire
//! shape diagnostics are reported in. The lexer is the single producer of
//! ranges; every AST node carries the range from its first to its last
//! consumed token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based line/character position in a source file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Zero-based line number
    pub line: u32,
    /// Zero-based character offset within the line
    pub character: u32,
}

impl Position {
    /// Create a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// The position at the start of a file.
    pub fn zero() -> Self {
        Self::default()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// A half-open source range `[start, end)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range from explicit start/end positions.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from raw line/character quadruple.
    pub fn of(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    /// The zero-length range at the start of a file.
    pub fn zero() -> Self {
        Self::default()
    }

    /// True when `pos` falls within this range (start inclusive, end
    /// inclusive — hover and go-to-definition queries land on the closing
    /// character of a name as often as the opening one).
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// True when any part of this range lies on `line`.
    pub fn touches_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    /// The smallest range covering both `self` and `other`.
    pub fn union(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let range = Range::of(1, 4, 1, 10);
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 7)));
        assert!(range.contains(Position::new(1, 10)));
        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(2, 0)));
    }

    #[test]
    fn test_contains_multiline() {
        let range = Range::of(0, 4, 5, 1);
        assert!(range.contains(Position::new(0, 4)));
        assert!(range.contains(Position::new(2, 0)));
        assert!(range.contains(Position::new(5, 1)));
        assert!(!range.contains(Position::new(0, 3)));
        assert!(!range.contains(Position::new(5, 2)));
    }

    #[test]
    fn test_union() {
        let a = Range::of(0, 4, 0, 5);
        let b = Range::of(5, 0, 5, 1);
        let merged = a.union(&b);
        assert_eq!(merged, Range::of(0, 4, 5, 1));
    }

    #[test]
    fn test_touches_line() {
        let range = Range::of(2, 0, 4, 3);
        assert!(!range.touches_line(1));
        assert!(range.touches_line(2));
        assert!(range.touches_line(3));
        assert!(range.touches_line(4));
        assert!(!range.touches_line(5));
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 0));
        assert!(Position::new(2, 1) < Position::new(2, 4));
    }
}
