//! Source positions.
//!
//! Positions are tracked by the lexer while it consumes characters and are copied verbatim into every token
//! produced downstream, so the three parser layers never recompute them.

use std::fmt;
use std::sync::Arc;

/// An immutable position in a source text.
///
/// ## Notes
/// - `line` and `column` are 1-based; `column` counts Unicode scalar values.
/// - `offset` is the absolute UTF-8 byte offset from the start of the source.
/// - A `\r\n` pair is a single line break: the line advances on `\r` and the `\n` only moves the offset.
///
/// ## Examples
/// ```rust
/// use strata_core::TextPos;
///
/// let end = TextPos::START.advance('\r', None).advance('\n', Some('\r'));
/// assert_eq!(end, TextPos::new(2, 1, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextPos {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl TextPos {
    /// Position of the first character of a source.
    pub const START: TextPos = TextPos {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Return the position after consuming `c`.
    ///
    /// ## Parameters
    /// - `c`: the consumed character.
    /// - `prev`: the character consumed just before `c`, needed to fold `\r\n` into one line break.
    pub fn advance(self, c: char, prev: Option<char>) -> TextPos {
        let offset = self.offset + c.len_utf8();
        match c {
            '\n' if prev == Some('\r') => TextPos { offset, ..self },
            '\n' | '\r' => TextPos {
                line: self.line + 1,
                column: 1,
                offset,
            },
            _ => TextPos {
                column: self.column + 1,
                offset,
                ..self
            },
        }
    }

    /// Return the position after consuming every character of `text`.
    pub fn advance_str(self, text: &str) -> TextPos {
        let mut pos = self;
        let mut prev = None;
        for c in text.chars() {
            pos = pos.advance(c, prev);
            prev = Some(c);
        }
        pos
    }
}

impl Default for TextPos {
    fn default() -> Self {
        TextPos::START
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A located range within a named source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub source_id: Arc<str>,
    pub start: TextPos,
    pub end: TextPos,
}

impl SourceLocation {
    pub fn new(source_id: Arc<str>, start: TextPos, end: TextPos) -> Self {
        Self { source_id, start, end }
    }

    /// A zero-width location at `pos`.
    pub fn point(source_id: Arc<str>, pos: TextPos) -> Self {
        Self::new(source_id, pos, pos)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_id, self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_positions() {
        assert_eq!(TextPos::START.advance_str("\n"), TextPos::new(2, 1, 1));
        assert_eq!(TextPos::START.advance_str("\r\n"), TextPos::new(2, 1, 2));
        assert_eq!(TextPos::START.advance_str("\r\r"), TextPos::new(3, 1, 2));
        assert_eq!(TextPos::START.advance_str("\n\r\n"), TextPos::new(3, 1, 3));
    }

    #[test]
    fn test_columns_count_scalars_offsets_count_bytes() {
        let pos = TextPos::START.advance_str("héllo");
        assert_eq!(pos.column, 6);
        assert_eq!(pos.offset, 6);
    }

    #[test]
    fn test_display() {
        let loc = SourceLocation::point(Arc::from("a.st"), TextPos::new(3, 7, 40));
        assert_eq!(loc.to_string(), "a.st:3:7");
    }
}
