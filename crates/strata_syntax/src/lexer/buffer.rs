//! Pending-input buffer for the streaming lexer.

/// Text received but not yet turned into tokens.
///
/// The caller appends chunks with [`TextBuffer::push_str`]; the lexer consumes from the front. Consumed text is
/// reclaimed lazily so appends stay amortised O(1).
#[derive(Debug, Default, Clone)]
pub struct TextBuffer {
    text: String,
    start: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, chunk: &str) {
        if self.start > 0 && self.start * 2 >= self.text.len() {
            self.text.drain(..self.start);
            self.start = 0;
        }
        self.text.push_str(chunk);
    }

    /// The unconsumed text.
    pub fn as_str(&self) -> &str {
        &self.text[self.start..]
    }

    pub fn len(&self) -> usize {
        self.text.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop `bytes` from the front; `bytes` must fall on a char boundary of [`Self::as_str`].
    pub(crate) fn consume(&mut self, bytes: usize) {
        debug_assert!(self.as_str().is_char_boundary(bytes));
        self.start = (self.start + bytes).min(self.text.len());
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
            start: 0,
        }
    }
}
