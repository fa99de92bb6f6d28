//! Parser configuration.

/// Tunables shared by the pipeline layers.
///
/// ## Examples
/// ```rust
/// use strata_syntax::ParserConfig;
///
/// let config = ParserConfig::new().with_max_token_length(80).with_doc_comments(false);
/// assert_eq!(config.max_token_length, 80);
/// assert!(!config.doc_comments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Longest token, in characters, before the lexer cuts it and reports `TooManyCharacters`.
    pub max_token_length: usize,
    /// Report `///` comments as `DOC_COMMENT` (otherwise they are plain line comments).
    pub doc_comments: bool,
    /// Bytes fed to the lexer per step by the pipeline driver.
    pub chunk_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_token_length: 64 * 1024,
            doc_comments: true,
            chunk_size: 4096,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_token_length(mut self, max: usize) -> Self {
        self.max_token_length = max.max(1);
        self
    }

    pub fn with_doc_comments(mut self, enabled: bool) -> Self {
        self.doc_comments = enabled;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }
}
