//! Status reported by every layer's `parse` step.

/// What a layer needs or offers after one `parse` call.
///
/// ## Notes
/// - `ResourceNeeded` is only reported by the term parser while it waits for a grammar.
/// - `Eof` is sticky: once reported, every further `parse` call reports it again without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    InputNeeded,
    OutputAvailable,
    ResourceNeeded,
    Eof,
}

impl std::fmt::Display for ParserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserState::InputNeeded => write!(f, "INPUT_NEEDED"),
            ParserState::OutputAvailable => write!(f, "OUTPUT_AVAILABLE"),
            ParserState::ResourceNeeded => write!(f, "RESOURCE_NEEDED"),
            ParserState::Eof => write!(f, "EOF"),
        }
    }
}
