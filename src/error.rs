use thiserror::Error;

/// Parse-time failure for a single expression. Every variant carries the
/// byte offset (into the trimmed text) of the offending input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected {found} at position {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unknown function '{name}' at position {pos}")]
    UnknownFunction { name: String, pos: usize },
    #[error("function '{name}' takes {expected} argument(s), got {found} (position {pos})")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        pos: usize,
    },
    #[error("unbalanced parenthesis at position {pos}")]
    UnbalancedParens { pos: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::UnknownFunction { pos, .. }
            | ParseError::ArityMismatch { pos, .. }
            | ParseError::UnbalancedParens { pos } => *pos,
        }
    }
}

/// Configuration and backend errors. None of these can occur while a sweep
/// is evaluating.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("function already exists: {name}")]
    FunctionExists { name: String },
    #[error("jit internal error: {0}")]
    Internal(String),
}
