//! Configuration errors

use thiserror::Error;

/// Errors raised while reading configuration blocks
#[derive(Debug, Error)]
pub enum ConfError {
    /// Input ended before the `};` terminator
    #[error("{file}:{line}: unexpected end of file, block is expecting to be closed with \"}};\"")]
    UnterminatedBlock {
        /// Configuration file name
        file: String,
        /// Line at which scanning stopped
        line: usize,
    },

    /// Input ended inside a directive
    #[error("{file}:{line}: unexpected end of file, expecting \";\" or \"}}\"")]
    UnexpectedEof {
        /// Configuration file name
        file: String,
        /// Line at which scanning stopped
        line: usize,
    },

    /// Block text is not valid UTF-8
    #[error("{file}:{line}: block is not valid UTF-8")]
    Encoding {
        /// Configuration file name
        file: String,
        /// Line of the terminator
        line: usize,
    },

    /// A directive handler rejected its block
    #[error("{file}:{line}: \"{directive}\" failed: {message}")]
    Handler {
        /// Directive name
        directive: String,
        /// Configuration file name
        file: String,
        /// Line of the terminator
        line: usize,
        /// Handler message
        message: String,
    },

    /// IO error while loading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfError {
    /// Line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnterminatedBlock { line, .. }
            | Self::UnexpectedEof { line, .. }
            | Self::Encoding { line, .. }
            | Self::Handler { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfError>;
