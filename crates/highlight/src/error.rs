use std::sync::Arc;
use thiserror::Error;

/// Result type for highlighting operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Errors that can occur while loading, tokenizing or rendering sources.
///
/// Cloneable so that every caller attached to a coalesced load observes the
/// same failure.
#[derive(Error, Debug, Clone)]
pub enum HighlightError {
    /// Reading a source file failed
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Lexer rejected the file content
    #[error("tokenize {path}: {reason}")]
    Tokenize { path: String, reason: String },

    /// Line numbers start at 1
    #[error("invalid line number: {0}")]
    InvalidLine(usize),

    /// Markup pass aborted via its cancel flag
    #[error("highlighting cancelled")]
    Cancelled,

    /// Enrichment task panicked or was aborted
    #[error("markup task failed: {0}")]
    Task(String),
}

impl HighlightError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub fn tokenize(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tokenize {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
