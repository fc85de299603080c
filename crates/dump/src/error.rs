use thiserror::Error;

/// Result type for dump operations
pub type Result<T> = std::result::Result<T, DumpError>;

/// Errors that can occur while parsing a goroutine dump
#[derive(Error, Debug)]
pub enum DumpError {
    /// Record header does not match `goroutine <id> [<state>]:`
    #[error("did not get expected goroutine header: {0}")]
    MalformedHeader(String),

    /// Call line is neither `created by <expr>` nor `<expr>(<args>)`
    #[error("invalid goroutine stack: {0}")]
    MalformedCall(String),

    /// Location line is not `\t<path>:<line>( <extra>)?`
    #[error("invalid goroutine file: {0}")]
    MalformedLocation(String),

    /// Call line is the last line of its record
    #[error("missing location line after call: {0}")]
    MissingLocation(String),

    /// Numeric field out of range; `line` is the raw dump line holding it
    #[error("invalid {field} {value}: {line}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line: String,
    },

    /// Path matched none of the configured roots
    #[error("unknown component path: {0:?}")]
    UnknownRoot(String),

    /// Record without a goroutine ID or without frames
    #[error("did not find goroutine data in: {0}")]
    EmptyRecord(String),

    /// Reading the dump failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    pub(crate) fn invalid_number(
        field: &'static str,
        value: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self::InvalidNumber {
            field,
            value: value.into(),
            line: line.into(),
        }
    }

    /// Raw dump text (line, path or record) that caused the failure, if any
    pub fn offending_text(&self) -> Option<&str> {
        match self {
            Self::MalformedHeader(raw)
            | Self::MalformedCall(raw)
            | Self::MalformedLocation(raw)
            | Self::MissingLocation(raw)
            | Self::UnknownRoot(raw)
            | Self::EmptyRecord(raw) => Some(raw),
            Self::InvalidNumber { line, .. } => Some(line),
            Self::Io(_) => None,
        }
    }
}
