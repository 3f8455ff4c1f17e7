use thiserror::Error;

/// Failures from the credential source. Always surfaced as a user-facing
/// message, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid e-mail or password")]
    InvalidCredentials,

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("authentication failed: {0}")]
    Other(String),
}

/// A remote record that cannot be shaped into a [`Ticket`](crate::types::Ticket).
///
/// A missing required field indicates backend schema drift, not a recoverable
/// runtime condition; the record is logged and skipped rather than aborting
/// the whole list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("record missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Failures from the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("ticket '{0}' not found")]
    NotFound(String),

    #[error("store connection closed")]
    Closed,

    #[error("write rejected: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the close-ticket operation.
#[derive(Error, Debug)]
pub enum CloseError {
    /// Blocks the action locally; no remote call is made.
    #[error("a resolution is required to close a ticket")]
    EmptyResolution,

    #[error("ticket '{0}' is already closed")]
    AlreadyClosed(String),

    /// The ticket stays open; the user may retry later.
    #[error("could not close the ticket: {0}")]
    Remote(#[from] StoreError),
}

/// Contract violation in date formatting: an absent instant reached the
/// formatter. Callers must check presence first, since closed timestamps are
/// legitimately absent for open tickets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("timestamp is absent")]
    AbsentInstant,

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

#[derive(Error, Debug)]
pub enum FixdeskError {
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Close(#[from] CloseError),

    #[error("{0}")]
    Mapping(#[from] MappingError),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FixdeskError>;
