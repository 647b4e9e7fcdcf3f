//! Error taxonomy.
//!
//! Every failure in this crate is synchronous and fatal to the
//! caller; nothing is retried.

use std::path::PathBuf;

/// Errors raised by value parsing, log recording/replay and
/// the registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value literal contained a character that is neither a
    /// hex digit nor a recognized unknown marker.
    #[error("invalid character '{1}' in value literal \"{0}\"")]
    Syntax(String, char),
    /// A pattern log is already open under this id.
    #[error("a pattern log is already open with id: {0}")]
    DuplicateOpen(String),
    /// No pattern log is open under this id.
    #[error("no pattern log open with id: {0}")]
    UnknownId(String),
    /// A read was attempted but the log file does not exist.
    #[error("no pattern log found at: {0}")]
    NotFound(PathBuf),
    /// A line read from a log did not decode into a record.
    #[error("malformed log line {0:?}: {1}")]
    MalformedLine(String, &'static str),
    /// The log was used against its fixed role.
    #[error("pattern log {0} is not open for {1}")]
    WrongMode(String, &'static str),
    /// The caller's resolver did not know a recorded target.
    #[error("unresolved target token: {0}")]
    UnresolvedTarget(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
