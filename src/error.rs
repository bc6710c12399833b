//! Error types for oracli.
//!
//! Startup code works in `anyhow` and attaches context; everything that can
//! fail once the session is open returns [`Error`], which the dispatcher turns
//! into a single line on stderr.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while handling a single line of input, or while opening the session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database session could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A query or statement failed.
    #[error(transparent)]
    Statement(#[from] StatementError),

    /// A `:` shell command could not be launched or exited unsuccessfully.
    #[error("shell: {0}")]
    Shell(String),

    /// A history or script file could not be read or written.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A `\<c>` meta-command that does not exist.
    #[error("unknown meta-command: \\{0}")]
    UnknownMeta(char),

    /// Input that matches no command form.
    #[error("unrecognized input: {0}")]
    Unrecognized(String),

    /// Writing to the terminal failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures reported by the session for a single statement.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    #[error("statement timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Database(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
