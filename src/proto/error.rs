use std::io;

use thiserror::Error;

/// Result type alias for redbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the connection adapter and the native client beneath it.
///
/// Variants fall into a small number of [`ErrorKind`]s; callers that only
/// care about the category should match on [`Error::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An IO error occurred.
    #[error("IO error: {source}")]
    Io {
        /// The underlying IO error.
        #[from]
        source: io::Error,
    },

    /// A protocol error occurred.
    #[error("protocol error: {message}")]
    Protocol {
        /// Description of the error.
        message: String,
    },

    /// The server returned an error.
    #[error("server error: {message}")]
    Server {
        /// Error message from server.
        message: String,
    },

    /// Authentication failed.
    #[error("authentication failed")]
    Auth,

    /// A connect or read deadline elapsed.
    #[error("timed out after {millis}ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        millis: u64,
    },

    /// Invalid argument provided. Raised before any command is sent.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of invalid argument.
        message: String,
    },

    /// The operation cannot run in the connection's current execution mode.
    #[error("{operation} is not supported {context}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Why it was rejected, e.g. "in pipeline mode".
        context: &'static str,
    },

    /// The requested capability is not available with the current configuration.
    #[error("invalid resource usage: {message}")]
    ResourceUsage {
        /// Description of the missing capability.
        message: String,
    },

    /// A handle was used after it was closed.
    #[error("invalid API usage: {message}")]
    InvalidApiUsage {
        /// Description of the misuse.
        message: String,
    },
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied value failed a precondition.
    IllegalArgument,
    /// The operation is incompatible with the current execution mode.
    UnsupportedOperation,
    /// A capability is missing from the configuration.
    ResourceUsage,
    /// A closed cursor or connection was used.
    InvalidApiUsage,
    /// Transport, protocol or server failure from the native client.
    DataAccess,
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument { .. } => ErrorKind::IllegalArgument,
            Error::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Error::ResourceUsage { .. } => ErrorKind::ResourceUsage,
            Error::InvalidApiUsage { .. } => ErrorKind::InvalidApiUsage,
            Error::Io { .. }
            | Error::Protocol { .. }
            | Error::Server { .. }
            | Error::Auth
            | Error::Timeout { .. } => ErrorKind::DataAccess,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    pub(crate) fn server(raw: &[u8]) -> Self {
        Error::Server {
            message: String::from_utf8_lossy(raw).into_owned(),
        }
    }
}
