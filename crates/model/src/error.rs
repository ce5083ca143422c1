use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The server was reachable but answered with a non-success status.
    Server,
    /// The server could not be reached, or the exchange broke down before
    /// a usable response was received.
    Transport,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Server => write!(f, "Server error"),
            ErrorKind::Transport => write!(f, "Transport error"),
        }
    }
}

/// An error returned by a model provider.
///
/// The `Display` output is the text shown to the user in place of a reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelError {
    /// The server answered with a non-success HTTP status.
    Server {
        /// The HTTP status code.
        status: u16,
        /// The raw response body.
        body: String,
    },
    /// The request never produced a usable response.
    Transport {
        /// Description of the underlying failure.
        description: String,
    },
}

impl ModelError {
    /// Creates a new error with the `Server` kind.
    #[inline]
    pub fn server<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Server {
            status,
            body: body.into(),
        }
    }

    /// Creates a new error with the `Transport` kind.
    #[inline]
    pub fn transport<S: Into<String>>(description: S) -> Self {
        Self::Transport {
            description: description.into(),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::Server { .. } => ErrorKind::Server,
            ModelError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Returns the HTTP status code, if the server produced one.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Server { status, .. } => Some(*status),
            ModelError::Transport { .. } => None,
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Server { status, body } => {
                write!(f, "Error: {status} - {body}")
            }
            ModelError::Transport { description } => {
                write!(f, "Request failed: {description}")
            }
        }
    }
}

impl Error for ModelError {}
