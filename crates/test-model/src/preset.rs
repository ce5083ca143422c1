use codemate_model::{ModelError, ModelReply};
use serde::{Deserialize, Serialize};

/// How the fake model answers one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetResponse {
    /// A successful reply with the given text.
    #[serde(rename = "reply")]
    Reply(String),
    /// The server answered with a non-success status.
    #[serde(rename = "server_error")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The server could not be reached.
    #[serde(rename = "transport_error")]
    TransportError(String),
}

impl PresetResponse {
    /// Creates a successful preset reply.
    #[inline]
    pub fn reply<S: Into<String>>(text: S) -> Self {
        Self::Reply(text.into())
    }

    /// Creates a preset server failure.
    #[inline]
    pub fn server_error<S: Into<String>>(status: u16, body: S) -> Self {
        Self::ServerError {
            status,
            body: body.into(),
        }
    }

    /// Creates a preset transport failure.
    #[inline]
    pub fn transport_error<S: Into<String>>(description: S) -> Self {
        Self::TransportError(description.into())
    }

    pub(crate) fn to_result(&self) -> Result<ModelReply, ModelError> {
        match self {
            PresetResponse::Reply(text) => Ok(ModelReply::with_text(text)),
            PresetResponse::ServerError { status, body } => {
                Err(ModelError::server(*status, body))
            }
            PresetResponse::TransportError(description) => {
                Err(ModelError::transport(description))
            }
        }
    }
}
