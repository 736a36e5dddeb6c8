//! Error types for the client library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-success HTTP status with a message extracted from the response
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No access token available")]
    MissingAccessToken,

    #[error("No refresh token available")]
    MissingRefreshToken,
}

impl ClientError {
    /// HTTP status of an API-level failure, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<td_core::Error> for ClientError {
    fn from(value: td_core::Error) -> Self {
        match value {
            td_core::Error::InvalidInput(msg) => Self::InvalidInput(msg),
            td_core::Error::Serialization(err) => Self::Serialization(err),
        }
    }
}
