//! Error types for the Plunk API client.
//!
//! # Design
//! Failures fall into three groups. Transport errors happen before any
//! response exists. `HttpError` covers every non-2xx status and never looks
//! at the body. Parse errors (`TimestampError`, `DataError`,
//! `DeserializationError`) are raised after a successful round-trip while
//! normalizing the payload; any one of them discards the whole response.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the Plunk clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The server answered with a status outside 200-299.
    #[error("{status} {status_text}")]
    HttpError { status: u16, status_text: String },

    /// A timestamp field was not a valid date.
    #[error("{field} could not be parsed: {value:?}")]
    TimestampError { field: &'static str, value: String },

    /// A contact `data` string was not valid JSON for the requested shape.
    #[error("contact data could not be parsed: {0}")]
    DataError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Client configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// An attachment file could not be read from disk.
    #[error("failed to read attachment {}: {source}", path.display())]
    AttachmentError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// True for failures raised while normalizing a successful response.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ApiError::TimestampError { .. }
                | ApiError::DataError(_)
                | ApiError::DeserializationError(_)
        )
    }

    /// The HTTP status code, if the server answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
