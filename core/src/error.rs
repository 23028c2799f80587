//! Error types for the paging service client.
//!
//! # Design
//! Every failure surfaces as one `ApiError`. Callers branch on the carried
//! HTTP status through `status()` and the `is_*` predicates, never on the
//! message text. Errors raised before a response arrived (`Transport`) or
//! while decoding a success body carry no status.

use thiserror::Error;

/// Errors returned by `PagientClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a failure status and a readable envelope.
    #[error("HTTP {status}: {message}")]
    Response { status: u16, message: String },

    /// A payload could not be serialized, or a body could not be decoded
    /// into the expected shape. `status` is set when the undecodable body
    /// belonged to a failure response.
    #[error("decode error: {message}")]
    Decode { status: Option<u16>, message: String },

    /// A required configuration value is absent.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A configuration value is present but cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            status: None,
            message: err.to_string(),
        }
    }

    /// HTTP status of the failure response behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            ApiError::Decode { status, .. } => *status,
            ApiError::Transport(_) | ApiError::MissingConfig(_) | ApiError::InvalidConfig(_) => {
                None
            }
        }
    }

    /// True for any error caused by a failure response from the service.
    pub fn is_http_error(&self) -> bool {
        self.status().is_some()
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_unprocessable_entity(&self) -> bool {
        self.status() == Some(422)
    }

    pub fn is_internal_server_error(&self) -> bool {
        self.status() == Some(500)
    }

    pub fn is_gateway_timeout(&self) -> bool {
        self.status() == Some(504)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
