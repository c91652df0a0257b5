//! Error types for the remote service clients.

use thiserror::Error;

/// Errors returned by the provisioning, identity and notification clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, TLS failure or similar.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service rejected our credentials or the session could not be refreshed.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The requested resource does not exist on the remote side.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote side reported a uniqueness conflict.
    #[error("Conflict ({code}): {message}")]
    Conflict {
        /// Machine-readable code from the error envelope.
        code: String,
        /// Human-readable message from the error envelope.
        message: String,
    },

    /// Any other non-success response, with the envelope surfaced as-is.
    #[error("Remote error {status} ({code}): {message}")]
    Remote {
        /// HTTP status.
        status: u16,
        /// Machine-readable code, or `http_<status>` when the body had none.
        code: String,
        /// Human-readable message, or the raw body when it was not an envelope.
        message: String,
    },

    /// A success response carried a body we could not decode.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// `true` for failures where the outcome on the remote side is unknown.
    ///
    /// Callers must treat these as "failed/unavailable", never as success.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Transport(_) => true,
            ClientError::Remote { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::ParseError(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidConfig(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Timeout("t".into()).is_transient());
        assert!(ClientError::Transport("refused".into()).is_transient());
        assert!(ClientError::Remote {
            status: 503,
            code: "unavailable".into(),
            message: "down".into()
        }
        .is_transient());
        assert!(!ClientError::Remote {
            status: 400,
            code: "invalid_plan".into(),
            message: "bad".into()
        }
        .is_transient());
        assert!(!ClientError::Conflict {
            code: "slug_taken".into(),
            message: "taken".into()
        }
        .is_transient());
    }

    #[test]
    fn test_display_keeps_envelope() {
        let err = ClientError::Remote {
            status: 422,
            code: "invalid_timezone".into(),
            message: "Unknown timezone 'Mars/Olympus'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Remote error 422 (invalid_timezone): Unknown timezone 'Mars/Olympus'"
        );
    }
}
