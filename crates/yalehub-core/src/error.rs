// ── Core error types ──
//
// User-facing errors from yalehub-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<yalehub_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Yale Connect at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Lock not found: endpoint {endpoint_id}")]
    LockNotFound { endpoint_id: i64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Command rejected by Yale Connect: {message}")]
    Rejected { message: String },

    #[error("Account validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Lock controller for endpoint {endpoint_id} has stopped")]
    ControllerStopped { endpoint_id: i64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to persist configuration: {message}")]
    Persistence { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<yalehub_api::Error> for CoreError {
    fn from(err: yalehub_api::Error) -> Self {
        match err {
            yalehub_api::Error::Authentication { status, message } => {
                CoreError::AuthenticationFailed {
                    message: format!("{message} (status {status})"),
                }
            }
            yalehub_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "not logged in".into(),
            },
            yalehub_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            yalehub_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            yalehub_api::Error::Http { status: 401, body } => CoreError::AuthenticationFailed {
                message: format!("token rejected: {body}"),
            },
            yalehub_api::Error::Http { status, body } => CoreError::Api {
                message: body,
                status: Some(status),
            },
            yalehub_api::Error::Rejected {
                endpoint_id,
                status,
                message,
            } => CoreError::Rejected {
                message: format!("endpoint {endpoint_id}: {message} (status {status})"),
            },
            yalehub_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            yalehub_api::Error::HomeNotConfigured => CoreError::Config {
                message: "home id and entry code are not set; validate the account first".into(),
            },
        }
    }
}
