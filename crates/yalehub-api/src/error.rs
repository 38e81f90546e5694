use thiserror::Error;

/// Top-level error type for the `yalehub-api` crate.
///
/// Covers every failure mode of the Yale Connect cloud surfaces:
/// authentication, transport, HTTP status, embedded response status, and
/// payload decoding. `yalehub-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login returned a non-zero embedded status.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: i64, message: String },

    /// A call that needs a bearer token was made before `login`.
    #[error("Not logged in -- call login() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status from either API base.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Commands ────────────────────────────────────────────────────
    /// The lock/unlock command came back with a non-zero embedded status.
    #[error("Command rejected for endpoint {endpoint_id} (status {status}): {message}")]
    Rejected {
        endpoint_id: i64,
        status: i64,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Home-scoped calls were made before the home context was set.
    #[error("Home context not set -- validate the account first")]
    HomeNotConfigured,
}

impl Error {
    /// Returns `true` if this is a transient network failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
