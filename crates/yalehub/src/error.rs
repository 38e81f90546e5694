//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use yalehub_config::ConfigError;
use yalehub_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(yalehub::no_config),
        help(
            "Create a host config with a `platforms` array containing\n\
             {{ \"platform\": \"YaleHubConnect\", \"credentials\": {{ \"email\": .., \"password\": .. }} }}\n\
             Expected at: {path} (or pass --config)"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(
        code(yalehub::no_platform),
        help("Add a block with \"platform\": \"YaleHubConnect\" to {path}")
    )]
    MissingPlatform { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(yalehub::invalid_config),
        help("The YaleHubConnect block needs credentials.email and credentials.password.")
    )]
    InvalidConfig { message: String },

    #[error("Account has not been validated")]
    #[diagnostic(code(yalehub::not_validated), help("Run: yalehub validate"))]
    NotValidated,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(yalehub::auth_failed),
        help("Check the e-mail and password in the YaleHubConnect block, then run: yalehub validate")
    )]
    AuthFailed { message: String },

    #[error("Account validation failed: {message}")]
    #[diagnostic(code(yalehub::validation_failed))]
    ValidationFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Yale Connect at {url}")]
    #[diagnostic(
        code(yalehub::connection_failed),
        help("Check network connectivity.\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(yalehub::timeout),
        help("Raise options.timeout in the YaleHubConnect block.")
    )]
    Timeout,

    // ── Locks ────────────────────────────────────────────────────────
    #[error("Lock with endpoint {endpoint_id} not found")]
    #[diagnostic(code(yalehub::not_found), help("Run: yalehub locks"))]
    LockNotFound { endpoint_id: i64 },

    #[error("Command rejected: {message}")]
    #[diagnostic(
        code(yalehub::rejected),
        help("Check the entry code; re-run `yalehub validate` if it changed.")
    )]
    Rejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(yalehub::api_error))]
    Api { message: String },

    #[error("Could not save configuration: {message}")]
    #[diagnostic(code(yalehub::persistence))]
    Persistence { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(yalehub::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::ValidationFailed { .. } => exit_code::AUTH,
            Self::LockNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoConfig { .. }
            | Self::MissingPlatform { .. }
            | Self::InvalidConfig { .. }
            | Self::NotValidated => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::NoPlatforms { ref path } | ConfigError::NoPlatformBlock { ref path, .. } => {
                CliError::MissingPlatform {
                    path: path.display().to_string(),
                    message: err.to_string(),
                }
            }
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Json(e) => CliError::Json(e),
            other => CliError::InvalidConfig {
                message: other.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::LockNotFound { endpoint_id } => CliError::LockNotFound { endpoint_id },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::ValidationFailed { message } => CliError::ValidationFailed { message },
            CoreError::Config { message } => CliError::InvalidConfig { message },
            CoreError::Persistence { message } => CliError::Persistence { message },
            CoreError::Api { message, status } => CliError::Api {
                message: match status {
                    Some(s) => format!("HTTP {s}: {message}"),
                    None => message,
                },
            },
            err @ (CoreError::ControllerStopped { .. } | CoreError::Internal(_)) => CliError::Api {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "nope".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(CoreError::LockNotFound { endpoint_id: 3 });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let config = CliError::from(CoreError::Config {
            message: "Missing Credentials".into(),
        });
        assert_eq!(config.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn api_errors_carry_status() {
        let err = CliError::from(CoreError::Api {
            message: "maintenance".into(),
            status: Some(503),
        });
        assert_eq!(err.to_string(), "API error: HTTP 503: maintenance");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
