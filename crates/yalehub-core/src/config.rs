// ── Platform configuration ──
//
// `RawPlatformConfig` mirrors the platform block of the host config file
// exactly as written (every field optional). `PlatformConfig::verify`
// turns it into the validated form the orchestrator runs on. Core never
// reads config files; yalehub-config does that and hands the raw block in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use yalehub_api::LockRecord;

use crate::error::CoreError;

/// Value of the `platform` key that selects our block.
pub const PLATFORM_NAME: &str = "YaleHubConnect";

const DEFAULT_REFRESH_SECS: u64 = 300;
const DEFAULT_PUSH_MS: u64 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Refresh rate used when the whole `options` block is missing.
const BARE_REFRESH_SECS: u64 = 100;

// ── Logging mode ─────────────────────────────────────────────────────

/// How chatty the adapter is.
///
/// `DebugMode` is never written in config; it comes from the process
/// `-D/--debug` flag when the config leaves logging unset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum LoggingMode {
    Debug,
    #[default]
    Standard,
    None,
    #[strum(disabled)]
    DebugMode,
}

impl LoggingMode {
    /// Pick the effective mode from the configured value and the debug flag.
    pub fn resolve(configured: Option<LoggingMode>, debug_flag: bool) -> LoggingMode {
        match configured {
            Some(mode) => mode,
            None if debug_flag => LoggingMode::DebugMode,
            None => LoggingMode::Standard,
        }
    }

    /// Whether per-lock debug detail should be emitted.
    pub fn is_debug(self) -> bool {
        matches!(self, LoggingMode::Debug | LoggingMode::DebugMode)
    }
}

// ── Raw (as-written) form ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredentials {
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub access_token: Option<SecretString>,
    #[serde(default)]
    pub is_validated: bool,
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptions {
    /// Kept as a string so an unknown value falls back instead of failing.
    pub logging: Option<String>,
    pub refresh_rate: Option<u64>,
    pub push_rate: Option<u64>,
    pub timeout: Option<u64>,
    #[serde(default)]
    pub hidden_endpoints: Vec<i64>,
}

/// The platform block as found in the host configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlatformConfig {
    pub platform: Option<String>,
    pub name: Option<String>,
    pub credentials: Option<RawCredentials>,
    pub options: Option<RawOptions>,
    pub locks: Option<Vec<LockRecord>>,
    pub home_id: Option<i64>,
    #[serde(default, deserialize_with = "entry_code::deserialize")]
    pub entry_code: Option<SecretString>,
    pub account_id: Option<i64>,
}

/// Entry codes are strings on the wire but have been stored as numbers.
mod entry_code {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<NumberOrString>::deserialize(deserializer)?.map(|v| match v {
                NumberOrString::Number(n) => SecretString::from(n.to_string()),
                NumberOrString::String(s) => SecretString::from(s),
            }),
        )
    }
}

// ── Verified form ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
    pub access_token: Option<SecretString>,
    pub is_validated: bool,
}

/// Tuning knobs, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub logging: LoggingMode,
    /// Status poll interval.
    pub refresh_rate: Duration,
    /// Debounce window for lock commands.
    pub push_rate: Duration,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    pub hidden_endpoints: Vec<i64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            logging: LoggingMode::Standard,
            refresh_rate: Duration::from_secs(DEFAULT_REFRESH_SECS),
            push_rate: Duration::from_millis(DEFAULT_PUSH_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            hidden_endpoints: Vec::new(),
        }
    }
}

impl Options {
    fn from_raw(raw: Option<&RawOptions>, debug_flag: bool) -> Self {
        let Some(raw) = raw else {
            return Self {
                logging: LoggingMode::Debug,
                refresh_rate: Duration::from_secs(BARE_REFRESH_SECS),
                ..Self::default()
            };
        };

        let configured = raw
            .logging
            .as_deref()
            .and_then(|s| s.parse::<LoggingMode>().ok());

        // Zero means "unset" for every rate.
        let nonzero = |v: Option<u64>| v.filter(|v| *v > 0);

        Self {
            logging: LoggingMode::resolve(configured, debug_flag),
            refresh_rate: Duration::from_secs(
                nonzero(raw.refresh_rate).unwrap_or(DEFAULT_REFRESH_SECS),
            ),
            push_rate: Duration::from_millis(nonzero(raw.push_rate).unwrap_or(DEFAULT_PUSH_MS)),
            timeout: Duration::from_secs(nonzero(raw.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS)),
            hidden_endpoints: raw.hidden_endpoints.clone(),
        }
    }

    pub fn is_hidden(&self, endpoint_id: i64) -> bool {
        self.hidden_endpoints.contains(&endpoint_id)
    }
}

/// Validated platform configuration.
///
/// The validation fields (`home_id`, `entry_code`, `account_id`) stay
/// optional: they are filled in by the first successful validation run.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub name: String,
    pub credentials: Credentials,
    pub options: Options,
    pub locks: Option<Vec<LockRecord>>,
    pub home_id: Option<i64>,
    pub entry_code: Option<SecretString>,
    pub account_id: Option<i64>,
}

impl PlatformConfig {
    /// Check required fields and apply option defaults.
    pub fn verify(raw: RawPlatformConfig, debug_flag: bool) -> Result<Self, CoreError> {
        let credentials = raw
            .credentials
            .ok_or_else(|| CoreError::config("Missing Credentials"))?;
        let email = credentials
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| CoreError::config("Missing YaleHub E-mail"))?;
        let password = credentials
            .password
            .filter(|p| !p.expose_secret().is_empty())
            .ok_or_else(|| CoreError::config("Missing Yale Password"))?;

        let options = Options::from_raw(raw.options.as_ref(), debug_flag);

        Ok(Self {
            name: raw.name.unwrap_or_else(|| PLATFORM_NAME.to_owned()),
            credentials: Credentials {
                email,
                password,
                access_token: credentials.access_token,
                is_validated: credentials.is_validated,
            },
            options,
            locks: raw.locks,
            home_id: raw.home_id,
            entry_code: raw.entry_code,
            account_id: raw.account_id.or(credentials.account_id),
        })
    }
}
