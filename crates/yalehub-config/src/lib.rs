//! Host configuration file for yalehub.
//!
//! The adapter shares one JSON document with the rest of the host: a
//! `platforms` array in which our block is tagged `"platform":
//! "YaleHubConnect"`. This crate finds that file, extracts the block
//! (with `YALEHUB_` environment overrides) and writes validation results
//! back into it without disturbing anything else.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Serialized},
    value::{Uncased, UncasedStr},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use yalehub_core::{ConfigStore, CoreError, PLATFORM_NAME, RawPlatformConfig, ValidationRecord};

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "YALEHUB_";

/// Keys of the platform block, as spelled in the file. Environment names
/// are case-insensitive, so `YALEHUB_CREDENTIALS__ISVALIDATED` lands on
/// `credentials.isValidated`.
const BLOCK_KEYS: &[&str] = &[
    "platform",
    "name",
    "credentials",
    "email",
    "password",
    "accessToken",
    "isValidated",
    "accountId",
    "options",
    "logging",
    "refreshRate",
    "pushRate",
    "timeout",
    "hiddenEndpoints",
    "locks",
    "homeId",
    "entryCode",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config file {} has no `platforms` array", path.display())]
    NoPlatforms { path: PathBuf },

    #[error("no `{platform}` platform block in {}", path.display())]
    NoPlatformBlock { path: PathBuf, platform: String },

    #[error("`credentials` in the {platform} block is not an object")]
    CredentialsNotObject { platform: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Default config file location via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "yalehub", "yalehub").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.json");
            p
        },
        |dirs| dirs.config_dir().join("config.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("yalehub");
    p
}

// ── Config file ─────────────────────────────────────────────────────

/// The host configuration document on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    env_prefix: String,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_prefix: ENV_PREFIX.to_owned(),
        }
    }

    /// Explicit path if given, else the platform default.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        Self::new(explicit.map_or_else(config_path, Path::to_path_buf))
    }

    /// Use a different environment prefix for overrides.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the whole document, keeping key order.
    pub fn read_document(&self) -> Result<Value, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The raw JSON of our platform block.
    pub fn platform_block(&self) -> Result<Value, ConfigError> {
        let mut document = self.read_document()?;
        Ok(Value::Object(self.find_block(&mut document)?.clone()))
    }

    /// Extract our block, layered with environment overrides.
    pub fn load(&self) -> Result<RawPlatformConfig, ConfigError> {
        let block = self.platform_block()?;

        let figment = Figment::new()
            .merge(Serialized::defaults(block))
            .merge(
                Env::prefixed(&self.env_prefix)
                    .split("__")
                    .map(block_key)
                    .lowercase(false),
            );

        let raw: RawPlatformConfig = figment.extract()?;
        debug!(path = %self.path.display(), "loaded platform configuration");
        Ok(raw)
    }

    /// Read-modify-write the validation fields into our block. Everything
    /// else in the document is left as it was, in its original order.
    pub fn write_validation(&self, record: &ValidationRecord) -> Result<(), ConfigError> {
        let mut document = self.read_document()?;
        let block = self.find_block(&mut document)?;

        block.insert("homeId".into(), Value::from(record.home_id));
        block.insert(
            "entryCode".into(),
            Value::from(record.entry_code.expose_secret()),
        );
        block.insert("accountId".into(), Value::from(record.account_id));

        let credentials = block
            .entry("credentials")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ConfigError::CredentialsNotObject {
                platform: PLATFORM_NAME.into(),
            })?;
        credentials.insert("isValidated".into(), Value::from(record.is_validated));
        if let Some(token) = &record.access_token {
            credentials.insert("accessToken".into(), Value::from(token.expose_secret()));
        }

        fs::write(&self.path, to_pretty_json(&document)?)?;
        info!(path = %self.path.display(), "saved validation to config");
        Ok(())
    }

    fn find_block<'a>(&self, document: &'a mut Value) -> Result<&'a mut Map<String, Value>, ConfigError> {
        let platforms = document
            .get_mut("platforms")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| ConfigError::NoPlatforms {
                path: self.path.clone(),
            })?;

        platforms
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|block| block.get("platform").and_then(Value::as_str) == Some(PLATFORM_NAME))
            .ok_or_else(|| ConfigError::NoPlatformBlock {
                path: self.path.clone(),
                platform: PLATFORM_NAME.into(),
            })
    }
}

impl ConfigStore for ConfigFile {
    fn persist_validation(&self, record: &ValidationRecord) -> Result<(), CoreError> {
        self.write_validation(record)
            .map_err(|e| CoreError::Persistence {
                message: e.to_string(),
            })
    }
}

/// Restore the file's spelling of each segment of a dotted env key.
fn block_key(key: &UncasedStr) -> Uncased<'_> {
    key.as_str()
        .split('.')
        .map(|segment| {
            BLOCK_KEYS
                .iter()
                .find(|k| k.eq_ignore_ascii_case(segment))
                .map_or_else(|| segment.to_ascii_lowercase(), |k| (*k).to_owned())
        })
        .collect::<Vec<_>>()
        .join(".")
        .into()
}

/// Pretty-print with four-space indentation.
fn to_pretty_json(value: &Value) -> Result<Vec<u8>, ConfigError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}
