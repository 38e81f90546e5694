// Shared transport configuration for building the reqwest::Client.
//
// Both Yale Connect bases expect the same browser-style headers, so they
// are installed once as client defaults rather than on every request.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::error::Error;

/// Production base for the HomeCloud services (login, account, commands).
pub const DEFAULT_SERVICES_URL: &str = "https://yaleconnect-services.assaabloy.com/1.0/";

/// Production base for the `apinet` REST surface (access control, sync).
pub const DEFAULT_APINET_URL: &str = "https://apinet-prod.yaleconnect-services.com/api/YaleConnect/";

const ORIGIN: &str = "https://yaleconnect-services.assaabloy.com";
const REFERER: &str = "https://yaleconnect-services.assaabloy.com/yaleconnect/login";

/// The two API roots the client talks to.
///
/// Overridable so tests can point both at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub services: Url,
    pub apinet: Url,
}

impl Endpoints {
    /// Point both bases at the same root (e.g. a wiremock server).
    pub fn single(base: &Url) -> Result<Self, Error> {
        Ok(Self {
            services: base.join("services/")?,
            apinet: base.join("apinet/")?,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            services: Url::parse(DEFAULT_SERVICES_URL).expect("static services URL"),
            apinet: Url::parse(DEFAULT_APINET_URL).expect("static apinet URL"),
        }
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            endpoints: Endpoints::default(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("yalehub/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers())
            .build()
            .map_err(Error::Transport)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=\"UTF-8\""),
    );
    headers.insert(reqwest::header::ORIGIN, HeaderValue::from_static(ORIGIN));
    headers.insert(reqwest::header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(reqwest::header::REFERER, HeaderValue::from_static(REFERER));
    headers
}
