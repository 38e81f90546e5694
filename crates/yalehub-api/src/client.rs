// Yale Connect HTTP client
//
// Wraps `reqwest::Client` with URL construction for the two API bases,
// bearer-token bookkeeping, and body decoding. Endpoint groups (auth,
// access control, sync, commands, locks) are implemented as inherent
// methods in separate files to keep this module focused on transport.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::TokenBody;
use crate::transport::{Endpoints, TransportConfig};

/// Account-scoped values discovered during validation.
///
/// Every home-scoped call (sync, lock, unlock) reads these; they are
/// written once by whoever validated the account.
#[derive(Debug, Clone)]
pub struct HomeContext {
    pub account_id: i64,
    pub home_id: i64,
    pub entry_code: SecretString,
}

/// Raw HTTP client for the Yale Connect cloud.
///
/// The access token and home context are shared by every caller holding
/// the client. `login` is the only writer of the token; the last
/// successful login wins for all subsequent requests.
pub struct YaleClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    token: ArcSwapOption<SecretString>,
    home: ArcSwapOption<HomeContext>,
}

impl YaleClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, transport.endpoints.clone()))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self {
            http,
            endpoints,
            token: ArcSwapOption::empty(),
            home: ArcSwapOption::empty(),
        }
    }

    // ── Shared state ─────────────────────────────────────────────────

    /// The token from the last successful login, if any.
    pub fn access_token(&self) -> Option<Arc<SecretString>> {
        self.token.load_full()
    }

    /// Seed the token from persisted configuration.
    pub fn set_access_token(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
    }

    /// Bind the client to a home. Required before sync and lock commands.
    pub fn set_home(&self, home: HomeContext) {
        debug!(home_id = home.home_id, account_id = home.account_id, "home context set");
        self.home.store(Some(Arc::new(home)));
    }

    pub(crate) fn require_token(&self) -> Result<Arc<SecretString>, Error> {
        self.token.load_full().ok_or(Error::NotAuthenticated)
    }

    pub(crate) fn require_home(&self) -> Result<Arc<HomeContext>, Error> {
        self.home.load_full().ok_or(Error::HomeNotConfigured)
    }

    /// The `{"Token": ...}` body fragment for HomeCloud requests.
    pub(crate) fn token_body(&self) -> TokenBody {
        TokenBody {
            token: self
                .token
                .load_full()
                .map(|t| t.expose_secret().to_owned()),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{services}/{path}`, e.g. `HomeCloudServiceAdmin.svc/Login`.
    pub(crate) fn services_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.endpoints.services.join(path)?)
    }

    /// `{apinet}/{path}`, e.g. `App/GetUpdatedObjects`.
    pub(crate) fn apinet_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.endpoints.apinet.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST a JSON body to a HomeCloud service and decode the reply.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url.path());

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// GET an apinet resource with the `access-token` header.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url.path());

        let token = self.require_token()?;
        let resp = self
            .http
            .get(url)
            .query(query)
            .header("access-token", token.expose_secret())
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Reject non-success statuses, then decode the body.
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
