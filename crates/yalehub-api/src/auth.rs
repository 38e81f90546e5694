// Account authentication
//
// Token login and account-id lookup against the HomeCloud services.
// The login response carries its own status block; a non-zero status
// is an authentication failure even when HTTP says 200.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::YaleClient;
use crate::error::Error;
use crate::models::{AccountIdResponse, LoginResponse};

impl YaleClient {
    /// Authenticate with email and password.
    ///
    /// `POST HomeCloudServiceAdmin.svc/Login`. On success the returned token
    /// is stored on the client and used by every subsequent request.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.services_url("HomeCloudServiceAdmin.svc/Login")?;
        debug!("logging in");

        let body = json!({
            "token": self.token_body(),
            "eMail": email,
            "password": password.expose_secret(),
        });

        let resp: LoginResponse = self.post(url, &body).await?;
        let result = resp.login_result;
        debug!(
            login_type = result.login_type,
            status = result.response_status.status,
            "login result"
        );

        if !result.response_status.is_ok() {
            return Err(Error::Authentication {
                status: result.response_status.status,
                message: result.response_status.message(),
            });
        }

        let token = result
            .access_token
            .and_then(|t| t.token)
            .ok_or_else(|| Error::Authentication {
                status: 0,
                message: "login succeeded without an access token".into(),
            })?;

        let token = SecretString::from(token);
        self.set_access_token(token.clone());
        debug!("login successful");
        Ok(token)
    }

    /// Resolve the numeric account id for an email.
    ///
    /// `POST HomeCloudService.svc/GetAccountIDFromEmail`
    pub async fn get_account_id(&self, email: &str) -> Result<i64, Error> {
        let url = self.services_url("HomeCloudService.svc/GetAccountIDFromEmail")?;
        debug!("looking up account id");

        let body = json!({
            "token": self.token_body(),
            "email": email,
        });

        let resp: AccountIdResponse = self.post(url, &body).await?;
        debug!(account_id = resp.result.account_id, "account id resolved");
        Ok(resp.result.account_id)
    }
}
