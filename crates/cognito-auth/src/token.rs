//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial PKCE flow completion)
//! 2. Token refresh (on session expiry)
//!
//! Both operations POST form-encoded bodies to the tenant token endpoint
//! with different grant types. Non-2xx responses are captured into the
//! error for diagnostics with code and verifier values truncated — the
//! full secrets must never appear in logs. Neither operation retries;
//! retry-vs-relogin is a session manager policy decision.

use std::time::Duration;

use common::redact_tail;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. The caller
/// converts this to an absolute unix millisecond timestamp when storing
/// the session. A refresh response usually omits `refresh_token`; the
/// caller keeps the one it already holds.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub id_token: String,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds until the id/access tokens expire (delta, not absolute)
    pub expires_in: u64,
}

/// Client for the tenant token endpoint.
///
/// Every request carries an explicit timeout — the underlying HTTP layer's
/// defaults are not relied on for flows that gate the whole UI.
pub struct TokenClient {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    redirect_uri: String,
    timeout: Duration,
}

impl TokenClient {
    pub fn new(
        http: reqwest::Client,
        token_endpoint: String,
        client_id: String,
        redirect_uri: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            token_endpoint,
            client_id,
            redirect_uri,
            timeout,
        }
    }

    /// Exchange an authorization code for tokens (initial PKCE flow).
    ///
    /// The user has authorized in the hosted UI and we received the
    /// authorization code in the callback. We send the code along with the
    /// PKCE verifier to prove we initiated the flow.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .timeout(self.timeout)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_verifier", verifier),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(
                status = status.as_u16(),
                code = %redact_tail(code, 10),
                code_verifier = %redact_tail(verifier, 10),
                "token exchange rejected"
            );
            return Err(Error::TokenExchange(format!(
                "token endpoint returned {status}: {body} (code {}, verifier {})",
                redact_tail(code, 10),
                redact_tail(verifier, 10),
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
    }

    /// Refresh id/access tokens using a refresh token.
    ///
    /// Called by the session manager when the stored session has expired.
    /// A failure here is terminal for the session — the manager clears it
    /// and forces a fresh login rather than retrying.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .timeout(self.timeout)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(Error::TokenRefresh(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::TokenRefresh(format!("invalid refresh response: {e}")))
    }
}
