//! Downstream credential issuance
//!
//! Exchanges the current identity token for short-lived cloud credentials
//! through the regional identity-pool service: `GetId` resolves the
//! federated identity, `GetCredentialsForIdentity` returns scoped keys.
//! Both are unsigned `x-amz-json-1.1` POSTs carrying the identity token
//! as a federated login assertion.
//!
//! Issued credentials are tagged with a digest of the identity token they
//! were derived from. The issuer cannot detect that the session rotated
//! its token, so the tag makes staleness an explicit comparison for the
//! caller instead of an implicit convention.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::Secret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};

/// Short-lived downstream credentials scoped to the identity pool.
///
/// The secret material is wrapped so a derived `Debug` can never leak it
/// into logs. Credentials are never persisted — they are recomputed
/// whenever the identity token changes.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: Secret<String>,
    pub session_token: Secret<String>,
    /// Provider-reported expiry as epoch seconds, when present.
    pub expiration: Option<f64>,
    source_token_digest: String,
}

impl Credentials {
    /// Whether these credentials were derived from the given identity
    /// token. A mismatch means they are stale and must be reissued.
    pub fn derived_from(&self, id_token: &str) -> bool {
        self.source_token_digest == token_digest(id_token)
    }
}

fn token_digest(id_token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(id_token.as_bytes()))
}

#[derive(Debug, Deserialize)]
struct GetIdResponse {
    #[serde(rename = "IdentityId")]
    identity_id: String,
}

#[derive(Debug, Deserialize)]
struct GetCredentialsResponse {
    #[serde(rename = "Credentials")]
    credentials: WireCredentials,
}

#[derive(Debug, Deserialize)]
struct WireCredentials {
    #[serde(rename = "AccessKeyId")]
    access_key_id: String,
    #[serde(rename = "SecretKey")]
    secret_key: String,
    #[serde(rename = "SessionToken")]
    session_token: String,
    #[serde(rename = "Expiration")]
    expiration: Option<f64>,
}

/// Client for the identity-pool credential service.
pub struct CredentialIssuer {
    http: reqwest::Client,
    endpoint: String,
    identity_pool_id: String,
    provider_name: String,
    timeout: Duration,
}

impl CredentialIssuer {
    /// Issuer against the regional service endpoint.
    pub fn new(
        http: reqwest::Client,
        region: &str,
        identity_pool_id: String,
        provider_name: String,
        timeout: Duration,
    ) -> Self {
        Self::with_endpoint(
            http,
            format!("https://cognito-identity.{region}.amazonaws.com/"),
            identity_pool_id,
            provider_name,
            timeout,
        )
    }

    /// Issuer against an explicit endpoint (local stacks, tests).
    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: String,
        identity_pool_id: String,
        provider_name: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            identity_pool_id,
            provider_name,
            timeout,
        }
    }

    /// Exchange an identity token for downstream credentials.
    ///
    /// Must be re-invoked whenever the identity token changes; the
    /// returned credentials carry the tag that makes that check cheap.
    pub async fn issue(&self, id_token: &str) -> Result<Credentials> {
        let mut logins = serde_json::Map::new();
        logins.insert(
            self.provider_name.clone(),
            serde_json::Value::String(id_token.to_owned()),
        );
        let logins = serde_json::Value::Object(logins);

        let identity: GetIdResponse = self
            .call(
                "AWSCognitoIdentityService.GetId",
                &serde_json::json!({
                    "IdentityPoolId": self.identity_pool_id,
                    "Logins": logins,
                }),
            )
            .await?;
        debug!(identity_id = %identity.identity_id, "resolved federated identity");

        let response: GetCredentialsResponse = self
            .call(
                "AWSCognitoIdentityService.GetCredentialsForIdentity",
                &serde_json::json!({
                    "IdentityId": identity.identity_id,
                    "Logins": logins,
                }),
            )
            .await?;

        let wire = response.credentials;
        Ok(Credentials {
            access_key_id: wire.access_key_id,
            secret_access_key: Secret::new(wire.secret_key),
            session_token: Secret::new(wire.session_token),
            expiration: wire.expiration,
            source_token_digest: token_digest(id_token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        target: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let payload = serde_json::to_string(body)
            .map_err(|e| Error::CredentialIssuance(format!("encoding {target} request: {e}")))?;

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("content-type", "application/x-amz-json-1.1")
            .header("x-amz-target", target)
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::CredentialIssuance(format!("{target} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::CredentialIssuance(format!(
                "{target} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::CredentialIssuance(format!("invalid {target} response: {e}")))
    }
}
