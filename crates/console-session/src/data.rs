//! Session data and its durable serialization
//!
//! `SessionData` is the full token set plus the user projection derived
//! from the identity token. The whole struct is written to the durable
//! store as one JSON blob under `authData` and rehydrated on reload —
//! fields are set and cleared together, never partially. The in-memory
//! copy held by the session manager is a cache of that blob.

use cognito_auth::{TokenResponse, decode_claims};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User projection extracted from the identity token payload.
///
/// Never independently authoritative — recomputed on every token
/// issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
}

/// One authenticated session's tokens and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id_token: String,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry as unix epoch milliseconds.
    pub expires_at: u64,
    pub user: UserProfile,
}

impl SessionData {
    /// Build session data from a token endpoint response.
    ///
    /// `expires_in` (a seconds delta) becomes an absolute millisecond
    /// timestamp against the injected clock's `now`. When the provider
    /// omits a refresh token — the normal refresh-grant case — the
    /// previously held one is kept.
    pub fn from_tokens(
        tokens: &TokenResponse,
        now_millis: u64,
        previous_refresh: Option<String>,
    ) -> Result<Self> {
        let claims =
            decode_claims(&tokens.id_token).map_err(|e| Error::MalformedToken(e.to_string()))?;

        Ok(Self {
            id_token: tokens.id_token.clone(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone().or(previous_refresh),
            expires_at: now_millis + tokens.expires_in * 1000,
            user: UserProfile {
                email: claims.email,
                username: claims.username,
            },
        })
    }

    /// Serialize for the durable store.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::StorageParse(e.to_string()))
    }

    /// Rehydrate from the durable store.
    ///
    /// Any parse failure is a `StorageParse` — the caller treats that
    /// identically to "no session".
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::StorageParse(e.to_string()))
    }

    /// Whether the tokens are stale and refresh (or re-login) is due.
    pub fn is_expired(&self, now_millis: u64) -> bool {
        now_millis > self.expires_at
    }
}
