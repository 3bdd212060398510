//! Identity-token claim decoding
//!
//! The identity token is a JWT whose payload carries the user identity
//! claims. Signature verification is the authorization server's side of
//! the contract (the token travels TLS-direct from the token endpoint),
//! so this module only decodes the payload segment. Any structural
//! failure is a `MalformedToken` — the session manager treats that the
//! same as a failed exchange.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User identity claims projected from the identity token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdTokenClaims {
    pub email: String,
    #[serde(rename = "cognito:username")]
    pub username: String,
}

/// Decode the payload segment of an identity token.
pub fn decode_claims(id_token: &str) -> Result<IdTokenClaims> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedToken(
            "identity token is not a JWT (expected 3 segments)".into(),
        ));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        // Some encoders emit padded segments
        .or_else(|_| URL_SAFE.decode(parts[1]))
        .map_err(|e| Error::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&payload)
        .map_err(|e| Error::MalformedToken(format!("payload claims did not parse: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble an unsigned test JWT from a claims value.
    fn make_jwt(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        let signature = URL_SAFE_NO_PAD.encode(b"test-signature");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decodes_email_and_username() {
        let jwt = make_jwt(&serde_json::json!({
            "email": "operator@example.com",
            "cognito:username": "operator",
            "sub": "1111-2222",
            "aud": "client-abc",
        }));

        let claims = decode_claims(&jwt).unwrap();
        assert_eq!(claims.email, "operator@example.com");
        assert_eq!(claims.username, "operator");
    }

    #[test]
    fn rejects_non_jwt_input() {
        let err = decode_claims("just-an-opaque-token").unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)), "got: {err:?}");
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        let err = decode_claims("aGVhZGVy.!!!not-base64!!!.c2ln").unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)), "got: {err:?}");
    }

    #[test]
    fn rejects_payload_missing_username_claim() {
        let jwt = make_jwt(&serde_json::json!({
            "email": "operator@example.com",
        }));
        let err = decode_claims(&jwt).unwrap_err();
        assert!(matches!(err, Error::MalformedToken(_)), "got: {err:?}");
    }

    #[test]
    fn accepts_padded_base64_payload() {
        let payload = URL_SAFE.encode(
            serde_json::to_vec(&serde_json::json!({
                "email": "a@example.com",
                "cognito:username": "a",
            }))
            .unwrap(),
        );
        let jwt = format!("h.{payload}.s");

        let claims = decode_claims(&jwt).unwrap();
        assert_eq!(claims.username, "a");
    }
}
