//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the code verifier and S256 challenge used during the OAuth
//! authorization flow. The verifier stays with the client (persisted in the
//! navigation-scoped store across the redirect round-trip) and is sent
//! during token exchange; the challenge is included in the login URL so the
//! authorization server can verify the exchange request came from the same
//! party that initiated the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

/// Verifier length in characters. RFC 7636 allows 43-128; we use the
/// maximum.
const VERIFIER_LEN: usize = 128;

/// The 66-symbol unreserved URL alphabet RFC 7636 permits for verifiers.
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Generate a cryptographically random PKCE code verifier.
///
/// Produces 128 characters drawn from the unreserved alphabet. The random
/// source must be cryptographically secure — a predictable verifier breaks
/// the PKCE guarantee.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_LEN];
    rand::rng().fill(&mut bytes);
    bytes
        .iter()
        .map(|b| VERIFIER_CHARSET[*b as usize % VERIFIER_CHARSET.len()] as char)
        .collect()
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`, no padding.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
