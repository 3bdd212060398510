//! Cognito OAuth2/PKCE protocol layer
//!
//! Provides per-tenant endpoint derivation, PKCE generation, the two token
//! endpoint exchanges, and identity-token claim decoding. This crate is a
//! standalone library with no session state — the session manager in
//! `console-session` orchestrates it.
//!
//! Login flow:
//! 1. Session manager calls `pkce::generate_verifier()` + `pkce::compute_challenge()`
//! 2. User authorizes via the hosted UI at `IdpEndpoints::login_url()`
//! 3. Callback returns with a code; `TokenClient::exchange_code()` redeems it
//! 4. `claims::decode_claims()` projects the user out of the identity token
//! 5. On expiry, `TokenClient::refresh()` renews id/access tokens

pub mod claims;
pub mod endpoints;
pub mod error;
pub mod pkce;
pub mod token;

pub use claims::{IdTokenClaims, decode_claims};
pub use endpoints::IdpEndpoints;
pub use error::{Error, Result};
pub use pkce::{compute_challenge, generate_verifier};
pub use token::{TokenClient, TokenResponse};
