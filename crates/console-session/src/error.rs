//! Error types for session operations
//!
//! Every variant maps to a recovery path inside the session manager —
//! failures are converted into state transitions at the operation
//! boundary, never surfaced to the UI collaborator as panics or raw
//! errors.

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Callback received without a prior PKCE verifier in the
    /// navigation-scoped store. The session cannot be trusted.
    #[error("authorization callback without a stored code verifier")]
    MissingVerifier,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("malformed identity token: {0}")]
    MalformedToken(String),

    #[error("stored session did not parse: {0}")]
    StorageParse(String),

    #[error("credential issuance failed: {0}")]
    CredentialIssuance(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
