//! Error types for identity-provider operations

/// Errors from identity-provider operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("malformed identity token: {0}")]
    MalformedToken(String),
}

/// Result alias for identity-provider operations.
pub type Result<T> = std::result::Result<T, Error>;
