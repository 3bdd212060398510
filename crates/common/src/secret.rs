//! Secret wrapper and redaction helpers for sensitive values

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value - redacted in Debug/Display/logs
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    /// Create a new secret value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value (use sparingly)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Truncate a sensitive string for diagnostics.
///
/// Authorization codes, PKCE verifiers, and tokens must never appear whole
/// in logs or error text. This keeps the first `keep` characters and marks
/// the rest as elided; values at or under `keep` characters are fully
/// elided since showing all of a short secret defeats the truncation.
pub fn redact_tail(value: &str, keep: usize) -> String {
    if value.len() <= keep {
        return "...".into();
    }
    let prefix: String = value.chars().take(keep).collect();
    format!("{prefix}...")
}
