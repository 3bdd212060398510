//! Configuration types and loading
//!
//! Config precedence: explicit path > CONFIG_PATH env var > default file.
//! All values are fixed at start time; nothing here is a secret — the
//! client id identifies a public OAuth client, and the actual secrets
//! (tokens, verifier) only ever live in the session stores.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub idp: IdpConfig,
    pub identity: IdentityConfig,
    pub app: AppSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

/// Identity-provider tenant settings
#[derive(Debug, Deserialize)]
pub struct IdpConfig {
    pub region: String,
    /// User pool id in `{region}_{suffix}` form; the hosted-UI domain is
    /// derived from it.
    pub user_pool_id: String,
    pub client_id: String,
}

/// Identity-pool settings for credential issuance
#[derive(Debug, Deserialize)]
pub struct IdentityConfig {
    pub pool_id: String,
}

/// Application-level settings
#[derive(Debug, Deserialize)]
pub struct AppSettings {
    /// App origin: OAuth redirect target and post-logout destination.
    pub origin: String,
    pub title: String,
    /// Cache TTL for the instance-list store in the UI layer. Carried in
    /// configuration; the store itself lives outside the session core.
    #[serde(default = "default_cache_duration_ms")]
    pub cache_duration_ms: u64,
}

/// Session manager behavior knobs
#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub logout: LogoutStrategy,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            logout: LogoutStrategy::default(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl SessionSettings {
    /// Timeout applied to every token and credential request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// How `logout()` terminates the IdP session.
///
/// `IdpRedirect` round-trips through the provider's logout endpoint so
/// its own session cookies are invalidated too. `LocalOnly` clears local
/// state and returns to the app origin — the IdP cookie may survive, but
/// the flow cannot be broken by a failing logout endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoutStrategy {
    #[default]
    IdpRedirect,
    LocalOnly,
}

fn default_cache_duration_ms() -> u64 {
    60_000
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;

        if config.idp.region.is_empty() {
            return Err(common::Error::Config("idp.region must not be empty".into()));
        }

        if !config.idp.user_pool_id.contains('_') {
            return Err(common::Error::Config(format!(
                "idp.user_pool_id must be in '{{region}}_{{suffix}}' form, got: {}",
                config.idp.user_pool_id
            )));
        }

        if config.idp.client_id.is_empty() {
            return Err(common::Error::Config(
                "idp.client_id must not be empty".into(),
            ));
        }

        if config.identity.pool_id.is_empty() {
            return Err(common::Error::Config(
                "identity.pool_id must not be empty".into(),
            ));
        }

        if !config.app.origin.starts_with("http://") && !config.app.origin.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "app.origin must start with http:// or https://, got: {}",
                config.app.origin
            )));
        }

        if config.session.http_timeout_secs == 0 {
            return Err(common::Error::Config(
                "session.http_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from an explicit argument or CONFIG_PATH
    /// env var.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(p) = explicit {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("console-session.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn valid_toml() -> &'static str {
        r#"
[idp]
region = "ap-southeast-1"
user_pool_id = "ap-southeast-1_AbCdEf123"
client_id = "client-abc"

[identity]
pool_id = "ap-southeast-1:11112222-3333-4444-5555-666677778888"

[app]
origin = "https://console.example"
title = "Instance Console"
"#
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_valid_config_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, valid_toml());

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.idp.region, "ap-southeast-1");
        assert_eq!(config.idp.user_pool_id, "ap-southeast-1_AbCdEf123");
        assert_eq!(config.app.title, "Instance Console");
        assert_eq!(config.app.cache_duration_ms, 60_000);
        assert_eq!(config.session.logout, LogoutStrategy::IdpRedirect);
        assert_eq!(config.session.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn load_missing_file_errors() {
        let result = AppConfig::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn pool_id_without_underscore_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            &valid_toml().replace("ap-southeast-1_AbCdEf123", "no-underscore"),
        );

        let result = AppConfig::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("user_pool_id"),
            "error should name the field, got: {err}"
        );
    }

    #[test]
    fn origin_without_scheme_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            &valid_toml().replace("https://console.example", "console.example"),
        );
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn zero_http_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!("{}\n[session]\nhttp_timeout_secs = 0\n", valid_toml());
        let path = write_config(&dir, &toml);
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn local_only_logout_parses() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!("{}\n[session]\nlogout = \"local-only\"\n", valid_toml());
        let path = write_config(&dir, &toml);

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.session.logout, LogoutStrategy::LocalOnly);
        // Unspecified knobs in the same table still get defaults
        assert_eq!(config.session.http_timeout_secs, 30);
    }

    #[test]
    fn cache_duration_override_applies() {
        let dir = tempfile::tempdir().unwrap();
        let toml = valid_toml().replace(
            "title = \"Instance Console\"",
            "title = \"Instance Console\"\ncache_duration_ms = 5000",
        );
        let path = write_config(&dir, &toml);

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.app.cache_duration_ms, 5000);
    }

    #[test]
    fn resolve_path_explicit_arg_wins() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = AppConfig::resolve_path(Some("/explicit/wins.toml"));
        assert_eq!(path, PathBuf::from("/explicit/wins.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = AppConfig::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = AppConfig::resolve_path(None);
        assert_eq!(path, PathBuf::from("console-session.toml"));
    }
}
