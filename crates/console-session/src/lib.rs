//! OAuth2/PKCE session core for the instance console
//!
//! An in-process finite-state session object, independent of any UI
//! framework. The host wires in the environment (two key/value stores, a
//! browser seam, a clock) and the UI layer reads derived state and issues
//! commands — it never touches storage or the identity provider directly.
//!
//! Session flow:
//! 1. UI boot calls `SessionManager::check_auth()`
//! 2. Fresh visit → PKCE pair generated, hosted-login redirect issued
//! 3. Callback → `code` redeemed with the stored verifier, session persisted
//! 4. Reload → session rehydrated from the durable `authData` blob
//! 5. Expiry → refresh grant, falling back to a fresh login on failure
//! 6. Credentials derived from the identity token via the identity pool
//! 7. `logout()` erases everything and navigates away per the configured
//!    strategy

pub mod browser;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod data;
pub mod error;
pub mod machine;
pub mod manager;
pub mod store;

pub use browser::{Browser, RecordingBrowser};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, LogoutStrategy};
pub use credentials::{CredentialIssuer, Credentials};
pub use data::{SessionData, UserProfile};
pub use error::{Error, Result};
pub use machine::{SessionAction, SessionEvent, SessionState, handle_event};
pub use manager::{Environment, SessionManager};
pub use store::{AUTH_DATA_KEY, CODE_VERIFIER_KEY, KeyValueStore, MemoryStore};
