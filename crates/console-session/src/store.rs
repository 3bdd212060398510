//! Key/value storage seams for session persistence
//!
//! The session manager consumes two stores through the same trait: a
//! durable store that survives full page reloads (holds the `authData`
//! JSON blob, the single source of truth for the session) and a
//! navigation-scoped store that lives only for one tab/navigation
//! lifetime (holds the PKCE verifier across the login redirect
//! round-trip). Browser hosts back these with localStorage and
//! sessionStorage; native hosts and tests use [`MemoryStore`].

use std::collections::HashMap;
use std::sync::Mutex;

/// Durable store key for the serialized session blob.
pub const AUTH_DATA_KEY: &str = "authData";

/// Navigation-scoped store key for the PKCE verifier.
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// String key/value persistence.
///
/// Only the session manager writes through this trait; external
/// collaborators read derived state from the manager instead of touching
/// storage directly.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store for native hosts and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}
