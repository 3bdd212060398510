//! Browser environment seam
//!
//! The session manager needs three things from its host page: the current
//! URL's query parameters, the ability to strip a consumed parameter from
//! the visible URL (history.replaceState in a real browser), and a
//! full-page redirect. A redirect is terminal for the page load — no code
//! after it runs in that context — so the manager treats `navigate` as
//! the last effect of any flow that calls it.

use std::collections::HashMap;
use std::sync::Mutex;

/// Host-page navigation and URL inspection.
pub trait Browser {
    /// Value of a query parameter in the current URL, if present.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Remove a query parameter from the visible URL without reloading.
    fn strip_query_param(&self, name: &str);

    /// Full-page redirect. Terminal for the current page load.
    fn navigate(&self, url: &str);
}

impl<B: Browser + ?Sized> Browser for std::sync::Arc<B> {
    fn query_param(&self, name: &str) -> Option<String> {
        (**self).query_param(name)
    }

    fn strip_query_param(&self, name: &str) {
        (**self).strip_query_param(name)
    }

    fn navigate(&self, url: &str) {
        (**self).navigate(url)
    }
}

/// Recording implementation for tests and headless hosts.
///
/// `navigate` records instead of unloading the page, so assertions can
/// inspect where the manager would have sent the user.
#[derive(Default)]
pub struct RecordingBrowser {
    query: Mutex<HashMap<String, String>>,
    navigations: Mutex<Vec<String>>,
}

impl RecordingBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the page load with the given query parameters.
    pub fn with_query(params: &[(&str, &str)]) -> Self {
        let browser = Self::default();
        {
            let mut query = browser.query.lock().unwrap();
            for (name, value) in params {
                query.insert((*name).to_owned(), (*value).to_owned());
            }
        }
        browser
    }

    /// All URLs passed to `navigate`, oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Browser for RecordingBrowser {
    fn query_param(&self, name: &str) -> Option<String> {
        self.query.lock().unwrap().get(name).cloned()
    }

    fn strip_query_param(&self, name: &str) {
        self.query.lock().unwrap().remove(name);
    }

    fn navigate(&self, url: &str) {
        self.navigations.lock().unwrap().push(url.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_visible_until_stripped() {
        let browser = RecordingBrowser::with_query(&[("code", "abc123")]);
        assert_eq!(browser.query_param("code").as_deref(), Some("abc123"));

        browser.strip_query_param("code");
        assert!(browser.query_param("code").is_none());
    }

    #[test]
    fn navigations_are_recorded_in_order() {
        let browser = RecordingBrowser::new();
        browser.navigate("https://idp.example/login");
        browser.navigate("https://idp.example/logout");
        assert_eq!(
            browser.navigations(),
            vec!["https://idp.example/login", "https://idp.example/logout"]
        );
    }
}
