//! Session manager
//!
//! Owns the session lifecycle: boot-time classification, callback
//! handling, refresh, logout, and credential issuance. Each flow feeds
//! distilled facts into the pure state machine and executes the action it
//! returns, so the orchestration here is I/O glue around independently
//! tested transitions.
//!
//! Every failure is converted into a transition at the operation boundary
//! — usually back to a fresh login redirect. The UI collaborator only
//! reads derived state (`is_authenticated`, `user`, `credentials`) and
//! issues commands (`check_auth`, `logout`); it never needs its own error
//! handling around these calls and never touches storage directly.

use cognito_auth::{IdpEndpoints, TokenClient, pkce};
use tracing::{debug, info, warn};

use crate::browser::Browser;
use crate::clock::Clock;
use crate::config::{AppConfig, LogoutStrategy};
use crate::credentials::{CredentialIssuer, Credentials};
use crate::data::{SessionData, UserProfile};
use crate::error::Error;
use crate::machine::{self, SessionAction, SessionEvent, SessionState};
use crate::store::{AUTH_DATA_KEY, CODE_VERIFIER_KEY, KeyValueStore};

/// Host environment the session manager runs against.
///
/// Browser hosts wire localStorage, sessionStorage, window.location, and
/// the wall clock; tests and headless hosts inject the in-memory
/// implementations from this crate.
pub struct Environment {
    /// Survives full page reloads; holds the `authData` blob.
    pub durable: Box<dyn KeyValueStore + Send + Sync>,
    /// Scoped to one tab/navigation; holds the PKCE verifier.
    pub navigation: Box<dyn KeyValueStore + Send + Sync>,
    pub browser: Box<dyn Browser + Send + Sync>,
    pub clock: Box<dyn Clock + Send + Sync>,
}

/// The authentication session core.
///
/// One instance per browser context, owned by the host and passed to the
/// UI layer by reference — no ambient singleton, so tests can run
/// independent sessions side by side.
pub struct SessionManager {
    endpoints: IdpEndpoints,
    token_client: TokenClient,
    issuer: CredentialIssuer,
    origin: String,
    logout_strategy: LogoutStrategy,
    env: Environment,
    state: SessionState,
    session: Option<SessionData>,
    credentials: Option<Credentials>,
}

impl SessionManager {
    /// Production wiring from validated configuration.
    pub fn new(config: &AppConfig, env: Environment) -> Self {
        let endpoints = IdpEndpoints::new(
            &config.idp.region,
            &config.idp.user_pool_id,
            &config.idp.client_id,
        );
        let http = reqwest::Client::new();
        let timeout = config.session.http_timeout();
        let token_client = TokenClient::new(
            http.clone(),
            endpoints.token_endpoint(),
            config.idp.client_id.clone(),
            config.app.origin.clone(),
            timeout,
        );
        let issuer = CredentialIssuer::new(
            http,
            &config.idp.region,
            config.identity.pool_id.clone(),
            endpoints.provider_name(),
            timeout,
        );

        Self::with_parts(
            endpoints,
            token_client,
            issuer,
            config.app.origin.clone(),
            config.session.logout,
            env,
        )
    }

    /// Explicit wiring for tests and hosts pointing at local stacks.
    pub fn with_parts(
        endpoints: IdpEndpoints,
        token_client: TokenClient,
        issuer: CredentialIssuer,
        origin: String,
        logout_strategy: LogoutStrategy,
        env: Environment,
    ) -> Self {
        Self {
            endpoints,
            token_client,
            issuer,
            origin,
            logout_strategy,
            env,
            state: SessionState::Unauthenticated,
            session: None,
            credentials: None,
        }
    }

    // --- Derived state for the UI collaborator ---

    /// Pure predicate: tokens held and expiry not yet reached.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| self.env.clock.now_millis() < s.expires_at)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    // --- Commands ---

    /// Classify the current page load and complete every resulting
    /// transition: handle a callback, resume or refresh a stored session,
    /// or redirect to login.
    ///
    /// Runs at most once per page load, before any routing decision reads
    /// `is_authenticated`. All failures resolve internally into a
    /// redirect; nothing is thrown to the caller.
    pub async fn check_auth(&mut self) {
        let code = self.env.browser.query_param("code");
        let stored = self.env.durable.get(AUTH_DATA_KEY);

        match (code, stored) {
            (Some(code), None) => self.handle_callback(&code).await,
            (code, Some(raw)) => {
                if code.is_some() {
                    // A leftover code next to an existing session is
                    // stale; the session wins.
                    debug!("ignoring authorization code, durable session exists");
                }
                self.resume_session(&raw).await;
            }
            (None, None) => {
                if self.advance(SessionEvent::NoStoredSession) == SessionAction::RedirectToLogin {
                    self.redirect_to_login();
                }
            }
        }
    }

    /// Erase the session everywhere and navigate away.
    ///
    /// Terminal in a real browser. The configured strategy decides
    /// whether the IdP's own session cookies are invalidated via its
    /// logout endpoint or left to expire.
    pub fn logout(&mut self) {
        self.env.durable.remove(AUTH_DATA_KEY);
        self.env.navigation.remove(CODE_VERIFIER_KEY);
        self.session = None;
        self.credentials = None;
        self.advance(SessionEvent::LoggedOut);

        let url = match self.logout_strategy {
            LogoutStrategy::IdpRedirect => self.endpoints.logout_url(&self.origin),
            LogoutStrategy::LocalOnly => self.origin.clone(),
        };
        info!(strategy = ?self.logout_strategy, "logging out");
        self.env.browser.navigate(&url);
    }

    // --- Flows ---

    fn advance(&mut self, event: SessionEvent) -> SessionAction {
        let (state, action) = machine::handle_event(self.state, event);
        self.state = state;
        action
    }

    /// Redeem an authorization callback.
    async fn handle_callback(&mut self, code: &str) {
        // Strip the consumed code from the visible URL first: a reload
        // after this point must not replay the exchange.
        self.env.browser.strip_query_param("code");

        let verifier = self.env.navigation.get(CODE_VERIFIER_KEY);
        let action = self.advance(SessionEvent::CallbackReceived {
            verifier_present: verifier.is_some(),
        });

        let verifier = match (action, verifier) {
            (SessionAction::ExchangeCode, Some(verifier)) => verifier,
            _ => {
                // No verifier means this callback cannot be trusted; no
                // token endpoint call is made.
                warn!("{}", Error::MissingVerifier);
                self.redirect_to_login();
                return;
            }
        };

        let now = self.env.clock.now_millis();
        let issued = match self.token_client.exchange_code(code, &verifier).await {
            Ok(tokens) => SessionData::from_tokens(&tokens, now, None),
            Err(e) => Err(Error::TokenExchange(e.to_string())),
        };

        match issued {
            Ok(data) => {
                info!(username = %data.user.username, "session established from callback");
                self.persist(data);
                self.env.navigation.remove(CODE_VERIFIER_KEY);
                if self.advance(SessionEvent::TokensIssued) == SessionAction::IssueCredentials {
                    self.issue_credentials().await;
                }
            }
            Err(e) => {
                warn!(error = %e, "authorization callback failed, forcing fresh login");
                if self.advance(SessionEvent::ExchangeFailed) == SessionAction::RedirectToLogin {
                    self.redirect_to_login();
                }
            }
        }
    }

    /// Rehydrate from the durable store, refreshing if expired.
    async fn resume_session(&mut self, raw: &str) {
        let data = match SessionData::from_json(raw) {
            Ok(data) => data,
            Err(e) => {
                // Unparseable durable data is "no session", not an error
                // the operator ever sees.
                warn!(error = %e, "stored session did not parse, forcing fresh login");
                self.env.durable.remove(AUTH_DATA_KEY);
                if self.advance(SessionEvent::NoStoredSession) == SessionAction::RedirectToLogin {
                    self.redirect_to_login();
                }
                return;
            }
        };

        let now = self.env.clock.now_millis();
        if !data.is_expired(now) {
            self.session = Some(data);
            if self.advance(SessionEvent::StoredSessionValid) == SessionAction::IssueCredentials {
                self.issue_credentials().await;
            }
            return;
        }

        match data.refresh_token.clone() {
            Some(refresh_token) => {
                let action = self.advance(SessionEvent::StoredSessionExpired { has_refresh: true });
                if action == SessionAction::RefreshTokens {
                    self.refresh_tokens(&refresh_token).await;
                }
            }
            None => {
                let action =
                    self.advance(SessionEvent::StoredSessionExpired { has_refresh: false });
                if action == SessionAction::ClearAndRedirect {
                    self.env.durable.remove(AUTH_DATA_KEY);
                    self.redirect_to_login();
                }
            }
        }
    }

    /// Run the refresh grant. Never retried: a failure clears the session
    /// and restarts the login flow.
    async fn refresh_tokens(&mut self, refresh_token: &str) {
        let now = self.env.clock.now_millis();
        let issued = match self.token_client.refresh(refresh_token).await {
            // The provider usually omits a new refresh token; keep the
            // one we were just given.
            Ok(tokens) => SessionData::from_tokens(&tokens, now, Some(refresh_token.to_owned())),
            Err(e) => Err(Error::TokenRefresh(e.to_string())),
        };

        match issued {
            Ok(data) => {
                info!(username = %data.user.username, "session refreshed");
                self.persist(data);
                if self.advance(SessionEvent::TokensIssued) == SessionAction::IssueCredentials {
                    self.issue_credentials().await;
                }
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                if self.advance(SessionEvent::RefreshFailed) == SessionAction::ClearAndRedirect {
                    self.env.durable.remove(AUTH_DATA_KEY);
                    self.session = None;
                    self.credentials = None;
                    self.redirect_to_login();
                }
            }
        }
    }

    /// Generate a fresh PKCE pair and hand the login redirect to the
    /// browser. Terminal for the page load in a real browser.
    fn redirect_to_login(&mut self) {
        let challenge = self.generate_code_challenge();
        let url = self.endpoints.login_url(&self.origin, &challenge);
        self.advance(SessionEvent::RedirectIssued);
        info!("redirecting to hosted login");
        self.env.browser.navigate(&url);
    }

    /// Generate a PKCE verifier/challenge pair.
    ///
    /// The verifier is persisted to the navigation store before the
    /// challenge is returned — the callback usually lands in a fresh page
    /// load with no in-memory continuity.
    fn generate_code_challenge(&self) -> String {
        let verifier = pkce::generate_verifier();
        self.env.navigation.set(CODE_VERIFIER_KEY, &verifier);
        pkce::compute_challenge(&verifier)
    }

    /// Write the session to the durable store and mirror it in memory.
    ///
    /// The durable blob is the source of truth across reloads; both
    /// copies change together. Credentials derived from a different
    /// identity token are dropped here so a stale set can never be
    /// observed next to the new session.
    fn persist(&mut self, data: SessionData) {
        match data.to_json() {
            Ok(json) => self.env.durable.set(AUTH_DATA_KEY, &json),
            Err(e) => warn!(error = %e, "failed to serialize session for durable storage"),
        }
        if self
            .credentials
            .as_ref()
            .is_some_and(|c| !c.derived_from(&data.id_token))
        {
            self.credentials = None;
        }
        self.session = Some(data);
    }

    /// Derive downstream credentials for the current identity token.
    ///
    /// A failure leaves `credentials()` as `None` without disturbing the
    /// authenticated display.
    async fn issue_credentials(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        if self
            .credentials
            .as_ref()
            .is_some_and(|c| c.derived_from(&session.id_token))
        {
            return;
        }

        match self.issuer.issue(&session.id_token).await {
            Ok(credentials) => self.credentials = Some(credentials),
            Err(e) => {
                warn!(error = %e, "credential issuance failed");
                self.credentials = None;
            }
        }
    }
}
