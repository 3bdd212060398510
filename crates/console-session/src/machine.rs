//! Session state machine
//!
//! Pure state machine: receives events, returns (new_state, action).
//! The session manager executes the I/O implied by each action, then
//! feeds the outcome back as the next event. Every transition is
//! testable without storage, network, or a browser.

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable session.
    Unauthenticated,
    /// Login redirect issued, or a received callback being consumed.
    AwaitingCallback,
    /// Valid tokens held; expiry not yet reached.
    Authenticated,
    /// Stored session expired; refresh grant in flight.
    Refreshing,
    /// An operation failed; the recovery redirect is about to be issued.
    Failed,
}

/// Events that drive state transitions.
///
/// Storage/URL inspection happens in the manager; the machine only sees
/// the distilled facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Authorization `code` in the URL with no durable session stored.
    CallbackReceived { verifier_present: bool },
    /// No durable session and no callback code.
    NoStoredSession,
    /// Durable session parsed and still within its expiry.
    StoredSessionValid,
    /// Durable session parsed but past its expiry.
    StoredSessionExpired { has_refresh: bool },
    /// Exchange or refresh produced a full token set.
    TokensIssued,
    /// Code exchange failed (HTTP error, non-2xx, malformed tokens).
    ExchangeFailed,
    /// Refresh grant failed.
    RefreshFailed,
    /// The login redirect was handed to the browser.
    RedirectIssued,
    /// Operator-initiated logout.
    LoggedOut,
}

/// Actions the manager executes after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Redeem the callback code with the stored verifier.
    ExchangeCode,
    /// Run the refresh grant with the stored refresh token.
    RefreshTokens,
    /// Derive downstream credentials for the current identity token.
    IssueCredentials,
    /// Generate a PKCE pair and navigate to the hosted login page.
    RedirectToLogin,
    /// Erase the durable session, then redirect to login.
    ClearAndRedirect,
    /// Erase all session state (logout path).
    ClearSession,
    /// No-op.
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: SessionState, event: SessionEvent) -> (SessionState, SessionAction) {
    use SessionAction as Action;
    use SessionEvent as Event;
    use SessionState as State;

    match (state, event) {
        // --- Boot-time classification ---
        (
            State::Unauthenticated,
            Event::CallbackReceived {
                verifier_present: true,
            },
        ) => (State::AwaitingCallback, Action::ExchangeCode),

        // A callback without its verifier cannot be trusted: no token
        // endpoint call is made, the flow restarts from a fresh login.
        (
            State::Unauthenticated,
            Event::CallbackReceived {
                verifier_present: false,
            },
        ) => (State::Failed, Action::RedirectToLogin),

        (State::Unauthenticated, Event::NoStoredSession) => {
            (State::Unauthenticated, Action::RedirectToLogin)
        }

        (State::Unauthenticated, Event::StoredSessionValid) => {
            (State::Authenticated, Action::IssueCredentials)
        }

        (State::Unauthenticated, Event::StoredSessionExpired { has_refresh: true }) => {
            (State::Refreshing, Action::RefreshTokens)
        }

        (State::Unauthenticated, Event::StoredSessionExpired { has_refresh: false }) => {
            (State::Unauthenticated, Action::ClearAndRedirect)
        }

        // --- Exchange / refresh outcomes ---
        (State::AwaitingCallback | State::Refreshing, Event::TokensIssued) => {
            (State::Authenticated, Action::IssueCredentials)
        }

        (State::AwaitingCallback, Event::ExchangeFailed) => {
            (State::Failed, Action::RedirectToLogin)
        }

        (State::Refreshing, Event::RefreshFailed) => (State::Failed, Action::ClearAndRedirect),

        // --- Redirect bookkeeping ---
        // Once the login redirect is handed over, the page load ends with
        // the callback, which a fresh context picks up.
        (_, Event::RedirectIssued) => (State::AwaitingCallback, Action::None),

        // --- Logout from any state ---
        (_, Event::LoggedOut) => (State::Unauthenticated, Action::ClearSession),

        // --- Unhandled transition: stay in current state ---
        (state, _event) => (state, Action::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionAction as Action;
    use SessionEvent as Event;
    use SessionState as State;

    #[test]
    fn callback_with_verifier_starts_exchange() {
        let (state, action) = handle_event(
            State::Unauthenticated,
            Event::CallbackReceived {
                verifier_present: true,
            },
        );
        assert_eq!(state, State::AwaitingCallback);
        assert_eq!(action, Action::ExchangeCode);
    }

    #[test]
    fn callback_without_verifier_fails_hard() {
        let (state, action) = handle_event(
            State::Unauthenticated,
            Event::CallbackReceived {
                verifier_present: false,
            },
        );
        assert_eq!(state, State::Failed);
        assert_eq!(action, Action::RedirectToLogin);
    }

    #[test]
    fn fresh_visit_redirects_to_login() {
        let (state, action) = handle_event(State::Unauthenticated, Event::NoStoredSession);
        assert_eq!(state, State::Unauthenticated);
        assert_eq!(action, Action::RedirectToLogin);
    }

    #[test]
    fn valid_stored_session_authenticates_and_issues_credentials() {
        let (state, action) = handle_event(State::Unauthenticated, Event::StoredSessionValid);
        assert_eq!(state, State::Authenticated);
        assert_eq!(action, Action::IssueCredentials);
    }

    #[test]
    fn expired_session_with_refresh_token_refreshes() {
        let (state, action) = handle_event(
            State::Unauthenticated,
            Event::StoredSessionExpired { has_refresh: true },
        );
        assert_eq!(state, State::Refreshing);
        assert_eq!(action, Action::RefreshTokens);
    }

    #[test]
    fn expired_session_without_refresh_token_clears_and_redirects() {
        let (state, action) = handle_event(
            State::Unauthenticated,
            Event::StoredSessionExpired { has_refresh: false },
        );
        assert_eq!(state, State::Unauthenticated);
        assert_eq!(action, Action::ClearAndRedirect);
    }

    #[test]
    fn successful_exchange_authenticates() {
        let (state, action) = handle_event(State::AwaitingCallback, Event::TokensIssued);
        assert_eq!(state, State::Authenticated);
        assert_eq!(action, Action::IssueCredentials);
    }

    #[test]
    fn successful_refresh_authenticates() {
        let (state, action) = handle_event(State::Refreshing, Event::TokensIssued);
        assert_eq!(state, State::Authenticated);
        assert_eq!(action, Action::IssueCredentials);
    }

    #[test]
    fn failed_exchange_restarts_login() {
        let (state, action) = handle_event(State::AwaitingCallback, Event::ExchangeFailed);
        assert_eq!(state, State::Failed);
        assert_eq!(action, Action::RedirectToLogin);
    }

    #[test]
    fn failed_refresh_clears_session_before_login() {
        let (state, action) = handle_event(State::Refreshing, Event::RefreshFailed);
        assert_eq!(state, State::Failed);
        assert_eq!(action, Action::ClearAndRedirect);
    }

    #[test]
    fn redirect_issued_awaits_callback_from_any_state() {
        for from in [
            State::Unauthenticated,
            State::Authenticated,
            State::Refreshing,
            State::Failed,
        ] {
            let (state, action) = handle_event(from, Event::RedirectIssued);
            assert_eq!(state, State::AwaitingCallback, "from {from:?}");
            assert_eq!(action, Action::None);
        }
    }

    #[test]
    fn logout_resets_from_any_state() {
        for from in [
            State::Unauthenticated,
            State::AwaitingCallback,
            State::Authenticated,
            State::Refreshing,
            State::Failed,
        ] {
            let (state, action) = handle_event(from, Event::LoggedOut);
            assert_eq!(state, State::Unauthenticated, "from {from:?}");
            assert_eq!(action, Action::ClearSession);
        }
    }

    #[test]
    fn unrelated_events_leave_state_untouched() {
        let (state, action) = handle_event(State::Authenticated, Event::TokensIssued);
        assert_eq!(state, State::Authenticated);
        assert_eq!(action, Action::None);

        let (state, action) = handle_event(State::Authenticated, Event::NoStoredSession);
        assert_eq!(state, State::Authenticated);
        assert_eq!(action, Action::None);

        let (state, action) = handle_event(State::Refreshing, Event::ExchangeFailed);
        assert_eq!(state, State::Refreshing);
        assert_eq!(action, Action::None);
    }
}
