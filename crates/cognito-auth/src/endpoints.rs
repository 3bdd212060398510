//! Per-tenant identity-provider endpoint derivation
//!
//! Every Cognito user pool exposes a hosted UI under a tenant domain derived
//! from the pool id: the underscore is removed and the result is prefixed to
//! `auth.{region}.amazoncognito.com`. The token, login, and logout endpoints
//! all hang off that domain, so they are computed here once from
//! configuration instead of being hardcoded constants.

/// Endpoint set for one user pool tenant.
///
/// `client_id` identifies the public client application — it is not a
/// secret. The actual secrets (tokens, verifier) never pass through this
/// type.
#[derive(Debug, Clone)]
pub struct IdpEndpoints {
    region: String,
    user_pool_id: String,
    client_id: String,
    domain: String,
}

impl IdpEndpoints {
    /// Derive the tenant endpoints from provider configuration.
    pub fn new(region: &str, user_pool_id: &str, client_id: &str) -> Self {
        // Hosted UI domain is the pool id with its underscore removed,
        // e.g. "ap-southeast-1_AbCdEf" -> "ap-southeast-1AbCdEf"
        let domain = user_pool_id.replace('_', "");
        Self {
            region: region.to_owned(),
            user_pool_id: user_pool_id.to_owned(),
            client_id: client_id.to_owned(),
            domain,
        }
    }

    /// OAuth2 client id for this tenant.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Token endpoint for code exchange and token refresh.
    pub fn token_endpoint(&self) -> String {
        format!(
            "https://{}.auth.{}.amazoncognito.com/oauth2/token",
            self.domain, self.region
        )
    }

    /// Build the full hosted-UI login URL with all required OAuth parameters.
    ///
    /// Carries the PKCE challenge so the authorization server can verify the
    /// later token exchange came from the party that initiated the flow.
    pub fn login_url(&self, redirect_uri: &str, code_challenge: &str) -> String {
        format!(
            "https://{}.auth.{}.amazoncognito.com/login?client_id={}&response_type=code&scope={}&redirect_uri={}&code_challenge={}&code_challenge_method=S256",
            self.domain,
            self.region,
            self.client_id,
            urlencoded("email openid"),
            urlencoded(redirect_uri),
            code_challenge,
        )
    }

    /// Build the hosted-UI logout URL.
    ///
    /// The IdP invalidates its own session cookies and then navigates back
    /// to `logout_uri`.
    pub fn logout_url(&self, logout_uri: &str) -> String {
        format!(
            "https://{}.auth.{}.amazoncognito.com/logout?client_id={}&logout_uri={}",
            self.domain,
            self.region,
            self.client_id,
            urlencoded(logout_uri),
        )
    }

    /// Federated login provider name for credential issuance,
    /// `cognito-idp.{region}.amazonaws.com/{user_pool_id}`.
    pub fn provider_name(&self) -> String {
        format!(
            "cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace(':', "%3A")
        .replace('/', "%2F")
        .replace(' ', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_endpoints() -> IdpEndpoints {
        IdpEndpoints::new("ap-southeast-1", "ap-southeast-1_AbCdEf123", "client-abc")
    }

    #[test]
    fn domain_strips_underscore_from_pool_id() {
        let endpoints = test_endpoints();
        assert_eq!(
            endpoints.token_endpoint(),
            "https://ap-southeast-1AbCdEf123.auth.ap-southeast-1.amazoncognito.com/oauth2/token"
        );
    }

    #[test]
    fn login_url_contains_required_params() {
        let endpoints = test_endpoints();
        let url = endpoints.login_url("https://console.example", "test-challenge");

        assert!(url.starts_with(
            "https://ap-southeast-1AbCdEf123.auth.ap-southeast-1.amazoncognito.com/login?"
        ));
        assert!(url.contains("client_id=client-abc"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=email%20openid"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fconsole.example"));
        assert!(url.contains("code_challenge=test-challenge"));
        assert!(url.contains("code_challenge_method=S256"));
    }

    #[test]
    fn logout_url_contains_client_and_target() {
        let endpoints = test_endpoints();
        let url = endpoints.logout_url("https://console.example");

        assert!(url.contains("/logout?"));
        assert!(url.contains("client_id=client-abc"));
        assert!(url.contains("logout_uri=https%3A%2F%2Fconsole.example"));
    }

    #[test]
    fn provider_name_keeps_underscore() {
        // The federated login key uses the raw pool id, not the hosted-UI domain
        let endpoints = test_endpoints();
        assert_eq!(
            endpoints.provider_name(),
            "cognito-idp.ap-southeast-1.amazonaws.com/ap-southeast-1_AbCdEf123"
        );
    }
}
