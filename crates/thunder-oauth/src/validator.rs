//! Allow-list predicates over a processed OAuth application configuration.

use thunder_core::models::OAuthAppConfig;

use crate::credentials::verify_client_secret;
use crate::redirect::{validate_redirect_uri, RedirectUriError};

/// Wire values for the grant types and auth methods Thunder recognizes.
pub mod well_known {
    /// `authorization_code` grant
    pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
    /// `client_credentials` grant
    pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";
    /// `refresh_token` grant
    pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";
    /// `code` response type
    pub const RESPONSE_TYPE_CODE: &str = "code";
    /// HTTP basic client authentication
    pub const AUTH_METHOD_CLIENT_SECRET_BASIC: &str = "client_secret_basic";
    /// Form-post client authentication
    pub const AUTH_METHOD_CLIENT_SECRET_POST: &str = "client_secret_post";
    /// No client authentication (public clients)
    pub const AUTH_METHOD_NONE: &str = "none";
}

/// Validation predicates available on a processed OAuth configuration.
///
/// All predicates are pure reads; none of them mutate or suspend.
pub trait OAuthAppConfigExt {
    /// Whether `grant_type` is non-empty and configured.
    fn is_allowed_grant_type(&self, grant_type: &str) -> bool;

    /// Whether `response_type` is non-empty and configured.
    fn is_allowed_response_type(&self, response_type: &str) -> bool;

    /// Whether `method` exactly matches the single configured
    /// token-endpoint authentication method.
    fn is_allowed_token_endpoint_auth_method(&self, method: &str) -> bool;

    /// Whether PKCE must be enforced: explicitly required, or the client is
    /// public.
    fn requires_pkce(&self) -> bool;

    /// Whether `client_id` matches and `client_secret` hashes to the stored
    /// thumbprint. The comparison is constant time.
    fn validate_credentials(&self, client_id: &str, client_secret: &str) -> bool;

    /// Validate a requested redirect URI against the registered list.
    ///
    /// # Errors
    ///
    /// The [`RedirectUriError`] naming the rule that failed.
    fn validate_redirect_uri(&self, requested: &str) -> Result<(), RedirectUriError>;
}

impl OAuthAppConfigExt for OAuthAppConfig {
    fn is_allowed_grant_type(&self, grant_type: &str) -> bool {
        !grant_type.is_empty() && self.grant_types.iter().any(|g| g == grant_type)
    }

    fn is_allowed_response_type(&self, response_type: &str) -> bool {
        !response_type.is_empty() && self.response_types.iter().any(|rt| rt == response_type)
    }

    fn is_allowed_token_endpoint_auth_method(&self, method: &str) -> bool {
        !method.is_empty() && self.token_endpoint_auth_method == method
    }

    fn requires_pkce(&self) -> bool {
        self.pkce_required || self.public_client
    }

    fn validate_credentials(&self, client_id: &str, client_secret: &str) -> bool {
        self.client_id == client_id
            && verify_client_secret(client_secret, &self.hashed_client_secret)
    }

    fn validate_redirect_uri(&self, requested: &str) -> Result<(), RedirectUriError> {
        validate_redirect_uri(&self.redirect_uris, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::hash_client_secret;

    fn config() -> OAuthAppConfig {
        OAuthAppConfig {
            app_id: "app-1".to_string(),
            client_id: "client-1".to_string(),
            hashed_client_secret: hash_client_secret("s3cret"),
            redirect_uris: vec!["https://example.com/callback".to_string()],
            grant_types: vec![
                well_known::GRANT_AUTHORIZATION_CODE.to_string(),
                well_known::GRANT_REFRESH_TOKEN.to_string(),
            ],
            response_types: vec![well_known::RESPONSE_TYPE_CODE.to_string()],
            token_endpoint_auth_method: well_known::AUTH_METHOD_CLIENT_SECRET_BASIC.to_string(),
            pkce_required: false,
            public_client: false,
            token: None,
            scopes: vec!["openid".to_string()],
        }
    }

    #[test]
    fn grant_and_response_type_allow_lists() {
        let cfg = config();
        assert!(cfg.is_allowed_grant_type("authorization_code"));
        assert!(cfg.is_allowed_grant_type("refresh_token"));
        assert!(!cfg.is_allowed_grant_type("client_credentials"));
        assert!(!cfg.is_allowed_grant_type(""));
        assert!(cfg.is_allowed_response_type("code"));
        assert!(!cfg.is_allowed_response_type("token"));
        assert!(!cfg.is_allowed_response_type(""));
    }

    #[test]
    fn auth_method_is_an_exact_single_match() {
        let cfg = config();
        assert!(cfg.is_allowed_token_endpoint_auth_method("client_secret_basic"));
        assert!(!cfg.is_allowed_token_endpoint_auth_method("client_secret_post"));
        assert!(!cfg.is_allowed_token_endpoint_auth_method(""));
    }

    #[test]
    fn pkce_follows_the_flag_or_public_client() {
        let mut cfg = config();
        assert!(!cfg.requires_pkce());
        cfg.pkce_required = true;
        assert!(cfg.requires_pkce());
        cfg.pkce_required = false;
        cfg.public_client = true;
        assert!(cfg.requires_pkce());
    }

    #[test]
    fn credentials_need_both_id_and_secret() {
        let cfg = config();
        assert!(cfg.validate_credentials("client-1", "s3cret"));
        assert!(!cfg.validate_credentials("client-2", "s3cret"));
        assert!(!cfg.validate_credentials("client-1", "wrong"));
    }

    #[test]
    fn redirect_validation_delegates_to_the_strict_matcher() {
        let cfg = config();
        assert!(cfg.validate_redirect_uri("https://example.com/callback").is_ok());
        assert_eq!(
            cfg.validate_redirect_uri("https://example.com/callback#x"),
            Err(RedirectUriError::FragmentForbidden)
        );
    }
}
