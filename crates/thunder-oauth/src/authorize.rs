//! Authorization-request validation.
//!
//! The authorization endpoint collects its query parameters into an
//! [`AuthorizationRequest`] and runs it against the owning application's
//! processed OAuth configuration. Validation is ordered so the caller can
//! trust the redirect URI before anything is ever redirected: redirect
//! first, then response type, then PKCE.

use thunder_core::models::OAuthAppConfig;

use crate::pkce::CodeChallengeMethod;
use crate::redirect::RedirectUriError;
use crate::validator::OAuthAppConfigExt;

/// Parameters of one authorization request.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    /// `client_id` query parameter
    pub client_id: String,
    /// `redirect_uri` query parameter; may be empty
    pub redirect_uri: String,
    /// `response_type` query parameter
    pub response_type: String,
    /// `code_challenge` query parameter; empty when PKCE is not used
    pub code_challenge: String,
    /// `code_challenge_method` query parameter; empty defaults to `plain`
    pub code_challenge_method: String,
}

/// Authorization-request rejections, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizeError {
    /// `client_id` does not match the configuration
    #[error("unknown client_id")]
    UnknownClient,

    /// The redirect URI failed the strict matcher
    #[error(transparent)]
    Redirect(#[from] RedirectUriError),

    /// `response_type` is not in the configured allow-list
    #[error("response_type is not allowed for this client")]
    ResponseTypeNotAllowed,

    /// PKCE is mandated but no code challenge was supplied
    #[error("code_challenge is required for this client")]
    CodeChallengeRequired,

    /// The code-challenge method is not one of `plain` or `S256`
    #[error("unsupported code_challenge_method")]
    UnsupportedChallengeMethod,
}

/// Validate an authorization request against a processed configuration.
///
/// On success returns the resolved challenge method when the request carries
/// a PKCE challenge, `None` otherwise.
///
/// # Errors
///
/// The first [`AuthorizeError`] in validation order.
pub fn validate_authorization_request(
    config: &OAuthAppConfig,
    request: &AuthorizationRequest,
) -> Result<Option<CodeChallengeMethod>, AuthorizeError> {
    if request.client_id != config.client_id {
        return Err(AuthorizeError::UnknownClient);
    }

    config.validate_redirect_uri(&request.redirect_uri)?;

    if !config.is_allowed_response_type(&request.response_type) {
        return Err(AuthorizeError::ResponseTypeNotAllowed);
    }

    if request.code_challenge.is_empty() {
        if config.requires_pkce() {
            return Err(AuthorizeError::CodeChallengeRequired);
        }
        return Ok(None);
    }

    match CodeChallengeMethod::parse(&request.code_challenge_method) {
        Some(method) => Ok(Some(method)),
        None => Err(AuthorizeError::UnsupportedChallengeMethod),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthAppConfig {
        OAuthAppConfig {
            app_id: "app-1".to_string(),
            client_id: "client-1".to_string(),
            hashed_client_secret: String::new(),
            redirect_uris: vec!["https://example.com/callback".to_string()],
            grant_types: vec!["authorization_code".to_string()],
            response_types: vec!["code".to_string()],
            token_endpoint_auth_method: "none".to_string(),
            pkce_required: false,
            public_client: true,
            token: None,
            scopes: vec![],
        }
    }

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: "client-1".to_string(),
            redirect_uri: "https://example.com/callback".to_string(),
            response_type: "code".to_string(),
            code_challenge: "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
            code_challenge_method: "S256".to_string(),
        }
    }

    #[test]
    fn valid_request_resolves_the_challenge_method() {
        let method = validate_authorization_request(&config(), &request()).unwrap();
        assert_eq!(method, Some(CodeChallengeMethod::S256));
    }

    #[test]
    fn public_clients_must_send_a_challenge() {
        let mut req = request();
        req.code_challenge.clear();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Err(AuthorizeError::CodeChallengeRequired)
        );
    }

    #[test]
    fn confidential_clients_may_omit_pkce() {
        let mut cfg = config();
        cfg.public_client = false;
        let mut req = request();
        req.code_challenge.clear();
        assert_eq!(validate_authorization_request(&cfg, &req), Ok(None));
    }

    #[test]
    fn redirect_failures_surface_before_response_type() {
        let mut req = request();
        req.redirect_uri = "https://example.com/other".to_string();
        req.response_type = "token".to_string();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Err(AuthorizeError::Redirect(RedirectUriError::NotRegistered))
        );
    }

    #[test]
    fn disallowed_response_type_is_rejected() {
        let mut req = request();
        req.response_type = "token".to_string();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Err(AuthorizeError::ResponseTypeNotAllowed)
        );
    }

    #[test]
    fn wrong_client_id_short_circuits() {
        let mut req = request();
        req.client_id = "other".to_string();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Err(AuthorizeError::UnknownClient)
        );
    }

    #[test]
    fn unknown_challenge_methods_are_rejected() {
        let mut req = request();
        req.code_challenge_method = "S512".to_string();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Err(AuthorizeError::UnsupportedChallengeMethod)
        );
    }

    #[test]
    fn empty_method_defaults_to_plain() {
        let mut req = request();
        req.code_challenge_method.clear();
        assert_eq!(
            validate_authorization_request(&config(), &req),
            Ok(Some(CodeChallengeMethod::Plain))
        );
    }
}
