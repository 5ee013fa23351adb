//! Application records and OAuth inbound-auth configuration.
//!
//! The OAuth configuration exists in two representations. The *request* form
//! ([`OAuthAppConfigRequest`]) carries the plaintext `client_secret` and only
//! ever lives inside an inbound HTTP request. The *processed* form
//! ([`OAuthAppConfig`]) carries the secret's thumbprint and is the only form
//! the stores persist. Conversion consumes the request form, so a plaintext
//! secret cannot survive past validation.

use serde::{Deserialize, Serialize};

use super::token::{OAuthTokenConfig, TokenConfig};

/// An OAuth/OIDC application registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Unique id
    pub id: String,
    /// Display name, non-empty and unique across backends
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Landing URL
    #[serde(default)]
    pub url: String,
    /// Logo URL
    #[serde(default)]
    pub logo_url: String,
    /// Terms-of-service URI
    #[serde(default)]
    pub tos_uri: String,
    /// Privacy-policy URI
    #[serde(default)]
    pub policy_uri: String,
    /// Contact addresses
    #[serde(default)]
    pub contacts: Vec<String>,
    /// Bound authentication flow id
    #[serde(default)]
    pub auth_flow_id: String,
    /// Bound registration flow id
    #[serde(default)]
    pub registration_flow_id: String,
    /// Whether self-registration through the bound flow is enabled
    #[serde(default)]
    pub is_registration_flow_enabled: bool,
    /// Optional signing certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    /// Optional root-level token configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenConfig>,
    /// Inbound authentication entries (processed form)
    #[serde(default)]
    pub inbound_auth_config: Vec<InboundAuthConfig>,
    /// User types allowed to sign in to this application
    #[serde(default)]
    pub allowed_user_types: Vec<String>,
}

impl Application {
    /// First OAuth inbound-auth entry, if any.
    ///
    /// At most one entry of type `oauth2` is expected per application.
    // TODO: enforce a single oauth2 inbound auth config per application.
    #[must_use]
    pub fn oauth_config(&self) -> Option<&OAuthAppConfig> {
        self.inbound_auth_config
            .iter()
            .find(|entry| entry.inbound_auth_type == InboundAuthType::OAuth2)
            .and_then(|entry| entry.oauth_app_config.as_ref())
    }
}

/// Application certificate material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Certificate encoding
    #[serde(rename = "type")]
    pub cert_type: CertificateType,
    /// Certificate value in the declared encoding
    #[serde(default)]
    pub value: String,
}

/// Supported certificate encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateType {
    /// PEM-encoded certificate
    #[serde(rename = "PEM")]
    Pem,
    /// JSON Web Key
    #[serde(rename = "JWK")]
    Jwk,
    /// No certificate configured
    #[serde(rename = "NONE")]
    None,
}

/// One inbound authentication binding on an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundAuthConfig {
    /// Protocol of this binding
    #[serde(rename = "type")]
    pub inbound_auth_type: InboundAuthType,
    /// OAuth configuration when the type is `oauth2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_app_config: Option<OAuthAppConfig>,
}

/// Inbound authentication protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundAuthType {
    /// OAuth 2.0 / OpenID Connect
    #[serde(rename = "oauth2")]
    OAuth2,
}

/// Processed OAuth application configuration.
///
/// This is the persisted form: the client secret appears only as its
/// thumbprint. Construct it from an [`OAuthAppConfigRequest`] once the
/// plaintext has been hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthAppConfig {
    /// Owning application id
    #[serde(default)]
    pub app_id: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Thumbprint of the client secret; empty for public clients
    #[serde(default)]
    pub hashed_client_secret: String,
    /// Registered redirect URIs, matched byte-for-byte
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Allowed grant types
    #[serde(default)]
    pub grant_types: Vec<String>,
    /// Allowed response types
    #[serde(default)]
    pub response_types: Vec<String>,
    /// The single allowed token-endpoint authentication method
    #[serde(default)]
    pub token_endpoint_auth_method: String,
    /// Whether PKCE is mandated regardless of client type
    #[serde(default)]
    pub pkce_required: bool,
    /// Whether the client is public (no credential)
    #[serde(default)]
    pub public_client: bool,
    /// Nested token configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<OAuthTokenConfig>,
    /// Scopes the application may request
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Request-time OAuth application configuration.
///
/// Carries the plaintext `client_secret`; never persisted. The conversion to
/// the processed form takes ownership, leaving no copy of the plaintext
/// behind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OAuthAppConfigRequest {
    /// Owning application id
    #[serde(default)]
    pub app_id: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Plaintext client secret; empty for public clients
    #[serde(default)]
    pub client_secret: String,
    /// Registered redirect URIs
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Allowed grant types
    #[serde(default)]
    pub grant_types: Vec<String>,
    /// Allowed response types
    #[serde(default)]
    pub response_types: Vec<String>,
    /// The single allowed token-endpoint authentication method
    #[serde(default)]
    pub token_endpoint_auth_method: String,
    /// Whether PKCE is mandated regardless of client type
    #[serde(default)]
    pub pkce_required: bool,
    /// Whether the client is public (no credential)
    #[serde(default)]
    pub public_client: bool,
    /// Nested token configuration
    #[serde(default)]
    pub token: Option<OAuthTokenConfig>,
    /// Scopes the application may request
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl OAuthAppConfigRequest {
    /// Convert into the processed form, substituting the secret's thumbprint.
    ///
    /// The caller computes the thumbprint with the same function used at
    /// credential-check time so stored and compared values line up.
    #[must_use]
    pub fn into_processed(self, hashed_client_secret: String) -> OAuthAppConfig {
        OAuthAppConfig {
            app_id: self.app_id,
            client_id: self.client_id,
            hashed_client_secret,
            redirect_uris: self.redirect_uris,
            grant_types: self.grant_types,
            response_types: self.response_types,
            token_endpoint_auth_method: self.token_endpoint_auth_method,
            pkce_required: self.pkce_required,
            public_client: self.public_client,
            token: self.token,
            scopes: self.scopes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> OAuthAppConfigRequest {
        OAuthAppConfigRequest {
            app_id: "app-1".to_string(),
            client_id: "client-1".to_string(),
            client_secret: "s3cret".to_string(),
            redirect_uris: vec!["https://example.com/callback".to_string()],
            grant_types: vec!["authorization_code".to_string()],
            response_types: vec!["code".to_string()],
            token_endpoint_auth_method: "client_secret_basic".to_string(),
            pkce_required: false,
            public_client: false,
            token: None,
            scopes: vec!["openid".to_string()],
        }
    }

    #[test]
    fn processed_form_carries_only_the_thumbprint() {
        let processed = sample_request().into_processed("abc123".to_string());
        assert_eq!(processed.hashed_client_secret, "abc123");
        let json = serde_json::to_string(&processed).unwrap();
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn oauth_config_returns_first_oauth2_entry() {
        let app = Application {
            id: "app-1".to_string(),
            name: "App".to_string(),
            description: String::new(),
            url: String::new(),
            logo_url: String::new(),
            tos_uri: String::new(),
            policy_uri: String::new(),
            contacts: vec![],
            auth_flow_id: String::new(),
            registration_flow_id: String::new(),
            is_registration_flow_enabled: false,
            certificate: None,
            token: None,
            inbound_auth_config: vec![InboundAuthConfig {
                inbound_auth_type: InboundAuthType::OAuth2,
                oauth_app_config: Some(sample_request().into_processed(String::new())),
            }],
            allowed_user_types: vec![],
        };
        assert_eq!(app.oauth_config().unwrap().client_id, "client-1");
    }

    #[test]
    fn certificate_type_uses_uppercase_wire_names() {
        let cert = Certificate {
            cert_type: CertificateType::Jwk,
            value: "{}".to_string(),
        };
        let json = serde_json::to_value(&cert).unwrap();
        assert_eq!(json["type"], "JWK");
    }
}
