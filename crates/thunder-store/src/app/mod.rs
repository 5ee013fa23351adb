//! Application stores and loader wiring.

mod file;

pub use file::ApplicationFileStore;

use std::sync::Arc;

use serde::Deserialize;

use thunder_core::models::{
    Application, Certificate, InboundAuthConfig, InboundAuthType, OAuthAppConfigRequest,
    TokenConfig,
};
use thunder_core::{EntityPayload, ResourceKind};

use crate::contract::ExistenceChecker;
use crate::loader::{ResourceConfig, ResourceValidator};

/// Directory under the resource root holding declared applications.
pub const DIRECTORY_NAME: &str = "applications";

/// Thumbprint function applied to declared client secrets at load time.
///
/// The same function must be used at credential-check time so stored and
/// compared values line up.
pub type SecretHasher = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A declared application as it appears on disk.
///
/// Declarations carry the request form of the OAuth configuration, plaintext
/// secret included; conversion to the processed [`Application`] consumes the
/// declaration and substitutes the thumbprint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDeclaration {
    /// Unique id
    pub id: String,
    /// Display name
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
    /// Whether self-registration is enabled
    #[serde(default)]
    pub is_registration_flow_enabled: bool,
    /// Optional signing certificate
    #[serde(default)]
    pub certificate: Option<Certificate>,
    /// Optional root-level token configuration
    #[serde(default)]
    pub token: Option<TokenConfig>,
    /// Inbound authentication entries, request form
    #[serde(default)]
    pub inbound_auth_config: Vec<InboundAuthDeclaration>,
    /// User types allowed to sign in
    #[serde(default)]
    pub allowed_user_types: Vec<String>,
}

/// One declared inbound-auth binding.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAuthDeclaration {
    /// Protocol of this binding
    #[serde(rename = "type")]
    pub inbound_auth_type: InboundAuthType,
    /// OAuth configuration, request form
    #[serde(default)]
    pub oauth_app_config: Option<OAuthAppConfigRequest>,
}

impl ApplicationDeclaration {
    /// Convert into the processed form, hashing any declared client secret.
    #[must_use]
    pub fn into_application(self, hash: &SecretHasher) -> Application {
        let hash: &dyn Fn(&str) -> String = hash.as_ref();
        let app_id = self.id.clone();
        Application {
            id: self.id,
            name: self.name,
            description: self.description,
            url: self.url,
            logo_url: self.logo_url,
            tos_uri: self.tos_uri,
            policy_uri: self.policy_uri,
            contacts: self.contacts,
            auth_flow_id: self.auth_flow_id,
            registration_flow_id: self.registration_flow_id,
            is_registration_flow_enabled: self.is_registration_flow_enabled,
            certificate: self.certificate,
            token: self.token,
            inbound_auth_config: self
                .inbound_auth_config
                .into_iter()
                .map(|entry| InboundAuthConfig {
                    inbound_auth_type: entry.inbound_auth_type,
                    oauth_app_config: entry.oauth_app_config.map(|mut req| {
                        if req.app_id.is_empty() {
                            req.app_id.clone_from(&app_id);
                        }
                        let thumbprint = if req.client_secret.is_empty() {
                            String::new()
                        } else {
                            hash(&req.client_secret)
                        };
                        req.into_processed(thumbprint)
                    }),
                })
                .collect(),
            allowed_user_types: self.allowed_user_types,
        }
    }
}

/// Semantic validator for declared applications.
pub struct ApplicationResourceValidator;

#[async_trait::async_trait]
impl ResourceValidator for ApplicationResourceValidator {
    async fn validate(
        &self,
        payload: &EntityPayload,
        _checker: Option<&dyn ExistenceChecker>,
    ) -> Result<(), String> {
        let Some(app) = payload.as_application() else {
            return Err("payload is not an application".to_string());
        };
        if app.id.is_empty() {
            return Err("application id must not be empty".to_string());
        }
        if app.name.is_empty() {
            return Err("application name must not be empty".to_string());
        }
        if let Some(oauth) = app.oauth_config() {
            if oauth.client_id.is_empty() {
                return Err("oauth configuration requires a client_id".to_string());
            }
        }
        Ok(())
    }
}

/// Loader configuration for the `applications` directory.
///
/// `hash` is applied to declared plaintext secrets before anything is stored;
/// the processed form is the only one that reaches the store.
#[must_use]
pub fn resource_config(
    hash: SecretHasher,
    existence_checker: Option<Arc<dyn ExistenceChecker>>,
) -> ResourceConfig {
    ResourceConfig {
        kind: ResourceKind::Application,
        directory_name: DIRECTORY_NAME.to_string(),
        parser: Box::new(move |bytes| {
            serde_yaml::from_slice::<ApplicationDeclaration>(bytes)
                .map(|declaration| EntityPayload::Application(declaration.into_application(&hash)))
                .map_err(|e| e.to_string())
        }),
        validator: Box::new(ApplicationResourceValidator),
        id_extractor: Box::new(|payload| match payload {
            EntityPayload::OrganizationUnit(ou) => ou.id.clone(),
            EntityPayload::Application(app) => app.id.clone(),
        }),
        existence_checker,
    }
}
