//! Application service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use thunder_core::error::{app as app_errors, server as server_errors};
use thunder_core::models::{
    Application, Certificate, InboundAuthConfig, InboundAuthType, OAuthAppConfigRequest,
    TokenConfig,
};
use thunder_core::ServiceError;
use thunder_oauth::credentials::hash_client_secret;
use thunder_store::{ApplicationStore, StoreError};

use crate::context::RequestContext;
use crate::pagination::PageParams;
use crate::service::ListResult;

/// Application create/update payload.
///
/// Carries the request form of the OAuth configuration; processing hashes
/// the client secret before anything reaches a store.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRequest {
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
    pub inbound_auth_config: Vec<InboundAuthConfigRequest>,
    /// User types allowed to sign in
    #[serde(default)]
    pub allowed_user_types: Vec<String>,
}

/// One requested inbound-auth binding.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundAuthConfigRequest {
    /// Protocol of this binding
    #[serde(rename = "type")]
    pub inbound_auth_type: InboundAuthType,
    /// OAuth configuration, request form
    #[serde(default)]
    pub oauth_app_config: Option<OAuthAppConfigRequest>,
}

impl ApplicationRequest {
    /// Convert into the processed form under `id`, hashing any secret.
    fn into_application(self, id: String) -> Application {
        let app_id = id.clone();
        Application {
            id,
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
                            hash_client_secret(&req.client_secret)
                        };
                        req.into_processed(thumbprint)
                    }),
                })
                .collect(),
            allowed_user_types: self.allowed_user_types,
        }
    }
}

/// Application operations over whichever store wiring is active.
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
}

impl ApplicationService {
    /// Bind the service to a store wiring.
    #[must_use]
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    /// Create an application with a generated id.
    ///
    /// # Errors
    ///
    /// `APP-ALREADY-EXISTS` on a name collision; validation failures
    /// otherwise.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: ApplicationRequest,
    ) -> Result<Application, ServiceError> {
        if request.name.is_empty() {
            return Err(
                app_errors::invalid_request_format().with_description("name must not be empty")
            );
        }
        let taken = ctx
            .run(self.store.check_name_exists(&request.name))
            .await
            .map_err(map_store_error)?;
        if taken {
            return Err(app_errors::already_exists());
        }

        let app = request.into_application(Uuid::new_v4().to_string());
        debug!(id = %app.id, name = %app.name, "creating application");
        ctx.run(self.store.create(app)).await.map_err(map_store_error)
    }

    /// Fetch an application by id.
    ///
    /// # Errors
    ///
    /// `APP-NOT-FOUND` when no backend holds the id.
    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Application, ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)
    }

    /// Fetch the application owning an OAuth client id. Consumed by the
    /// authorization endpoints.
    ///
    /// # Errors
    ///
    /// `APP-NOT-FOUND` when no application registers the client id.
    pub async fn get_by_client_id(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<Application, ServiceError> {
        ctx.run(self.store.get_by_client_id(client_id))
            .await
            .map_err(map_store_error)
    }

    /// Page of applications with the collection total.
    ///
    /// # Errors
    ///
    /// Store faults, classified.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: PageParams,
    ) -> Result<ListResult<Application>, ServiceError> {
        let total = ctx
            .run(self.store.list_count())
            .await
            .map_err(map_store_error)?;
        let items = ctx
            .run(self.store.list(params.limit, params.offset))
            .await
            .map_err(map_store_error)?;
        Ok(ListResult { total, items })
    }

    /// Replace the application under `id`.
    ///
    /// # Errors
    ///
    /// Immutability, lookup, or name-conflict failures.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        request: ApplicationRequest,
    ) -> Result<Application, ServiceError> {
        let existing = ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        self.ensure_mutable(ctx, id).await?;

        if request.name.is_empty() {
            return Err(
                app_errors::invalid_request_format().with_description("name must not be empty")
            );
        }
        if existing.name != request.name {
            let taken = ctx
                .run(self.store.check_name_exists(&request.name))
                .await
                .map_err(map_store_error)?;
            if taken {
                return Err(app_errors::already_exists());
            }
        }

        let app = request.into_application(id.to_string());
        ctx.run(self.store.update(id, app))
            .await
            .map_err(map_store_error)
    }

    /// Delete the application under `id`.
    ///
    /// # Errors
    ///
    /// Immutability or lookup failures.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        self.ensure_mutable(ctx, id).await?;
        ctx.run(self.store.delete(id)).await.map_err(map_store_error)
    }

    async fn ensure_mutable(&self, ctx: &RequestContext, id: &str) -> Result<(), ServiceError> {
        let immutable = ctx
            .run(self.store.is_immutable(id))
            .await
            .map_err(map_store_error)?;
        if immutable {
            Err(app_errors::cannot_modify_immutable())
        } else {
            Ok(())
        }
    }
}

/// Classify a raw store error for the application surface.
fn map_store_error(e: StoreError) -> ServiceError {
    match e {
        StoreError::NotFound => app_errors::not_found(),
        StoreError::OperationNotSupported => app_errors::cannot_modify_immutable(),
        StoreError::UniqueViolation(_) => app_errors::already_exists(),
        StoreError::PayloadMismatch { key } => app_errors::data_corrupted()
            .with_description(format!("stored payload for {key} failed the type check")),
        StoreError::Cancelled | StoreError::Internal(_) => server_errors::internal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thunder_store::memory::InMemoryApplicationStore;

    fn service() -> ApplicationService {
        ApplicationService::new(Arc::new(InMemoryApplicationStore::new()))
    }

    fn request(name: &str) -> ApplicationRequest {
        ApplicationRequest {
            name: name.to_string(),
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
            inbound_auth_config: vec![InboundAuthConfigRequest {
                inbound_auth_type: InboundAuthType::OAuth2,
                oauth_app_config: Some(OAuthAppConfigRequest {
                    app_id: String::new(),
                    client_id: format!("{name}-client"),
                    client_secret: "plaintext-secret".to_string(),
                    redirect_uris: vec!["https://example.com/callback".to_string()],
                    grant_types: vec!["authorization_code".to_string()],
                    response_types: vec!["code".to_string()],
                    token_endpoint_auth_method: "client_secret_basic".to_string(),
                    pkce_required: false,
                    public_client: false,
                    token: None,
                    scopes: vec![],
                }),
            }],
            allowed_user_types: vec![],
        }
    }

    #[tokio::test]
    async fn create_hashes_the_secret_and_binds_the_app_id() {
        let service = service();
        let ctx = RequestContext::new();
        let app = service.create(&ctx, request("Console")).await.unwrap();
        let oauth = app.oauth_config().unwrap();
        assert_eq!(oauth.app_id, app.id);
        assert_eq!(oauth.hashed_client_secret, hash_client_secret("plaintext-secret"));
    }

    #[tokio::test]
    async fn names_are_unique() {
        let service = service();
        let ctx = RequestContext::new();
        service.create(&ctx, request("Console")).await.unwrap();
        let err = service.create(&ctx, request("Console")).await.unwrap_err();
        assert_eq!(err.code, "APP-ALREADY-EXISTS");
    }

    #[tokio::test]
    async fn lookup_by_client_id() {
        let service = service();
        let ctx = RequestContext::new();
        let app = service.create(&ctx, request("Console")).await.unwrap();
        let found = service
            .get_by_client_id(&ctx, "Console-client")
            .await
            .unwrap();
        assert_eq!(found.id, app.id);
        let err = service.get_by_client_id(&ctx, "ghost").await.unwrap_err();
        assert_eq!(err.code, "APP-NOT-FOUND");
    }

    #[tokio::test]
    async fn update_keeping_the_name_does_not_self_conflict() {
        let service = service();
        let ctx = RequestContext::new();
        let app = service.create(&ctx, request("Console")).await.unwrap();
        let mut updated = request("Console");
        updated.description = "updated".to_string();
        let result = service.update(&ctx, &app.id, updated).await.unwrap();
        assert_eq!(result.description, "updated");
    }

    #[tokio::test]
    async fn delete_round_trips() {
        let service = service();
        let ctx = RequestContext::new();
        let app = service.create(&ctx, request("Console")).await.unwrap();
        service.delete(&ctx, &app.id).await.unwrap();
        let err = service.get(&ctx, &app.id).await.unwrap_err();
        assert_eq!(err.code, "APP-NOT-FOUND");
    }
}
