//! File-backed application store.
//!
//! Typed, read-only view over the generic resource store's application
//! partition. Same discipline as the OU file store: mutations return
//! [`StoreError::OperationNotSupported`] and the loader writes through the
//! generic store before the listener binds.

use std::sync::Arc;

use async_trait::async_trait;

use thunder_core::models::Application;
use thunder_core::{Entity, ResourceKey, ResourceKind};

use crate::contract::{ApplicationStore, StoreResult};
use crate::error::StoreError;
use crate::page::paginate;
use crate::resource_store::ResourceStore;

/// Typed application view over the generic immutable store.
#[derive(Clone)]
pub struct ApplicationFileStore {
    resources: Arc<ResourceStore>,
}

impl ApplicationFileStore {
    /// Wrap the generic store.
    #[must_use]
    pub fn new(resources: Arc<ResourceStore>) -> Self {
        Self { resources }
    }

    fn decode(entity: Entity) -> StoreResult<Application> {
        match entity.payload.as_application() {
            Some(app) => Ok(app.clone()),
            None => Err(StoreError::PayloadMismatch { key: entity.key }),
        }
    }

    fn all(&self) -> StoreResult<Vec<Application>> {
        self.resources
            .list_by_kind(ResourceKind::Application)
            .into_iter()
            .map(Self::decode)
            .collect()
    }
}

#[async_trait]
impl ApplicationStore for ApplicationFileStore {
    async fn create(&self, _app: Application) -> StoreResult<Application> {
        Err(StoreError::OperationNotSupported)
    }

    async fn get(&self, id: &str) -> StoreResult<Application> {
        let key = ResourceKey::new(ResourceKind::Application, id);
        match self.resources.get(&key) {
            Some(entity) => Self::decode(entity),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_by_client_id(&self, client_id: &str) -> StoreResult<Application> {
        self.all()?
            .into_iter()
            .find(|app| {
                app.oauth_config()
                    .is_some_and(|oauth| oauth.client_id == client_id)
            })
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let key = ResourceKey::new(ResourceKind::Application, id);
        Ok(self.resources.get(&key).is_some())
    }

    async fn update(&self, _id: &str, _app: Application) -> StoreResult<Application> {
        Err(StoreError::OperationNotSupported)
    }

    async fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::OperationNotSupported)
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self.resources.count_by_kind(ResourceKind::Application))
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<Application>> {
        Ok(paginate(self.all()?, limit, offset))
    }

    async fn check_name_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.all()?.iter().any(|app| app.name == name))
    }

    async fn is_immutable(&self, id: &str) -> StoreResult<bool> {
        self.exists(id).await
    }
}
