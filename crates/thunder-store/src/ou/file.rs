//! File-backed organization-unit store.
//!
//! A typed, read-only view over the generic resource store's OU partition.
//! Mutations return [`StoreError::OperationNotSupported`]; the loader writes
//! through the generic store directly, before the listener binds. User and
//! group assignments belong to the mutable backend, so the file store always
//! reports them empty.

use std::sync::Arc;

use async_trait::async_trait;

use thunder_core::models::{OrganizationUnit, OrganizationUnitBasic};
use thunder_core::{Entity, ResourceKey, ResourceKind};

use crate::contract::{OrganizationUnitStore, StoreResult};
use crate::error::StoreError;
use crate::page::paginate;
use crate::resource_store::ResourceStore;

/// Typed OU view over the generic immutable store.
#[derive(Clone)]
pub struct OrganizationUnitFileStore {
    resources: Arc<ResourceStore>,
}

impl OrganizationUnitFileStore {
    /// Wrap the generic store.
    #[must_use]
    pub fn new(resources: Arc<ResourceStore>) -> Self {
        Self { resources }
    }

    fn decode(entity: Entity) -> StoreResult<OrganizationUnit> {
        match entity.payload.as_organization_unit() {
            Some(ou) => Ok(ou.clone()),
            None => Err(StoreError::PayloadMismatch { key: entity.key }),
        }
    }

    /// Every declared OU, ordered by id.
    fn all(&self) -> StoreResult<Vec<OrganizationUnit>> {
        self.resources
            .list_by_kind(ResourceKind::OrganizationUnit)
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    fn parent_matches(ou: &OrganizationUnit, parent: Option<&str>) -> bool {
        ou.parent.as_deref() == parent
    }
}

#[async_trait]
impl OrganizationUnitStore for OrganizationUnitFileStore {
    async fn create(&self, _ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        Err(StoreError::OperationNotSupported)
    }

    async fn get(&self, id: &str) -> StoreResult<OrganizationUnit> {
        let key = ResourceKey::new(ResourceKind::OrganizationUnit, id);
        match self.resources.get(&key) {
            Some(entity) => Self::decode(entity),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_by_path(&self, handles: &[String]) -> StoreResult<OrganizationUnit> {
        if handles.is_empty() {
            return Err(StoreError::NotFound);
        }
        let all = self.all()?;
        let mut parent: Option<String> = None;
        let mut resolved: Option<OrganizationUnit> = None;
        for handle in handles {
            let next = all
                .iter()
                .find(|ou| ou.handle == *handle && Self::parent_matches(ou, parent.as_deref()))
                .cloned()
                .ok_or(StoreError::NotFound)?;
            parent = Some(next.id.clone());
            resolved = Some(next);
        }
        // Non-empty path guarantees at least one resolution step ran.
        resolved.ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let key = ResourceKey::new(ResourceKind::OrganizationUnit, id);
        Ok(self.resources.get(&key).is_some())
    }

    async fn update(&self, _id: &str, _ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        Err(StoreError::OperationNotSupported)
    }

    async fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::OperationNotSupported)
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self.all()?.iter().filter(|ou| ou.is_root()).count())
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let roots: Vec<OrganizationUnitBasic> = self
            .all()?
            .iter()
            .filter(|ou| ou.is_root())
            .map(OrganizationUnit::to_basic)
            .collect();
        Ok(paginate(roots, limit, offset))
    }

    async fn children_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self
            .all()?
            .iter()
            .filter(|ou| ou.parent.as_deref() == Some(id))
            .count())
    }

    async fn children(
        &self,
        id: &str,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let children: Vec<OrganizationUnitBasic> = self
            .all()?
            .iter()
            .filter(|ou| ou.parent.as_deref() == Some(id))
            .map(OrganizationUnit::to_basic)
            .collect();
        Ok(paginate(children, limit, offset))
    }

    async fn check_name_conflict(&self, name: &str, parent: Option<&str>) -> StoreResult<bool> {
        Ok(self
            .all()?
            .iter()
            .any(|ou| ou.name == name && Self::parent_matches(ou, parent)))
    }

    async fn check_handle_conflict(&self, handle: &str, parent: Option<&str>) -> StoreResult<bool> {
        Ok(self
            .all()?
            .iter()
            .any(|ou| ou.handle == handle && Self::parent_matches(ou, parent)))
    }

    async fn has_child_resources(&self, id: &str) -> StoreResult<bool> {
        Ok(self
            .all()?
            .iter()
            .any(|ou| ou.parent.as_deref() == Some(id)))
    }

    async fn users_count(&self, _id: &str) -> StoreResult<usize> {
        Ok(0)
    }

    async fn users(&self, _id: &str, _limit: usize, _offset: usize) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn groups_count(&self, _id: &str) -> StoreResult<usize> {
        Ok(0)
    }

    async fn groups(&self, _id: &str, _limit: usize, _offset: usize) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn is_immutable(&self, id: &str) -> StoreResult<bool> {
        self.exists(id).await
    }
}
