//! Composite store: immutable file-backed resources layered over a mutable
//! backend.
//!
//! ## Read protocol
//!
//! - By id or path: the mutable store answers first; `NotFound` falls through
//!   to the file store; any other error surfaces immediately.
//! - Existence and conflict checks: true if either side says so. The file
//!   store is consulted first since it is in-memory and free to ask.
//! - Counts: the sum of both sides.
//! - Lists: fetch everything from each side up to its own count, merge with
//!   the mutable entries first, drop file entries whose id a mutable entry
//!   already claimed (ids should never collide across backends; when they do
//!   the mutable copy wins and the collision is logged at debug), then apply
//!   `(limit, offset)` to the merged sequence.
//!
//! ## Write protocol
//!
//! Every mutation is forwarded to the mutable store only. The service layer
//! checks `is_immutable` before mutating; the composite makes that check
//! cheap by answering from the in-memory file store.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use thunder_core::models::{Application, OrganizationUnit, OrganizationUnitBasic};

use crate::contract::{ApplicationStore, OrganizationUnitStore, StoreResult};
use crate::error::StoreError;
use crate::page::paginate;

/// Backend wiring selected per resource kind at start-up.
///
/// The wiring is constructed once; downstream code holds the resulting store
/// and never inspects the mode again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Only the mutable backend; all operations supported
    Mutable,
    /// Only the file-backed store; mutations are refused
    Immutable,
    /// Both backends, layered
    Composite,
}

impl StoreMode {
    /// Parse a configured mode string: case-insensitive, whitespace trimmed.
    /// Unknown values return `None` so the caller can fall back to the
    /// global immutable-resources flag; composite is never implicit.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mutable" => Some(Self::Mutable),
            "immutable" => Some(Self::Immutable),
            "composite" => Some(Self::Composite),
            _ => None,
        }
    }
}

/// Merge two source lists: mutable entries first, then the file entries whose
/// id no mutable entry claimed. Order within each source is preserved.
fn merge_dedup<T>(mutable: Vec<T>, file: Vec<T>, id_of: impl Fn(&T) -> &str) -> Vec<T> {
    let claimed: HashSet<String> = mutable.iter().map(|item| id_of(item).to_string()).collect();
    let mut merged = mutable;
    for item in file {
        let id = id_of(&item);
        if claimed.contains(id) {
            debug!(id, "id present in both stores; keeping the mutable copy");
            continue;
        }
        merged.push(item);
    }
    merged
}

/// Fall through to the file store only on `NotFound`.
fn layer<T>(primary: StoreResult<T>) -> Result<Option<T>, StoreError> {
    match primary {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Layered organization-unit store.
pub struct CompositeOrganizationUnitStore {
    file: Arc<dyn OrganizationUnitStore>,
    mutable: Arc<dyn OrganizationUnitStore>,
}

impl CompositeOrganizationUnitStore {
    /// Layer a file-backed store over a mutable one.
    #[must_use]
    pub fn new(
        file: Arc<dyn OrganizationUnitStore>,
        mutable: Arc<dyn OrganizationUnitStore>,
    ) -> Self {
        Self { file, mutable }
    }

    async fn merged_roots(&self) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let mutable_count = self.mutable.list_count().await?;
        let mutable_items = if mutable_count == 0 {
            Vec::new()
        } else {
            self.mutable.list(mutable_count, 0).await?
        };
        let file_count = self.file.list_count().await?;
        let file_items = if file_count == 0 {
            Vec::new()
        } else {
            self.file.list(file_count, 0).await?
        };
        Ok(merge_dedup(mutable_items, file_items, |ou| ou.id.as_str()))
    }

    async fn merged_children(&self, id: &str) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let mutable_count = self.mutable.children_count(id).await?;
        let mutable_items = if mutable_count == 0 {
            Vec::new()
        } else {
            self.mutable.children(id, mutable_count, 0).await?
        };
        let file_count = self.file.children_count(id).await?;
        let file_items = if file_count == 0 {
            Vec::new()
        } else {
            self.file.children(id, file_count, 0).await?
        };
        Ok(merge_dedup(mutable_items, file_items, |ou| ou.id.as_str()))
    }
}

#[async_trait]
impl OrganizationUnitStore for CompositeOrganizationUnitStore {
    async fn create(&self, ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        self.mutable.create(ou).await
    }

    async fn get(&self, id: &str) -> StoreResult<OrganizationUnit> {
        match layer(self.mutable.get(id).await)? {
            Some(ou) => Ok(ou),
            None => self.file.get(id).await,
        }
    }

    async fn get_by_path(&self, handles: &[String]) -> StoreResult<OrganizationUnit> {
        match layer(self.mutable.get_by_path(handles).await)? {
            Some(ou) => Ok(ou),
            None => self.file.get_by_path(handles).await,
        }
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        if self.file.exists(id).await? {
            return Ok(true);
        }
        self.mutable.exists(id).await
    }

    async fn update(&self, id: &str, ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        self.mutable.update(id, ou).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.mutable.delete(id).await
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self.mutable.list_count().await? + self.file.list_count().await?)
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<OrganizationUnitBasic>> {
        Ok(paginate(self.merged_roots().await?, limit, offset))
    }

    async fn children_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self.mutable.children_count(id).await? + self.file.children_count(id).await?)
    }

    async fn children(
        &self,
        id: &str,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<OrganizationUnitBasic>> {
        Ok(paginate(self.merged_children(id).await?, limit, offset))
    }

    async fn check_name_conflict(&self, name: &str, parent: Option<&str>) -> StoreResult<bool> {
        if self.file.check_name_conflict(name, parent).await? {
            return Ok(true);
        }
        self.mutable.check_name_conflict(name, parent).await
    }

    async fn check_handle_conflict(&self, handle: &str, parent: Option<&str>) -> StoreResult<bool> {
        if self.file.check_handle_conflict(handle, parent).await? {
            return Ok(true);
        }
        self.mutable.check_handle_conflict(handle, parent).await
    }

    async fn has_child_resources(&self, id: &str) -> StoreResult<bool> {
        if self.file.has_child_resources(id).await? {
            return Ok(true);
        }
        self.mutable.has_child_resources(id).await
    }

    async fn users_count(&self, id: &str) -> StoreResult<usize> {
        // The file store never holds assignments; summing keeps the layering
        // uniform anyway.
        Ok(self.mutable.users_count(id).await? + self.file.users_count(id).await?)
    }

    async fn users(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>> {
        let count = self.mutable.users_count(id).await?;
        let assigned = if count == 0 {
            Vec::new()
        } else {
            self.mutable.users(id, count, 0).await?
        };
        Ok(paginate(assigned, limit, offset))
    }

    async fn groups_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self.mutable.groups_count(id).await? + self.file.groups_count(id).await?)
    }

    async fn groups(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>> {
        let count = self.mutable.groups_count(id).await?;
        let assigned = if count == 0 {
            Vec::new()
        } else {
            self.mutable.groups(id, count, 0).await?
        };
        Ok(paginate(assigned, limit, offset))
    }

    async fn is_immutable(&self, id: &str) -> StoreResult<bool> {
        self.file.exists(id).await
    }
}

/// Layered application store.
pub struct CompositeApplicationStore {
    file: Arc<dyn ApplicationStore>,
    mutable: Arc<dyn ApplicationStore>,
}

impl CompositeApplicationStore {
    /// Layer a file-backed store over a mutable one.
    #[must_use]
    pub fn new(file: Arc<dyn ApplicationStore>, mutable: Arc<dyn ApplicationStore>) -> Self {
        Self { file, mutable }
    }

    async fn merged(&self) -> StoreResult<Vec<Application>> {
        let mutable_count = self.mutable.list_count().await?;
        let mutable_items = if mutable_count == 0 {
            Vec::new()
        } else {
            self.mutable.list(mutable_count, 0).await?
        };
        let file_count = self.file.list_count().await?;
        let file_items = if file_count == 0 {
            Vec::new()
        } else {
            self.file.list(file_count, 0).await?
        };
        Ok(merge_dedup(mutable_items, file_items, |app| app.id.as_str()))
    }
}

#[async_trait]
impl ApplicationStore for CompositeApplicationStore {
    async fn create(&self, app: Application) -> StoreResult<Application> {
        self.mutable.create(app).await
    }

    async fn get(&self, id: &str) -> StoreResult<Application> {
        match layer(self.mutable.get(id).await)? {
            Some(app) => Ok(app),
            None => self.file.get(id).await,
        }
    }

    async fn get_by_client_id(&self, client_id: &str) -> StoreResult<Application> {
        match layer(self.mutable.get_by_client_id(client_id).await)? {
            Some(app) => Ok(app),
            None => self.file.get_by_client_id(client_id).await,
        }
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        if self.file.exists(id).await? {
            return Ok(true);
        }
        self.mutable.exists(id).await
    }

    async fn update(&self, id: &str, app: Application) -> StoreResult<Application> {
        self.mutable.update(id, app).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.mutable.delete(id).await
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self.mutable.list_count().await? + self.file.list_count().await?)
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<Application>> {
        Ok(paginate(self.merged().await?, limit, offset))
    }

    async fn check_name_exists(&self, name: &str) -> StoreResult<bool> {
        if self.file.check_name_exists(name).await? {
            return Ok(true);
        }
        self.mutable.check_name_exists(name).await
    }

    async fn is_immutable(&self, id: &str) -> StoreResult<bool> {
        self.file.exists(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thunder_core::{Entity, EntityPayload};

    use crate::memory::InMemoryOrganizationUnitStore;
    use crate::ou::OrganizationUnitFileStore;
    use crate::resource_store::ResourceStore;

    fn ou(id: &str, handle: &str, name: &str, parent: Option<&str>) -> OrganizationUnit {
        OrganizationUnit {
            id: id.to_string(),
            handle: handle.to_string(),
            name: name.to_string(),
            description: String::new(),
            parent: parent.map(str::to_string),
        }
    }

    fn composite_with(
        file_ous: Vec<OrganizationUnit>,
    ) -> (CompositeOrganizationUnitStore, Arc<InMemoryOrganizationUnitStore>) {
        let resources = Arc::new(ResourceStore::new());
        for o in file_ous {
            resources
                .set(Entity::new(o.id.clone(), EntityPayload::OrganizationUnit(o)))
                .unwrap();
        }
        let file = Arc::new(OrganizationUnitFileStore::new(resources));
        let mutable = Arc::new(InMemoryOrganizationUnitStore::new());
        (
            CompositeOrganizationUnitStore::new(file, Arc::clone(&mutable) as _),
            mutable,
        )
    }

    #[tokio::test]
    async fn reads_layer_mutable_then_file() {
        let (store, mutable) = composite_with(vec![ou("customers", "customers", "Customers", None)]);
        mutable.create(ou("support", "support", "Support", None)).await.unwrap();

        assert_eq!(store.get("customers").await.unwrap().name, "Customers");
        assert_eq!(store.get("support").await.unwrap().name, "Support");
        assert!(matches!(store.get("nope").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn counts_sum_and_lists_merge_mutable_first() {
        let (store, mutable) = composite_with(vec![ou("customers", "customers", "Customers", None)]);
        mutable.create(ou("support", "support", "Support", None)).await.unwrap();

        assert_eq!(store.list_count().await.unwrap(), 2);
        let ids: Vec<String> = store
            .list(10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["support", "customers"]);
    }

    #[tokio::test]
    async fn id_collision_keeps_the_mutable_copy() {
        let (store, mutable) = composite_with(vec![ou("dup", "dup", "File Copy", None)]);
        mutable.create(ou("dup", "dup-db", "Db Copy", None)).await.unwrap();

        let merged = store.list(10, 0).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Db Copy");
    }

    #[tokio::test]
    async fn conflicts_report_from_either_side() {
        let (store, mutable) = composite_with(vec![ou("customers", "customers", "Customers", None)]);
        mutable.create(ou("support", "support", "Support", None)).await.unwrap();

        assert!(store.check_handle_conflict("customers", None).await.unwrap());
        assert!(store.check_name_conflict("Support", None).await.unwrap());
        assert!(!store.check_name_conflict("Missing", None).await.unwrap());
    }

    #[tokio::test]
    async fn immutability_is_file_membership() {
        let (store, mutable) = composite_with(vec![ou("customers", "customers", "Customers", None)]);
        mutable.create(ou("support", "support", "Support", None)).await.unwrap();

        assert!(store.is_immutable("customers").await.unwrap());
        assert!(!store.is_immutable("support").await.unwrap());
    }

    #[tokio::test]
    async fn writes_go_to_the_mutable_store() {
        let (store, mutable) = composite_with(vec![ou("customers", "customers", "Customers", None)]);
        store.create(ou("support", "support", "Support", None)).await.unwrap();
        assert!(mutable.get("support").await.is_ok());

        // Mutating an id that only the file store holds is a mutable-store
        // NotFound; the service layer rejects it earlier via is_immutable.
        assert!(matches!(
            store.delete("customers").await,
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn store_mode_parsing_is_lenient_about_case_and_space() {
        assert_eq!(StoreMode::parse(" Composite "), Some(StoreMode::Composite));
        assert_eq!(StoreMode::parse("MUTABLE"), Some(StoreMode::Mutable));
        assert_eq!(StoreMode::parse("immutable"), Some(StoreMode::Immutable));
        assert_eq!(StoreMode::parse("hybrid"), None);
        assert_eq!(StoreMode::parse(""), None);
    }
}
