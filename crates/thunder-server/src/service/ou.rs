//! Organization-unit service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use thunder_core::error::{ou as ou_errors, server as server_errors};
use thunder_core::models::{OrganizationUnit, OrganizationUnitBasic};
use thunder_core::ServiceError;
use thunder_store::{OrganizationUnitStore, StoreError};

use crate::context::RequestContext;
use crate::pagination::PageParams;
use crate::service::ListResult;

/// Upper bound on parent-chain walks. Chains are acyclic by invariant; the
/// cap keeps corrupted data from hanging a request.
const MAX_HIERARCHY_DEPTH: usize = 1_000;

/// Create request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationUnitRequest {
    /// Short URL-safe identifier, unique within the parent
    pub handle: String,
    /// Display name, unique within the parent
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Parent OU id; absent for a root OU
    #[serde(default)]
    pub parent: Option<String>,
}

/// Update request payload. The full record is replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationUnitRequest {
    /// Short URL-safe identifier
    pub handle: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Parent OU id; absent re-parents to the root bucket
    #[serde(default)]
    pub parent: Option<String>,
}

/// Organization-unit operations over whichever store wiring is active.
pub struct OrganizationUnitService {
    store: Arc<dyn OrganizationUnitStore>,
}

impl OrganizationUnitService {
    /// Bind the service to a store wiring.
    #[must_use]
    pub fn new(store: Arc<dyn OrganizationUnitStore>) -> Self {
        Self { store }
    }

    /// Create an OU with a generated id.
    ///
    /// # Errors
    ///
    /// Validation, parent-lookup, or conflict failures from the catalog.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: CreateOrganizationUnitRequest,
    ) -> Result<OrganizationUnit, ServiceError> {
        if request.handle.is_empty() {
            return Err(ou_errors::invalid_request_format()
                .with_description("handle must not be empty"));
        }
        if request.name.is_empty() {
            return Err(
                ou_errors::invalid_request_format().with_description("name must not be empty")
            );
        }

        if let Some(parent) = request.parent.as_deref() {
            self.ensure_parent_exists(ctx, parent).await?;
        }
        self.ensure_no_conflicts(ctx, &request.name, &request.handle, request.parent.as_deref())
            .await?;

        let ou = OrganizationUnit {
            id: Uuid::new_v4().to_string(),
            handle: request.handle,
            name: request.name,
            description: request.description,
            parent: request.parent,
        };
        debug!(id = %ou.id, handle = %ou.handle, "creating organization unit");
        ctx.run(self.store.create(ou)).await.map_err(map_store_error)
    }

    /// Fetch an OU by id.
    ///
    /// # Errors
    ///
    /// `OU-NOT-FOUND` when no backend holds the id.
    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<OrganizationUnit, ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)
    }

    /// Resolve a handle path to an OU.
    ///
    /// # Errors
    ///
    /// `OU-INVALID-HANDLE-PATH` for an empty path, `OU-NOT-FOUND` for a
    /// missing segment.
    pub async fn get_by_path(
        &self,
        ctx: &RequestContext,
        handles: &[String],
    ) -> Result<OrganizationUnit, ServiceError> {
        if handles.is_empty() || handles.iter().any(String::is_empty) {
            return Err(ou_errors::invalid_handle_path());
        }
        ctx.run(self.store.get_by_path(handles))
            .await
            .map_err(map_store_error)
    }

    /// Replace the OU under `id`.
    ///
    /// # Errors
    ///
    /// Immutability, cycle, parent-lookup, or conflict failures.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        request: UpdateOrganizationUnitRequest,
    ) -> Result<OrganizationUnit, ServiceError> {
        let existing = ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        self.ensure_mutable(ctx, id).await?;

        if request.handle.is_empty() {
            return Err(ou_errors::invalid_request_format()
                .with_description("handle must not be empty"));
        }
        if request.name.is_empty() {
            return Err(
                ou_errors::invalid_request_format().with_description("name must not be empty")
            );
        }

        if let Some(parent) = request.parent.as_deref() {
            if parent == id {
                return Err(ou_errors::circular_dependency());
            }
            self.ensure_parent_exists(ctx, parent).await?;
            self.ensure_no_cycle(ctx, id, parent).await?;
        }

        let parent_changed = existing.parent != request.parent;
        if parent_changed || existing.name != request.name {
            let conflicting = ctx
                .run(self.store.check_name_conflict(&request.name, request.parent.as_deref()))
                .await
                .map_err(map_store_error)?;
            if conflicting {
                return Err(ou_errors::name_conflict());
            }
        }
        if parent_changed || existing.handle != request.handle {
            let conflicting = ctx
                .run(self.store.check_handle_conflict(&request.handle, request.parent.as_deref()))
                .await
                .map_err(map_store_error)?;
            if conflicting {
                return Err(ou_errors::handle_conflict());
            }
        }

        let ou = OrganizationUnit {
            id: id.to_string(),
            handle: request.handle,
            name: request.name,
            description: request.description,
            parent: request.parent,
        };
        ctx.run(self.store.update(id, ou))
            .await
            .map_err(map_store_error)
    }

    /// Delete the OU under `id`.
    ///
    /// # Errors
    ///
    /// `OU-CANNOT-DELETE` while child resources remain; immutability and
    /// lookup failures otherwise.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        self.ensure_mutable(ctx, id).await?;

        let has_children = ctx
            .run(self.store.has_child_resources(id))
            .await
            .map_err(map_store_error)?;
        if has_children {
            return Err(ou_errors::cannot_delete());
        }
        ctx.run(self.store.delete(id)).await.map_err(map_store_error)
    }

    /// Page of root OUs with the collection total.
    ///
    /// # Errors
    ///
    /// Store faults, classified.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: PageParams,
    ) -> Result<ListResult<OrganizationUnitBasic>, ServiceError> {
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

    /// Page of direct children of `id`.
    ///
    /// # Errors
    ///
    /// `OU-NOT-FOUND` when `id` is missing; store faults otherwise.
    pub async fn children(
        &self,
        ctx: &RequestContext,
        id: &str,
        params: PageParams,
    ) -> Result<ListResult<OrganizationUnitBasic>, ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        let total = ctx
            .run(self.store.children_count(id))
            .await
            .map_err(map_store_error)?;
        let items = ctx
            .run(self.store.children(id, params.limit, params.offset))
            .await
            .map_err(map_store_error)?;
        Ok(ListResult { total, items })
    }

    /// Page of user ids assigned directly to `id`.
    ///
    /// # Errors
    ///
    /// `OU-NOT-FOUND` when `id` is missing; store faults otherwise.
    pub async fn users(
        &self,
        ctx: &RequestContext,
        id: &str,
        params: PageParams,
    ) -> Result<ListResult<String>, ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        let total = ctx
            .run(self.store.users_count(id))
            .await
            .map_err(map_store_error)?;
        let items = ctx
            .run(self.store.users(id, params.limit, params.offset))
            .await
            .map_err(map_store_error)?;
        Ok(ListResult { total, items })
    }

    /// Page of group ids assigned directly to `id`.
    ///
    /// # Errors
    ///
    /// `OU-NOT-FOUND` when `id` is missing; store faults otherwise.
    pub async fn groups(
        &self,
        ctx: &RequestContext,
        id: &str,
        params: PageParams,
    ) -> Result<ListResult<String>, ServiceError> {
        ctx.run(self.store.get(id)).await.map_err(map_store_error)?;
        let total = ctx
            .run(self.store.groups_count(id))
            .await
            .map_err(map_store_error)?;
        let items = ctx
            .run(self.store.groups(id, params.limit, params.offset))
            .await
            .map_err(map_store_error)?;
        Ok(ListResult { total, items })
    }

    async fn ensure_parent_exists(
        &self,
        ctx: &RequestContext,
        parent: &str,
    ) -> Result<(), ServiceError> {
        let exists = ctx
            .run(self.store.exists(parent))
            .await
            .map_err(map_store_error)?;
        if exists {
            Ok(())
        } else {
            Err(ou_errors::parent_not_found())
        }
    }

    async fn ensure_no_conflicts(
        &self,
        ctx: &RequestContext,
        name: &str,
        handle: &str,
        parent: Option<&str>,
    ) -> Result<(), ServiceError> {
        let handle_taken = ctx
            .run(self.store.check_handle_conflict(handle, parent))
            .await
            .map_err(map_store_error)?;
        if handle_taken {
            return Err(ou_errors::handle_conflict());
        }
        let name_taken = ctx
            .run(self.store.check_name_conflict(name, parent))
            .await
            .map_err(map_store_error)?;
        if name_taken {
            return Err(ou_errors::name_conflict());
        }
        Ok(())
    }

    /// Walk the parent chain upward from `new_parent`; meeting `id` on the
    /// way means the re-parent would close a cycle.
    async fn ensure_no_cycle(
        &self,
        ctx: &RequestContext,
        id: &str,
        new_parent: &str,
    ) -> Result<(), ServiceError> {
        let mut current = new_parent.to_string();
        for _ in 0..MAX_HIERARCHY_DEPTH {
            if current == id {
                return Err(ou_errors::circular_dependency());
            }
            match ctx.run(self.store.get(&current)).await {
                Ok(ou) => match ou.parent {
                    Some(parent) => current = parent,
                    None => return Ok(()),
                },
                // A dangling ancestor reference ends the walk; it cannot
                // close a cycle through `id`.
                Err(StoreError::NotFound) => return Ok(()),
                Err(e) => return Err(map_store_error(e)),
            }
        }
        Err(ou_errors::circular_dependency())
    }

    async fn ensure_mutable(&self, ctx: &RequestContext, id: &str) -> Result<(), ServiceError> {
        let immutable = ctx
            .run(self.store.is_immutable(id))
            .await
            .map_err(map_store_error)?;
        if immutable {
            Err(ou_errors::cannot_modify_immutable())
        } else {
            Ok(())
        }
    }
}

/// Classify a raw store error for the OU surface.
fn map_store_error(e: StoreError) -> ServiceError {
    match e {
        StoreError::NotFound => ou_errors::not_found(),
        StoreError::OperationNotSupported => ou_errors::cannot_modify_immutable(),
        StoreError::UniqueViolation(detail) => {
            // The advisory check raced a concurrent writer; surface whichever
            // constraint the backend named.
            if detail.starts_with("name") {
                ou_errors::name_conflict()
            } else {
                ou_errors::handle_conflict()
            }
        }
        StoreError::PayloadMismatch { key } => server_errors::internal()
            .with_description(format!("stored payload for {key} failed the type check")),
        StoreError::Cancelled | StoreError::Internal(_) => server_errors::internal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thunder_store::memory::InMemoryOrganizationUnitStore;

    fn service() -> OrganizationUnitService {
        OrganizationUnitService::new(Arc::new(InMemoryOrganizationUnitStore::new()))
    }

    fn create_request(handle: &str, name: &str, parent: Option<&str>) -> CreateOrganizationUnitRequest {
        CreateOrganizationUnitRequest {
            handle: handle.to_string(),
            name: name.to_string(),
            description: String::new(),
            parent: parent.map(str::to_string),
        }
    }

    fn update_request(handle: &str, name: &str, parent: Option<&str>) -> UpdateOrganizationUnitRequest {
        UpdateOrganizationUnitRequest {
            handle: handle.to_string(),
            name: name.to_string(),
            description: String::new(),
            parent: parent.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_generates_ids_and_rejects_duplicates() {
        let service = service();
        let ctx = RequestContext::new();
        let root = service
            .create(&ctx, create_request("eng", "Engineering", None))
            .await
            .unwrap();
        assert!(!root.id.is_empty());

        let err = service
            .create(&ctx, create_request("eng", "Other", None))
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-HANDLE-CONFLICT");

        let err = service
            .create(&ctx, create_request("other", "Engineering", None))
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-NAME-CONFLICT");

        // Same pair under the new root is a different bucket.
        service
            .create(&ctx, create_request("eng", "Engineering", Some(&root.id)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_requires_an_existing_parent() {
        let service = service();
        let ctx = RequestContext::new();
        let err = service
            .create(&ctx, create_request("eng", "Engineering", Some("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-PARENT-NOT-FOUND");
    }

    #[tokio::test]
    async fn reparenting_to_self_or_descendant_is_circular() {
        let service = service();
        let ctx = RequestContext::new();
        let root = service
            .create(&ctx, create_request("root", "Root", None))
            .await
            .unwrap();
        let eng = service
            .create(&ctx, create_request("eng", "Engineering", Some(&root.id)))
            .await
            .unwrap();
        let backend = service
            .create(&ctx, create_request("backend", "Backend", Some(&eng.id)))
            .await
            .unwrap();

        let err = service
            .update(&ctx, &root.id, update_request("root", "Root", Some(&backend.id)))
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-CIRCULAR-DEPENDENCY");

        let err = service
            .update(&ctx, &root.id, update_request("root", "Root", Some(&root.id)))
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-CIRCULAR-DEPENDENCY");

        // An unrelated parent is fine.
        let sales = service
            .create(&ctx, create_request("sales", "Sales", None))
            .await
            .unwrap();
        service
            .update(&ctx, &sales.id, update_request("sales", "Sales", Some(&eng.id)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_refuses_while_children_remain() {
        let service = service();
        let ctx = RequestContext::new();
        let root = service
            .create(&ctx, create_request("root", "Root", None))
            .await
            .unwrap();
        service
            .create(&ctx, create_request("eng", "Engineering", Some(&root.id)))
            .await
            .unwrap();

        let err = service.delete(&ctx, &root.id).await.unwrap_err();
        assert_eq!(err.code, "OU-CANNOT-DELETE");
    }

    #[tokio::test]
    async fn update_keeping_the_same_name_does_not_self_conflict() {
        let service = service();
        let ctx = RequestContext::new();
        let root = service
            .create(&ctx, create_request("root", "Root", None))
            .await
            .unwrap();
        let updated = service
            .update(&ctx, &root.id, update_request("root", "Root", None))
            .await
            .unwrap();
        assert_eq!(updated.name, "Root");
    }

    #[tokio::test]
    async fn list_pages_and_totals_agree() {
        let service = service();
        let ctx = RequestContext::new();
        for i in 0..5 {
            service
                .create(&ctx, create_request(&format!("h{i}"), &format!("N{i}"), None))
                .await
                .unwrap();
        }
        let page = service
            .list(&ctx, PageParams { limit: 2, offset: 4 })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn empty_handle_path_is_invalid() {
        let service = service();
        let ctx = RequestContext::new();
        let err = service.get_by_path(&ctx, &[]).await.unwrap_err();
        assert_eq!(err.code, "OU-INVALID-HANDLE-PATH");
        let err = service
            .get_by_path(&ctx, &[String::new(), String::new()])
            .await
            .unwrap_err();
        assert_eq!(err.code, "OU-INVALID-HANDLE-PATH");
    }
}
