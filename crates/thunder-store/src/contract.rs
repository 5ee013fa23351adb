//! Polymorphic store contracts.
//!
//! Every backend for a resource kind (file-backed, database-backed, or the
//! composite layering of the two) satisfies the same contract, so the service
//! layer never learns which wiring is active. Mutations on an immutable
//! backend return [`StoreError::OperationNotSupported`].
//!
//! The contracts are async because the mutable backend suspends on connection
//! acquisition and query execution; file-backed implementations complete
//! without suspending.

use async_trait::async_trait;

use thunder_core::models::{Application, OrganizationUnit, OrganizationUnitBasic};

use crate::error::StoreError;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Existence capability handed to load-time validators.
///
/// In composite mode the loader must reject a declared resource whose id
/// already exists in the mutable backend. The validator receives this
/// capability explicitly rather than closing over a store reference.
#[async_trait]
pub trait ExistenceChecker: Send + Sync {
    /// Whether an entity with `id` already exists in the backend.
    async fn exists(&self, id: &str) -> StoreResult<bool>;
}

/// Store contract for organization units.
#[async_trait]
pub trait OrganizationUnitStore: Send + Sync {
    /// Insert a new OU.
    async fn create(&self, ou: OrganizationUnit) -> StoreResult<OrganizationUnit>;

    /// Fetch an OU by id.
    async fn get(&self, id: &str) -> StoreResult<OrganizationUnit>;

    /// Resolve a hierarchical path of handles to an OU.
    ///
    /// Resolution is iterative: each handle is looked up under the parent
    /// resolved so far, starting at the root bucket. Any missing segment is
    /// [`StoreError::NotFound`].
    async fn get_by_path(&self, handles: &[String]) -> StoreResult<OrganizationUnit>;

    /// Whether an OU with `id` exists.
    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Replace the OU under `id`.
    async fn update(&self, id: &str, ou: OrganizationUnit) -> StoreResult<OrganizationUnit>;

    /// Remove the OU under `id`.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Number of root OUs.
    async fn list_count(&self) -> StoreResult<usize>;

    /// Page of root OUs.
    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<OrganizationUnitBasic>>;

    /// Number of direct children of `id`.
    async fn children_count(&self, id: &str) -> StoreResult<usize>;

    /// Page of direct children of `id`.
    async fn children(
        &self,
        id: &str,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<OrganizationUnitBasic>>;

    /// Whether `(parent, name)` is already taken. The root bucket
    /// (`parent == None`) is distinct from any concrete parent id.
    async fn check_name_conflict(&self, name: &str, parent: Option<&str>) -> StoreResult<bool>;

    /// Whether `(parent, handle)` is already taken.
    async fn check_handle_conflict(&self, handle: &str, parent: Option<&str>) -> StoreResult<bool>;

    /// Whether any entity lists `id` as its parent, or any users/groups are
    /// assigned under it.
    async fn has_child_resources(&self, id: &str) -> StoreResult<bool>;

    /// Number of users assigned directly to `id`.
    async fn users_count(&self, id: &str) -> StoreResult<usize>;

    /// Page of user ids assigned directly to `id`.
    async fn users(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>>;

    /// Number of groups assigned directly to `id`.
    async fn groups_count(&self, id: &str) -> StoreResult<usize>;

    /// Page of group ids assigned directly to `id`.
    async fn groups(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>>;

    /// Whether `id` is declared in the immutable backend and therefore
    /// writable by nobody. Mutable-only wirings always answer `false`.
    async fn is_immutable(&self, id: &str) -> StoreResult<bool>;
}

/// Store contract for applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application.
    async fn create(&self, app: Application) -> StoreResult<Application>;

    /// Fetch an application by id.
    async fn get(&self, id: &str) -> StoreResult<Application>;

    /// Fetch the application owning an OAuth client id.
    async fn get_by_client_id(&self, client_id: &str) -> StoreResult<Application>;

    /// Whether an application with `id` exists.
    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Replace the application under `id`.
    async fn update(&self, id: &str, app: Application) -> StoreResult<Application>;

    /// Remove the application under `id`.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Total number of applications.
    async fn list_count(&self) -> StoreResult<usize>;

    /// Page of applications.
    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<Application>>;

    /// Whether an application with `name` exists. Names are unique across
    /// the union of backends.
    async fn check_name_exists(&self, name: &str) -> StoreResult<bool>;

    /// Whether `id` is declared in the immutable backend.
    async fn is_immutable(&self, id: &str) -> StoreResult<bool>;
}
