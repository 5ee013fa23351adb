//! In-memory implementation of the mutable-store contracts.
//!
//! The production mutable backend is a database reached through the same
//! contracts; its schema and driver live outside this crate. This
//! implementation keeps the contract honest for runtime wiring and tests: it
//! enforces id and `(parent, name)` / `(parent, handle)` uniqueness
//! atomically under its write lock, the way the database does with
//! constraints, and stamps entities with audit timestamps.
//!
//! Listing order is insertion order (creation time, then id), which is what a
//! keyed table with a creation-time index would return.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use thunder_core::models::{Application, OrganizationUnit, OrganizationUnitBasic};

use crate::contract::{ApplicationStore, ExistenceChecker, OrganizationUnitStore, StoreResult};
use crate::error::StoreError;
use crate::page::paginate;

#[derive(Debug, Clone)]
struct StoredOrganizationUnit {
    ou: OrganizationUnit,
    created_at: DateTime<Utc>,
    // Audit trail only; nothing reads it back yet.
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

/// Mutable organization-unit store backed by process memory.
#[derive(Default)]
pub struct InMemoryOrganizationUnitStore {
    items: RwLock<HashMap<String, StoredOrganizationUnit>>,
    users: RwLock<HashMap<String, Vec<String>>>,
    groups: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryOrganizationUnitStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a user to an OU. The user data plane lives elsewhere; this
    /// records only the membership edge.
    pub fn assign_user(&self, ou_id: &str, user_id: impl Into<String>) {
        self.users
            .write()
            .entry(ou_id.to_string())
            .or_default()
            .push(user_id.into());
    }

    /// Assign a group to an OU.
    pub fn assign_group(&self, ou_id: &str, group_id: impl Into<String>) {
        self.groups
            .write()
            .entry(ou_id.to_string())
            .or_default()
            .push(group_id.into());
    }

    fn sorted(items: &HashMap<String, StoredOrganizationUnit>) -> Vec<OrganizationUnit> {
        let mut stored: Vec<&StoredOrganizationUnit> = items.values().collect();
        stored.sort_by(|a, b| (a.created_at, &a.ou.id).cmp(&(b.created_at, &b.ou.id)));
        stored.iter().map(|s| s.ou.clone()).collect()
    }

    fn parent_matches(ou: &OrganizationUnit, parent: Option<&str>) -> bool {
        ou.parent.as_deref() == parent
    }
}

#[async_trait]
impl OrganizationUnitStore for InMemoryOrganizationUnitStore {
    async fn create(&self, ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        let mut items = self.items.write();
        if items.contains_key(&ou.id) {
            return Err(StoreError::UniqueViolation(format!("id '{}'", ou.id)));
        }
        let parent = ou.parent.as_deref();
        for existing in items.values() {
            if Self::parent_matches(&existing.ou, parent) {
                if existing.ou.name == ou.name {
                    return Err(StoreError::UniqueViolation(format!(
                        "name '{}' under parent {:?}",
                        ou.name, parent
                    )));
                }
                if existing.ou.handle == ou.handle {
                    return Err(StoreError::UniqueViolation(format!(
                        "handle '{}' under parent {:?}",
                        ou.handle, parent
                    )));
                }
            }
        }
        let now = Utc::now();
        items.insert(
            ou.id.clone(),
            StoredOrganizationUnit {
                ou: ou.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(ou)
    }

    async fn get(&self, id: &str) -> StoreResult<OrganizationUnit> {
        self.items
            .read()
            .get(id)
            .map(|stored| stored.ou.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_path(&self, handles: &[String]) -> StoreResult<OrganizationUnit> {
        if handles.is_empty() {
            return Err(StoreError::NotFound);
        }
        let items = self.items.read();
        let mut parent: Option<String> = None;
        let mut resolved: Option<OrganizationUnit> = None;
        for handle in handles {
            let next = items
                .values()
                .map(|stored| &stored.ou)
                .find(|ou| ou.handle == *handle && Self::parent_matches(ou, parent.as_deref()))
                .cloned()
                .ok_or(StoreError::NotFound)?;
            parent = Some(next.id.clone());
            resolved = Some(next);
        }
        resolved.ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.items.read().contains_key(id))
    }

    async fn update(&self, id: &str, ou: OrganizationUnit) -> StoreResult<OrganizationUnit> {
        let mut items = self.items.write();
        if !items.contains_key(id) {
            return Err(StoreError::NotFound);
        }
        let parent = ou.parent.as_deref();
        for (existing_id, existing) in items.iter() {
            if existing_id != id && Self::parent_matches(&existing.ou, parent) {
                if existing.ou.name == ou.name {
                    return Err(StoreError::UniqueViolation(format!(
                        "name '{}' under parent {:?}",
                        ou.name, parent
                    )));
                }
                if existing.ou.handle == ou.handle {
                    return Err(StoreError::UniqueViolation(format!(
                        "handle '{}' under parent {:?}",
                        ou.handle, parent
                    )));
                }
            }
        }
        let stored = items.get_mut(id).ok_or(StoreError::NotFound)?;
        stored.ou = ou.clone();
        stored.updated_at = Utc::now();
        Ok(ou)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let removed = self.items.write().remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound);
        }
        self.users.write().remove(id);
        self.groups.write().remove(id);
        Ok(())
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self
            .items
            .read()
            .values()
            .filter(|stored| stored.ou.is_root())
            .count())
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let roots: Vec<OrganizationUnitBasic> = Self::sorted(&self.items.read())
            .iter()
            .filter(|ou| ou.is_root())
            .map(OrganizationUnit::to_basic)
            .collect();
        Ok(paginate(roots, limit, offset))
    }

    async fn children_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self
            .items
            .read()
            .values()
            .filter(|stored| stored.ou.parent.as_deref() == Some(id))
            .count())
    }

    async fn children(
        &self,
        id: &str,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<OrganizationUnitBasic>> {
        let children: Vec<OrganizationUnitBasic> = Self::sorted(&self.items.read())
            .iter()
            .filter(|ou| ou.parent.as_deref() == Some(id))
            .map(OrganizationUnit::to_basic)
            .collect();
        Ok(paginate(children, limit, offset))
    }

    async fn check_name_conflict(&self, name: &str, parent: Option<&str>) -> StoreResult<bool> {
        Ok(self
            .items
            .read()
            .values()
            .any(|stored| stored.ou.name == name && Self::parent_matches(&stored.ou, parent)))
    }

    async fn check_handle_conflict(&self, handle: &str, parent: Option<&str>) -> StoreResult<bool> {
        Ok(self
            .items
            .read()
            .values()
            .any(|stored| stored.ou.handle == handle && Self::parent_matches(&stored.ou, parent)))
    }

    async fn has_child_resources(&self, id: &str) -> StoreResult<bool> {
        let has_child_ou = self
            .items
            .read()
            .values()
            .any(|stored| stored.ou.parent.as_deref() == Some(id));
        let has_users = self.users.read().get(id).is_some_and(|v| !v.is_empty());
        let has_groups = self.groups.read().get(id).is_some_and(|v| !v.is_empty());
        Ok(has_child_ou || has_users || has_groups)
    }

    async fn users_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self.users.read().get(id).map_or(0, Vec::len))
    }

    async fn users(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>> {
        let assigned = self.users.read().get(id).cloned().unwrap_or_default();
        Ok(paginate(assigned, limit, offset))
    }

    async fn groups_count(&self, id: &str) -> StoreResult<usize> {
        Ok(self.groups.read().get(id).map_or(0, Vec::len))
    }

    async fn groups(&self, id: &str, limit: usize, offset: usize) -> StoreResult<Vec<String>> {
        let assigned = self.groups.read().get(id).cloned().unwrap_or_default();
        Ok(paginate(assigned, limit, offset))
    }

    async fn is_immutable(&self, _id: &str) -> StoreResult<bool> {
        Ok(false)
    }
}

#[async_trait]
impl ExistenceChecker for InMemoryOrganizationUnitStore {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.items.read().contains_key(id))
    }
}

#[derive(Debug, Clone)]
struct StoredApplication {
    app: Application,
    created_at: DateTime<Utc>,
    // Audit trail only; nothing reads it back yet.
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

/// Mutable application store backed by process memory.
#[derive(Default)]
pub struct InMemoryApplicationStore {
    items: RwLock<HashMap<String, StoredApplication>>,
}

impl InMemoryApplicationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(items: &HashMap<String, StoredApplication>) -> Vec<Application> {
        let mut stored: Vec<&StoredApplication> = items.values().collect();
        stored.sort_by(|a, b| (a.created_at, &a.app.id).cmp(&(b.created_at, &b.app.id)));
        stored.iter().map(|s| s.app.clone()).collect()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn create(&self, app: Application) -> StoreResult<Application> {
        let mut items = self.items.write();
        if items.contains_key(&app.id) {
            return Err(StoreError::UniqueViolation(format!("id '{}'", app.id)));
        }
        if items.values().any(|stored| stored.app.name == app.name) {
            return Err(StoreError::UniqueViolation(format!("name '{}'", app.name)));
        }
        let now = Utc::now();
        items.insert(
            app.id.clone(),
            StoredApplication {
                app: app.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(app)
    }

    async fn get(&self, id: &str) -> StoreResult<Application> {
        self.items
            .read()
            .get(id)
            .map(|stored| stored.app.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_client_id(&self, client_id: &str) -> StoreResult<Application> {
        self.items
            .read()
            .values()
            .map(|stored| &stored.app)
            .find(|app| {
                app.oauth_config()
                    .is_some_and(|oauth| oauth.client_id == client_id)
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.items.read().contains_key(id))
    }

    async fn update(&self, id: &str, app: Application) -> StoreResult<Application> {
        let mut items = self.items.write();
        if !items.contains_key(id) {
            return Err(StoreError::NotFound);
        }
        if items
            .iter()
            .any(|(existing_id, stored)| existing_id != id && stored.app.name == app.name)
        {
            return Err(StoreError::UniqueViolation(format!("name '{}'", app.name)));
        }
        let stored = items.get_mut(id).ok_or(StoreError::NotFound)?;
        stored.app = app.clone();
        stored.updated_at = Utc::now();
        Ok(app)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        match self.items.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_count(&self) -> StoreResult<usize> {
        Ok(self.items.read().len())
    }

    async fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<Application>> {
        Ok(paginate(Self::sorted(&self.items.read()), limit, offset))
    }

    async fn check_name_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.items.read().values().any(|stored| stored.app.name == name))
    }

    async fn is_immutable(&self, _id: &str) -> StoreResult<bool> {
        Ok(false)
    }
}

#[async_trait]
impl ExistenceChecker for InMemoryApplicationStore {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.items.read().contains_key(id))
    }
}
