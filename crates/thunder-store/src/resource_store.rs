//! Generic immutable resource store.
//!
//! A process-wide mapping from composite key to entity, partitioned by
//! resource kind so kind-scoped listing does not scan unrelated partitions.
//! The loader populates it single-threaded before the HTTP listener binds;
//! after that the store is effectively frozen and reads are concurrent.
//!
//! Key-based operations are O(1) average; list operations are O(n) over the
//! relevant partition.

use std::collections::HashMap;

use parking_lot::RwLock;

use thunder_core::{Entity, ResourceKey, ResourceKind};

use crate::error::StoreError;

/// Kind-partitioned in-memory entity store.
#[derive(Debug, Default)]
pub struct ResourceStore {
    partitions: RwLock<HashMap<ResourceKind, HashMap<String, Entity>>>,
}

impl ResourceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the entity under `key`, if present.
    #[must_use]
    pub fn get(&self, key: &ResourceKey) -> Option<Entity> {
        self.partitions
            .read()
            .get(&key.kind)
            .and_then(|partition| partition.get(&key.id))
            .cloned()
    }

    /// Insert an entity. Used only by the loader.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] if the key is already taken;
    /// duplicate declarations are a start-up failure, never a silent
    /// overwrite.
    pub fn set(&self, entity: Entity) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write();
        let partition = partitions.entry(entity.key.kind).or_default();
        if partition.contains_key(&entity.key.id) {
            return Err(StoreError::UniqueViolation(entity.key.to_string()));
        }
        partition.insert(entity.key.id.clone(), entity);
        Ok(())
    }

    /// Remove the entity under `key`. Used only by tests and teardown.
    pub fn delete(&self, key: &ResourceKey) -> Option<Entity> {
        self.partitions
            .write()
            .get_mut(&key.kind)
            .and_then(|partition| partition.remove(&key.id))
    }

    /// All entities across every kind, ordered by key id within each kind.
    #[must_use]
    pub fn list(&self) -> Vec<Entity> {
        let partitions = self.partitions.read();
        let mut entities: Vec<Entity> = partitions
            .values()
            .flat_map(|partition| partition.values().cloned())
            .collect();
        entities.sort_by(|a, b| (a.key.kind.as_str(), &a.key.id).cmp(&(b.key.kind.as_str(), &b.key.id)));
        entities
    }

    /// Entities sharing `id` across kinds.
    #[must_use]
    pub fn list_by_id(&self, id: &str) -> Vec<Entity> {
        let partitions = self.partitions.read();
        let mut entities: Vec<Entity> = partitions
            .values()
            .filter_map(|partition| partition.get(id).cloned())
            .collect();
        entities.sort_by(|a, b| a.key.kind.as_str().cmp(b.key.kind.as_str()));
        entities
    }

    /// All entities of one kind, ordered by id.
    #[must_use]
    pub fn list_by_kind(&self, kind: ResourceKind) -> Vec<Entity> {
        let partitions = self.partitions.read();
        let mut entities: Vec<Entity> = partitions
            .get(&kind)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default();
        entities.sort_by(|a, b| a.key.id.cmp(&b.key.id));
        entities
    }

    /// Number of entities of one kind.
    #[must_use]
    pub fn count_by_kind(&self, kind: ResourceKind) -> usize {
        self.partitions
            .read()
            .get(&kind)
            .map_or(0, HashMap::len)
    }

    /// Drop every entity. Test/teardown hook.
    pub fn clear(&self) {
        self.partitions.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thunder_core::models::OrganizationUnit;
    use thunder_core::EntityPayload;

    fn ou_entity(id: &str, parent: Option<&str>) -> Entity {
        Entity::new(
            id,
            EntityPayload::OrganizationUnit(OrganizationUnit {
                id: id.to_string(),
                handle: id.to_string(),
                name: id.to_uppercase(),
                description: String::new(),
                parent: parent.map(str::to_string),
            }),
        )
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = ResourceStore::new();
        store.set(ou_entity("eng", None)).unwrap();
        let key = ResourceKey::new(ResourceKind::OrganizationUnit, "eng");
        assert_eq!(store.get(&key).unwrap().key, key);
    }

    #[test]
    fn duplicate_set_is_rejected_first_wins() {
        let store = ResourceStore::new();
        store.set(ou_entity("eng", None)).unwrap();
        let mut second = ou_entity("eng", None);
        if let EntityPayload::OrganizationUnit(ou) = &mut second.payload {
            ou.name = "Engineering Two".to_string();
        }
        assert!(matches!(
            store.set(second),
            Err(StoreError::UniqueViolation(_))
        ));
        let key = ResourceKey::new(ResourceKind::OrganizationUnit, "eng");
        let kept = store.get(&key).unwrap();
        assert_eq!(
            kept.payload.as_organization_unit().unwrap().name,
            "ENG".to_string()
        );
    }

    #[test]
    fn list_by_kind_is_partition_scoped_and_ordered() {
        let store = ResourceStore::new();
        store.set(ou_entity("b", None)).unwrap();
        store.set(ou_entity("a", None)).unwrap();
        store.set(ou_entity("c", Some("a"))).unwrap();
        let ids: Vec<String> = store
            .list_by_kind(ResourceKind::OrganizationUnit)
            .into_iter()
            .map(|e| e.key.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.count_by_kind(ResourceKind::OrganizationUnit), 3);
        assert_eq!(store.count_by_kind(ResourceKind::Application), 0);
    }

    #[test]
    fn clear_and_delete_empty_the_store() {
        let store = ResourceStore::new();
        store.set(ou_entity("a", None)).unwrap();
        store.set(ou_entity("b", None)).unwrap();
        let key = ResourceKey::new(ResourceKind::OrganizationUnit, "a");
        assert!(store.delete(&key).is_some());
        assert!(store.get(&key).is_none());
        store.clear();
        assert_eq!(store.count_by_kind(ResourceKind::OrganizationUnit), 0);
    }
}
