//! Cross-backend properties of the composite store.

use std::sync::Arc;

use proptest::prelude::*;

use thunder_core::models::OrganizationUnit;
use thunder_core::{Entity, EntityPayload};
use thunder_store::memory::InMemoryOrganizationUnitStore;
use thunder_store::ou::OrganizationUnitFileStore;
use thunder_store::{
    CompositeOrganizationUnitStore, OrganizationUnitStore, ResourceStore, StoreError,
};

fn ou(id: &str, handle: &str, name: &str, parent: Option<&str>) -> OrganizationUnit {
    OrganizationUnit {
        id: id.to_string(),
        handle: handle.to_string(),
        name: name.to_string(),
        description: String::new(),
        parent: parent.map(str::to_string),
    }
}

fn file_store_with(ous: Vec<OrganizationUnit>) -> Arc<OrganizationUnitFileStore> {
    let resources = Arc::new(ResourceStore::new());
    for o in ous {
        resources
            .set(Entity::new(o.id.clone(), EntityPayload::OrganizationUnit(o)))
            .unwrap();
    }
    Arc::new(OrganizationUnitFileStore::new(resources))
}

/// Same names and handles on distinct ids across backends: id lookups stay
/// backend-accurate, lists see both, conflict checks fire.
#[tokio::test]
async fn distinct_ids_with_identical_names_coexist_and_conflict() {
    let file = file_store_with(vec![ou("file-eng", "eng", "Engineering", None)]);
    let mutable = Arc::new(InMemoryOrganizationUnitStore::new());
    mutable
        .create(ou("db-eng", "eng2", "Engineering", None))
        .await
        .unwrap();
    let composite =
        CompositeOrganizationUnitStore::new(file, Arc::clone(&mutable) as Arc<dyn OrganizationUnitStore>);

    assert_eq!(composite.get("file-eng").await.unwrap().handle, "eng");
    assert_eq!(composite.get("db-eng").await.unwrap().handle, "eng2");

    let listed = composite.list(10, 0).await.unwrap();
    assert_eq!(listed.len(), 2);

    assert!(composite.check_name_conflict("Engineering", None).await.unwrap());
    assert!(composite.check_handle_conflict("eng", None).await.unwrap());
    assert!(composite.check_handle_conflict("eng2", None).await.unwrap());
}

/// Misconfigured duplicate ids: exactly one merged entry, the mutable one.
#[tokio::test]
async fn id_collisions_dedup_to_the_mutable_entry() {
    let file = file_store_with(vec![
        ou("shared", "file-h", "File Name", None),
        ou("file-only", "file-only", "File Only", None),
    ]);
    let mutable = Arc::new(InMemoryOrganizationUnitStore::new());
    mutable
        .create(ou("shared", "db-h", "Db Name", None))
        .await
        .unwrap();
    let composite =
        CompositeOrganizationUnitStore::new(file, Arc::clone(&mutable) as Arc<dyn OrganizationUnitStore>);

    let listed = composite.list(10, 0).await.unwrap();
    let shared: Vec<_> = listed.iter().filter(|o| o.id == "shared").collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].handle, "db-h");
    assert!(listed.iter().any(|o| o.id == "file-only"));
}

/// File-backed mutations refuse regardless of what the id is.
#[tokio::test]
async fn file_backed_entries_cannot_be_mutated() {
    let file = file_store_with(vec![ou("locked", "locked", "Locked", None)]);
    let target = file.get("locked").await.unwrap();
    assert!(matches!(
        file.update("locked", target.clone()).await,
        Err(StoreError::OperationNotSupported)
    ));
    assert!(matches!(
        file.delete("locked").await,
        Err(StoreError::OperationNotSupported)
    ));
}

/// Handle paths resolve back to the id they were built from.
#[tokio::test]
async fn path_round_trip() {
    let file = file_store_with(vec![
        ou("root", "root", "Root", None),
        ou("eng", "eng", "Engineering", Some("root")),
        ou("backend", "backend", "Backend", Some("eng")),
        ou("frontend", "frontend", "Frontend", Some("eng")),
    ]);
    for (id, path) in [
        ("root", vec!["root"]),
        ("eng", vec!["root", "eng"]),
        ("backend", vec!["root", "eng", "backend"]),
        ("frontend", vec!["root", "eng", "frontend"]),
    ] {
        let handles: Vec<String> = path.iter().map(|s| (*s).to_string()).collect();
        let by_path = file.get_by_path(&handles).await.unwrap();
        let by_id = file.get(id).await.unwrap();
        assert_eq!(by_path.id, by_id.id, "path {path:?}");
    }
}

proptest! {
    /// For every page with `offset < total`, the page size is
    /// `min(limit, total - offset)`; beyond the end the page is empty.
    #[test]
    fn pagination_totals_hold(total in 0usize..60, limit in 1usize..20, offset in 0usize..80) {
        let ous: Vec<OrganizationUnit> = (0..total)
            .map(|i| ou(&format!("id-{i:03}"), &format!("h-{i:03}"), &format!("N {i:03}"), None))
            .collect();
        let file = file_store_with(ous);

        let page = tokio_test::block_on(file.list(limit, offset)).unwrap();
        let expected = if offset < total { limit.min(total - offset) } else { 0 };
        prop_assert_eq!(page.len(), expected);
    }

    /// Root listings never surface an OU with a parent, whatever the shape
    /// of the hierarchy.
    #[test]
    fn root_listing_filters_children(roots in 0usize..10, children_per_root in 0usize..5) {
        let mut ous = Vec::new();
        for r in 0..roots {
            let root_id = format!("root-{r}");
            ous.push(ou(&root_id, &format!("rh-{r}"), &format!("Root {r}"), None));
            for c in 0..children_per_root {
                ous.push(ou(
                    &format!("child-{r}-{c}"),
                    &format!("ch-{r}-{c}"),
                    &format!("Child {r} {c}"),
                    Some(&root_id),
                ));
            }
        }
        let file = file_store_with(ous);

        let count = tokio_test::block_on(file.list_count()).unwrap();
        prop_assert_eq!(count, roots);
        let page = tokio_test::block_on(file.list(100, 0)).unwrap();
        prop_assert_eq!(page.len(), roots);
    }
}
