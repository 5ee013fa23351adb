//! Organization-unit stores and loader wiring.

mod file;

pub use file::OrganizationUnitFileStore;

use std::sync::Arc;

use thunder_core::{EntityPayload, ResourceKind};

use crate::contract::ExistenceChecker;
use crate::loader::{ResourceConfig, ResourceValidator};

/// Directory under the resource root holding declared OUs.
pub const DIRECTORY_NAME: &str = "organization_units";

/// Semantic validator for declared organization units.
///
/// Requires a non-empty id, handle, and name. Parent references are not
/// resolved at load time; files load in lexicographic order and a child may
/// legitimately precede its parent.
pub struct OrganizationUnitResourceValidator;

#[async_trait::async_trait]
impl ResourceValidator for OrganizationUnitResourceValidator {
    async fn validate(
        &self,
        payload: &EntityPayload,
        _checker: Option<&dyn ExistenceChecker>,
    ) -> Result<(), String> {
        let Some(ou) = payload.as_organization_unit() else {
            return Err("payload is not an organization unit".to_string());
        };
        if ou.id.is_empty() {
            return Err("organization unit id must not be empty".to_string());
        }
        if ou.handle.is_empty() {
            return Err("organization unit handle must not be empty".to_string());
        }
        if ou.name.is_empty() {
            return Err("organization unit name must not be empty".to_string());
        }
        Ok(())
    }
}

/// Loader configuration for the `organization_units` directory.
///
/// `existence_checker` guards cross-store id uniqueness in composite mode.
/// The current wiring passes `None` here, matching the provisioning
/// assumption that the mutable backend was seeded consistently.
#[must_use]
pub fn resource_config(existence_checker: Option<Arc<dyn ExistenceChecker>>) -> ResourceConfig {
    ResourceConfig {
        kind: ResourceKind::OrganizationUnit,
        directory_name: DIRECTORY_NAME.to_string(),
        parser: Box::new(|bytes| {
            serde_yaml::from_slice(bytes)
                .map(EntityPayload::OrganizationUnit)
                .map_err(|e| e.to_string())
        }),
        validator: Box::new(OrganizationUnitResourceValidator),
        id_extractor: Box::new(|payload| match payload {
            EntityPayload::OrganizationUnit(ou) => ou.id.clone(),
            EntityPayload::Application(app) => app.id.clone(),
        }),
        existence_checker,
    }
}
