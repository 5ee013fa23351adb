//! Organization-unit records.

use serde::{Deserialize, Serialize};

/// A hierarchical grouping of principals and applications.
///
/// `parent` is the id of the containing OU; absence marks a root OU. The
/// service layer enforces that the parent relation stays acyclic and that
/// `(parent, name)` and `(parent, handle)` are unique across every backend,
/// with the root bucket (`parent` absent) distinct from any concrete parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUnit {
    /// Unique, non-empty id
    pub id: String,
    /// Short URL-safe identifier, unique within the parent
    pub handle: String,
    /// Display name, unique within the parent
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Id of the parent OU; `None` marks a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl OrganizationUnit {
    /// Whether this OU sits at the top of the hierarchy.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Listing form without the parent reference.
    #[must_use]
    pub fn to_basic(&self) -> OrganizationUnitBasic {
        OrganizationUnitBasic {
            id: self.id.clone(),
            handle: self.handle.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Compact OU representation used in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUnitBasic {
    /// Unique id
    pub id: String,
    /// Short URL-safe identifier
    pub handle: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}
