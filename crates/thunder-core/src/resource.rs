//! Composite resource keys and tagged entity payloads.
//!
//! Every declared or stored resource is addressed by a [`ResourceKey`]: a
//! `(kind, id)` pair compared by exact equality with no normalization. The
//! serialized form is `<kind>:<id>` and is what shows up in logs and error
//! messages.
//!
//! The generic resource store is polymorphic over [`EntityPayload`], a closed
//! sum of the domain records. Type checking happens at read time: a payload
//! whose variant does not match the requested kind is data corruption, not a
//! recoverable condition, and the typed stores surface it as such.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Application, OrganizationUnit};

/// Closed enumeration of resource kinds the stores can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Organization unit (`ou`)
    OrganizationUnit,
    /// OAuth/OIDC application
    Application,
    /// Authentication flow definition
    Flow,
}

impl ResourceKind {
    /// Stable string form used in serialized keys and directory wiring.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrganizationUnit => "ou",
            Self::Application => "application",
            Self::Flow => "flow",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ou" => Ok(Self::OrganizationUnit),
            "application" => Ok(Self::Application),
            "flow" => Ok(Self::Flow),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key addressing one resource: `(kind, id)`.
///
/// Keys are compared by exact equality; ids are opaque UTF-8 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Resource kind partition the id lives in
    pub kind: ResourceKind,
    /// Resource id, unique within its kind
    pub id: String,
}

impl ResourceKey {
    /// Build a key from a kind and id.
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Parse the serialized `<kind>:<id>` form. Ids may themselves contain
    /// colons; only the first separator splits.
    #[must_use]
    pub fn parse(serialized: &str) -> Option<Self> {
        let (kind, id) = serialized.split_once(':')?;
        if id.is_empty() {
            return None;
        }
        kind.parse().ok().map(|kind| Self::new(kind, id))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Tagged payload carried by an [`Entity`].
///
/// The store never inspects payload contents; typed stores match on the
/// variant and treat a mismatch as corruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityPayload {
    /// An organization unit record
    OrganizationUnit(OrganizationUnit),
    /// An application record (processed form, secrets hashed)
    Application(Application),
}

impl EntityPayload {
    /// The kind this payload belongs under.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::OrganizationUnit(_) => ResourceKind::OrganizationUnit,
            Self::Application(_) => ResourceKind::Application,
        }
    }

    /// Borrow the payload as an organization unit, if it is one.
    #[must_use]
    pub const fn as_organization_unit(&self) -> Option<&OrganizationUnit> {
        match self {
            Self::OrganizationUnit(ou) => Some(ou),
            Self::Application(_) => None,
        }
    }

    /// Borrow the payload as an application, if it is one.
    #[must_use]
    pub const fn as_application(&self) -> Option<&Application> {
        match self {
            Self::Application(app) => Some(app),
            Self::OrganizationUnit(_) => None,
        }
    }
}

/// A keyed entity: composite key plus tagged payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Composite key addressing this entity
    pub key: ResourceKey,
    /// Tagged domain payload
    pub payload: EntityPayload,
}

impl Entity {
    /// Build an entity, deriving the key kind from the payload.
    pub fn new(id: impl Into<String>, payload: EntityPayload) -> Self {
        Self {
            key: ResourceKey::new(payload.kind(), id),
            payload,
        }
    }
}
