//! Dual-backed resource stores for Thunder.
//!
//! Resources come from two places: YAML files declared under the Thunder home
//! directory, loaded once at start-up and immutable afterwards, and a mutable
//! backend that the admin surface writes through. This crate provides the
//! whole chain:
//!
//! - [`resource_store`]: the generic, kind-partitioned in-memory store the
//!   YAML loader populates (read-only after load)
//! - [`loader`]: the directory walker that parses, validates, and inserts
//!   declared resources, failing start-up on any malformed file
//! - [`contract`]: the polymorphic store contracts every backend satisfies
//! - [`ou`] / [`app`]: typed file-backed stores over the generic store
//! - [`memory`]: an in-memory implementation of the mutable contract (the
//!   production SQL backend is an external collaborator with the same
//!   contract)
//! - [`composite`]: the layered store that reads from both backends and
//!   writes only to the mutable one
//!
//! ## Store modes
//!
//! A deployment picks one of three wirings per resource kind at start-up:
//! mutable only, immutable only, or composite. The wiring is constructed
//! once; nothing downstream inspects the mode again.

pub mod app;
pub mod composite;
pub mod contract;
pub mod error;
pub mod loader;
pub mod memory;
pub mod ou;
mod page;
pub mod resource_store;

pub use composite::{CompositeApplicationStore, CompositeOrganizationUnitStore, StoreMode};
pub use contract::{ApplicationStore, ExistenceChecker, OrganizationUnitStore};
pub use error::StoreError;
pub use loader::{LoaderError, ResourceConfig, ResourceLoader};
pub use resource_store::ResourceStore;
