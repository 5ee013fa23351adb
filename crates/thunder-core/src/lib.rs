//! Foundation types for the Thunder identity provider.
//!
//! This crate holds the pieces every other Thunder crate builds on:
//!
//! - [`resource`]: composite resource keys and the tagged entity payload that
//!   the generic resource store is polymorphic over
//! - [`models`]: the organization-unit, application, and token domain records
//! - [`error`]: the classified service-error taxonomy (client vs server
//!   faults, stable machine codes) that the HTTP layer translates to wire
//!   responses
//!
//! Nothing here performs I/O; the crate is deliberately free of async and
//! network dependencies so that stores, validators, and services can share it
//! without dragging a runtime along.

pub mod error;
pub mod models;
pub mod resource;

pub use error::{ErrorKind, ServiceError};
pub use resource::{Entity, EntityPayload, ResourceKey, ResourceKind};
