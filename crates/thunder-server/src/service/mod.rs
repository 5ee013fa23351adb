//! Service layer: request validation, invariant checks, classification.
//!
//! Services sit between the handlers and the stores. They validate input,
//! enforce the invariants the stores cannot see (parent existence, cycle
//! freedom, cross-backend uniqueness, immutability), and classify raw store
//! errors into the wire-facing taxonomy.

mod application;
mod ou;

pub use application::{ApplicationService, ApplicationRequest, InboundAuthConfigRequest};
pub use ou::{
    CreateOrganizationUnitRequest, OrganizationUnitService, UpdateOrganizationUnitRequest,
};

/// A page of items together with the collection total.
///
/// Totals and pages come from separate store reads; under write concurrency
/// they may diverge, which the admin surface tolerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult<T> {
    /// Collection size at count time
    pub total: usize,
    /// The requested page
    pub items: Vec<T>,
}
