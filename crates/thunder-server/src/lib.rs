//! Thunder server: services, admin HTTP surface, and start-up wiring.
//!
//! The layering mirrors the store stack underneath: handlers extract and
//! translate, services validate and classify, stores read and write. Store
//! wiring (mutable, immutable, or composite per resource kind) happens once
//! in [`bootstrap`]; nothing downstream inspects the mode again.

pub mod bootstrap;
pub mod config;
pub mod context;
pub mod handlers;
pub mod pagination;
pub mod security;
pub mod service;

pub use bootstrap::{build_router, AppState, StartupError};
pub use config::ServerConfig;
pub use context::RequestContext;
