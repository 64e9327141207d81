//! HTTP JSON API.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use router::triage_api_router;
pub use types::ApiContext;
