//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`; callers own transaction
//! and locking decisions.

mod alerts;
mod assessments;
mod validation;

pub use alerts::*;
pub use assessments::*;
pub use validation::*;
