//! HTTP endpoint handlers.

pub mod consult;
pub mod dashboard;
pub mod health;
