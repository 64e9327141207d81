//! Clinical safety net.
//!
//! Three layers that never gate the conversation: red-flag keyword
//! scanning over the raw patient message, post-assessment validation
//! rules, and a review workflow that queues high-stakes assessments
//! for a clinician.

pub mod keywords;
pub mod validator;
pub mod workflow;

pub use keywords::{scan_red_flags, RedFlagCategory, RedFlagPattern};
pub use validator::{validate_assessment, FlagSeverity, SafetyFlag};
pub use workflow::{
    CaseStatus, ReviewOutcome, ValidationCase, ValidationStats, ValidationWorkflow,
};
