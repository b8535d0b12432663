//! Intent matching: which tool (if any) a message targets
//!
//! The orchestration layer only sees the `IntentMatcher` trait. The shipped
//! implementation is a substring trigger table; a learned classifier can be
//! dropped in behind the same trait.

mod matcher;
pub mod extract;

pub use matcher::{IntentMatcher, TriggerPhraseMatcher, TriggerRule};
