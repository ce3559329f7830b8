//! Review Coach Rules
//!
//! Issue detection and candidate aggregation for learner code reviews. This
//! crate is pure: no I/O, no clock, deterministic for identical inputs.
//!
//! - `models` - Detection data types (Issue, WeakKnowledgeCandidate)
//! - `detector` - Ordered, per-mode rule registry over source text and an
//!   optional execution outcome
//! - `aggregator` - Collapses raw issues into deduplicated, scored
//!   weak-knowledge candidates
//! - `report` - Review outcome wrapper, including the positive
//!   "no problems found" path that produces no candidates
//!
//! The profile sync engine (main crate) consumes the candidates this crate
//! produces; nothing here talks to the remote profile store.

pub mod aggregator;
pub mod detector;
pub mod models;
pub mod report;

// Re-export model types
pub use models::{Issue, WeakKnowledgeCandidate};

// Re-export detection entry points
pub use detector::{detect, RuleContext};

// Re-export aggregation
pub use aggregator::{aggregate, CANDIDATE_KEY_PREFIX};

// Re-export report types
pub use report::{PositiveFeedback, ReviewReport};
