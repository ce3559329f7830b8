//! Review Coach
//!
//! Core library of the Review Coach learning assistant: tracks a learner's
//! weak knowledge points derived from code-review heuristics, merges them
//! idempotently into a durable per-user profile on the remote profile
//! service, and schedules when each weak point should resurface for review.
//!
//! The detection rules and candidate aggregation live in the
//! `review-coach-rules` crate; shared models and error types live in
//! `review-coach-core`. This crate adds the remote-facing pieces:
//!
//! - `config` - Environment-driven profile service configuration
//! - `services::profile` - Profile sync engine, HTTP store client,
//!   round-scoped idempotency cache, and the spaced-repetition scheduler
//!
//! Presentation surfaces (chat UI, dashboards) consume this library; nothing
//! here renders anything.

pub mod config;
pub mod services;

// ── Configuration ──────────────────────────────────────────────────────
pub use config::ProfileApiConfig;

// ── Profile Sync ───────────────────────────────────────────────────────
pub use services::profile::{
    merge_point, next_review, next_review_at, point_from_candidate, Clock, HttpProfileStore,
    ProfileStore, ProfileSyncService, ReviewRecord, ReviewSchedule, RoundCache, StoreError,
    SyncOutcome, SyncRequest, SystemClock, WeakPointUpdate, REVIEW_LADDER_DAYS,
};
