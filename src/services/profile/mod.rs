//! Profile Synchronization
//!
//! Everything between a finished review round and the remote profile store:
//!
//! - `store` - The `ProfileStore` trait and its transport error taxonomy
//! - `client` - `HttpProfileStore`, the reqwest implementation against the
//!   profile service's GET/POST/PUT endpoints
//! - `sync` - `ProfileSyncService`, the merge-on-read engine with per-round
//!   idempotency and a per-candidate update-then-create fallback
//! - `idempotency` - `RoundCache`, the bounded time-aware seen/mark cache
//! - `scheduler` - Spaced-repetition due-date computation

pub mod client;
pub mod idempotency;
pub mod scheduler;
pub mod store;
pub mod sync;

pub use client::HttpProfileStore;
pub use idempotency::{Clock, RoundCache, SystemClock};
pub use scheduler::{next_review, next_review_at, ReviewSchedule, REVIEW_LADDER_DAYS};
pub use store::{ProfileStore, ReviewRecord, StoreError, WeakPointUpdate};
pub use sync::{merge_point, point_from_candidate, ProfileSyncService, SyncOutcome, SyncRequest};
