//! Profile Store Abstraction
//!
//! The seam between the sync engine and the remote profile service. The
//! engine is written against `ProfileStore`, so tests can drive it with an
//! in-memory fake and the fallback path can be exercised without a network.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use review_coach_core::{AnalysisMode, ExecutionOutcome, WeakKnowledgePoint};

/// Transport-level failures talking to the profile store.
///
/// `NotFound` is special-cased by the sync engine: a PUT that hits a missing
/// record triggers the create fallback instead of being recorded as an error.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed resource does not exist (HTTP 404)
    #[error("resource not found")]
    NotFound,

    /// Non-2xx response other than 404
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS or timeout failure before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The caller's abort signal fired while the call was in flight
    #[error("cancelled")]
    Cancelled,
}

/// Structured review metadata attached to every profile write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Always "review" for writes originating here
    pub source: String,
    pub mode: AnalysisMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
    pub review_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ReviewRecord {
    /// Build the record for one review round
    pub fn new(
        mode: AnalysisMode,
        round_id: Option<&str>,
        review_summary: &str,
        run_result: Option<&ExecutionOutcome>,
    ) -> Self {
        Self {
            source: "review".to_string(),
            mode,
            round_id: round_id.map(str::to_string),
            review_summary: review_summary.to_string(),
            run_success: run_result.map(|r| r.success),
            error_type: run_result.and_then(|r| r.error_type.clone()),
        }
    }
}

/// Fields carried by an update call. The merged point holds the full state;
/// the remote update endpoint only accepts score and reason plus the review
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeakPointUpdate {
    pub weak_score: u8,
    pub weak_reason: String,
}

/// Client-side protocol against the remote profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the user's current weak-knowledge list.
    ///
    /// `Ok(None)` means the service answered "no profile yet" (404), which is
    /// not an error: the engine just cannot precompute which identifiers
    /// exist and falls back to update-then-create per candidate.
    async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<WeakKnowledgePoint>>, StoreError>;

    /// Create a weak point in the user's profile.
    async fn create_point(
        &self,
        user_id: &str,
        point: &WeakKnowledgePoint,
        record: &ReviewRecord,
    ) -> Result<(), StoreError>;

    /// Update an existing weak point. Returns `StoreError::NotFound` when the
    /// identifier does not exist for this user.
    async fn update_point(
        &self,
        user_id: &str,
        knowledge_id: &str,
        update: &WeakPointUpdate,
        record: &ReviewRecord,
    ) -> Result<(), StoreError>;
}

// A shared store works wherever an owned one does; the engine takes the
// store by value, so callers keeping a handle hand it an `Arc`.
#[async_trait]
impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<WeakKnowledgePoint>>, StoreError> {
        (**self).fetch_profile(user_id).await
    }

    async fn create_point(
        &self,
        user_id: &str,
        point: &WeakKnowledgePoint,
        record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        (**self).create_point(user_id, point, record).await
    }

    async fn update_point(
        &self,
        user_id: &str,
        knowledge_id: &str,
        update: &WeakPointUpdate,
        record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        (**self).update_point(user_id, knowledge_id, update, record).await
    }
}
