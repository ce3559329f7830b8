//! Profile Sync Engine
//!
//! Merges a review round's weak-knowledge candidates into the remote profile
//! store. The engine reads the current profile once, then processes the
//! candidates strictly in input order, keeping an in-memory lookup in step
//! with its own writes so later candidates in the batch see consistent
//! state. Partial failure never aborts the batch; the aggregate
//! [`SyncOutcome`] is the only failure-reporting channel.
//!
//! Each candidate write is a small state machine:
//! {TryUpdate -> on not-found -> TryCreate -> Done} when the identifier may
//! already exist, or {TryCreate -> Done} when the fetched profile proves it
//! does not. Only an explicit not-found triggers the fallback; any other
//! failure is recorded per candidate.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use review_coach_core::{
    clamp_score, truncate_chars, AnalysisMode, ExecutionOutcome, WeakKnowledgePoint,
    MAX_REASON_CHARS,
};
use review_coach_rules::aggregator::REASON_SEPARATOR;
use review_coach_rules::WeakKnowledgeCandidate;

use crate::services::profile::idempotency::RoundCache;
use crate::services::profile::store::{ProfileStore, ReviewRecord, StoreError, WeakPointUpdate};

/// One review round's worth of sync input
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub user_id: String,
    pub mode: AnalysisMode,
    /// Round identifier scoping the idempotency guarantee; `None` disables it
    pub round_id: Option<String>,
    pub review_summary: String,
    pub run_result: Option<ExecutionOutcome>,
    pub candidates: Vec<WeakKnowledgeCandidate>,
}

/// Aggregate result of one sync call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub added: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

/// Sync engine over any [`ProfileStore`] implementation.
///
/// Owns its idempotency cache; two engines never share seen-keys.
pub struct ProfileSyncService<S> {
    store: S,
    cache: RoundCache,
}

impl<S: ProfileStore> ProfileSyncService<S> {
    pub fn new(store: S) -> Self {
        Self::with_cache(store, RoundCache::new())
    }

    /// Engine with an explicitly constructed cache (e.g. on a manual clock)
    pub fn with_cache(store: S, cache: RoundCache) -> Self {
        Self { store, cache }
    }

    /// Merge `request.candidates` into the user's remote profile.
    ///
    /// Returns an all-zero outcome without any I/O when the user id or the
    /// candidate list is empty (after validation). A caller-supplied
    /// cancellation token fails in-flight and subsequent calls with a
    /// per-candidate "cancelled" error; the loop itself still visits every
    /// candidate so counts and errors stay complete.
    pub async fn sync(
        &self,
        request: &SyncRequest,
        cancel: Option<&CancellationToken>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        if request.user_id.trim().is_empty() || request.candidates.is_empty() {
            return outcome;
        }

        let candidates: Vec<WeakKnowledgeCandidate> =
            request.candidates.iter().filter_map(normalize).collect();
        if candidates.is_empty() {
            return outcome;
        }

        // First idempotency pass, before any network traffic: a
        // fully-replayed round returns with only skips and no calls at all.
        // The loop below re-checks each key so a batch carrying the same
        // identifier twice writes only once.
        let mut pending: Vec<(WeakKnowledgeCandidate, Option<String>)> = Vec::new();
        for candidate in candidates {
            let idem_key = request
                .round_id
                .as_deref()
                .map(|round| RoundCache::key(&request.user_id, round, &candidate.id));
            match &idem_key {
                Some(key) if self.cache.seen(key) => {
                    debug!(candidate = %candidate.id, "already processed in this round, skipping");
                    outcome.skipped += 1;
                }
                _ => pending.push((candidate, idem_key)),
            }
        }
        if pending.is_empty() {
            return outcome;
        }

        let record = ReviewRecord::new(
            request.mode,
            request.round_id.as_deref(),
            &request.review_summary,
            request.run_result.as_ref(),
        );

        // A failed or absent profile read degrades to update-then-create per
        // candidate instead of aborting the round.
        let (mut known, lookup_complete) =
            match guard(cancel, self.store.fetch_profile(&request.user_id)).await {
                Ok(Some(points)) => {
                    let map: HashMap<String, WeakKnowledgePoint> = points
                        .into_iter()
                        .map(|point| (point.id.clone(), point))
                        .collect();
                    (map, true)
                }
                Ok(None) => {
                    debug!(user = %request.user_id, "no remote profile yet");
                    (HashMap::new(), false)
                }
                Err(e) => {
                    warn!(user = %request.user_id, error = %e, "profile fetch failed, degrading");
                    outcome.errors.push(format!("profile fetch: {}", e));
                    (HashMap::new(), false)
                }
            };

        for (candidate, idem_key) in pending {
            // An earlier duplicate in this batch may have marked the key
            if let Some(key) = &idem_key {
                if self.cache.seen(key) {
                    debug!(candidate = %candidate.id, "already processed in this round, skipping");
                    outcome.skipped += 1;
                    continue;
                }
            }

            let now = Utc::now();
            let (merged, try_update_first) = match known.get(&candidate.id) {
                Some(existing) => (merge_point(existing, &candidate, now), true),
                None => (point_from_candidate(&candidate, now), !lookup_complete),
            };

            let written = if try_update_first {
                let update = WeakPointUpdate {
                    weak_score: merged.weak_score,
                    weak_reason: merged.weak_reason.clone(),
                };
                match guard(
                    cancel,
                    self.store
                        .update_point(&request.user_id, &candidate.id, &update, &record),
                )
                .await
                {
                    Ok(()) => {
                        outcome.updated += 1;
                        Ok(())
                    }
                    Err(StoreError::NotFound) => {
                        debug!(candidate = %candidate.id, "no remote record, creating instead");
                        guard(
                            cancel,
                            self.store.create_point(&request.user_id, &merged, &record),
                        )
                        .await
                        .map(|()| outcome.added += 1)
                    }
                    Err(e) => Err(e),
                }
            } else {
                guard(
                    cancel,
                    self.store.create_point(&request.user_id, &merged, &record),
                )
                .await
                .map(|()| outcome.added += 1)
            };

            match written {
                Ok(()) => {
                    known.insert(merged.id.clone(), merged);
                    if let Some(key) = &idem_key {
                        self.cache.mark(key);
                    }
                }
                Err(e) => {
                    warn!(candidate = %candidate.id, error = %e, "weak point write failed");
                    outcome.errors.push(format!("{}: {}", candidate.id, e));
                }
            }
        }

        outcome
    }
}

/// Race a store call against the caller's abort signal.
async fn guard<T>(
    cancel: Option<&CancellationToken>,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(StoreError::Cancelled),
                result = call => result,
            }
        }
        None => call.await,
    }
}

/// Validate and clamp one candidate. Candidates without an identifier or
/// name, or whose clamped score is zero, are dropped silently: they are not
/// actionable and not worth an error entry.
fn normalize(candidate: &WeakKnowledgeCandidate) -> Option<WeakKnowledgeCandidate> {
    let id = candidate.id.trim();
    let name = candidate.name.trim();
    if id.is_empty() || name.is_empty() {
        return None;
    }
    let weak_score = clamp_score(candidate.weak_score as i64);
    if weak_score == 0 {
        return None;
    }
    Some(WeakKnowledgeCandidate {
        id: id.to_string(),
        name: name.to_string(),
        tags: candidate.tags.clone(),
        reason: truncate_chars(candidate.reason.trim(), MAX_REASON_CHARS),
        weak_score,
    })
}

/// First-sync record for a candidate with no remote counterpart.
pub fn point_from_candidate(
    candidate: &WeakKnowledgeCandidate,
    now: DateTime<Utc>,
) -> WeakKnowledgePoint {
    WeakKnowledgePoint {
        id: candidate.id.clone(),
        name: candidate.name.clone(),
        tags: candidate.tags.clone(),
        weak_score: clamp_score(candidate.weak_score as i64),
        weak_reason: truncate_chars(&candidate.reason, MAX_REASON_CHARS),
        first_detected_at: Some(now),
        last_reviewed_at: None,
        review_count: 0,
    }
}

/// Merge an incoming candidate into the existing remote record.
///
/// The identifier, first-detected timestamp and review-count stay with the
/// existing record; score takes the clamped maximum; tags and reason
/// fragments take the deduplicated union. The last-review timestamp is
/// always reset to null: a fresh weak signal invalidates the previous review
/// schedule and forces a re-review.
pub fn merge_point(
    existing: &WeakKnowledgePoint,
    incoming: &WeakKnowledgeCandidate,
    now: DateTime<Utc>,
) -> WeakKnowledgePoint {
    let name = if existing.name.trim().is_empty() {
        incoming.name.clone()
    } else {
        existing.name.clone()
    };

    let mut tags = existing.tags.clone();
    for tag in &incoming.tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }

    WeakKnowledgePoint {
        id: existing.id.clone(),
        name,
        tags,
        weak_score: clamp_score(existing.weak_score.max(incoming.weak_score) as i64),
        weak_reason: merge_reasons(&existing.weak_reason, &incoming.reason),
        first_detected_at: existing.first_detected_at.or(Some(now)),
        last_reviewed_at: None,
        review_count: existing.review_count,
    }
}

/// Union of both reasons' separator-split fragments, deduplicated by exact
/// text, rejoined and truncated on a character boundary.
fn merge_reasons(existing: &str, incoming: &str) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    for fragment in existing
        .split(REASON_SEPARATOR)
        .chain(incoming.split(REASON_SEPARATOR))
    {
        let fragment = fragment.trim();
        if !fragment.is_empty() && !fragments.contains(&fragment) {
            fragments.push(fragment);
        }
    }
    truncate_chars(&fragments.join(REASON_SEPARATOR), MAX_REASON_CHARS)
}
