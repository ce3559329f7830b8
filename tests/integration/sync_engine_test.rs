//! Sync Engine Tests
//!
//! Exercises [`ProfileSyncService`] against the in-memory fake store:
//! create/update routing, round-scoped replay, the not-found fallback,
//! degraded reads, hard write failures and cancellation.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use review_coach::{ProfileSyncService, SyncRequest};
use review_coach_core::{AnalysisMode, WeakKnowledgePoint};
use review_coach_rules::WeakKnowledgeCandidate;

use crate::support::FakeProfileStore;

fn candidate(id: &str, score: u8) -> WeakKnowledgeCandidate {
    WeakKnowledgeCandidate {
        id: id.to_string(),
        name: "Pointer and memory safety".to_string(),
        tags: vec!["pointers".to_string()],
        reason: "The run crashed with a memory access violation".to_string(),
        weak_score: score,
    }
}

fn request(round_id: &str, candidates: Vec<WeakKnowledgeCandidate>) -> SyncRequest {
    SyncRequest {
        user_id: "student-42".to_string(),
        mode: AnalysisMode::Logic,
        round_id: Some(round_id.to_string()),
        review_summary: "logic review of submission 7".to_string(),
        run_result: None,
        candidates,
    }
}

fn existing_point(id: &str) -> WeakKnowledgePoint {
    WeakKnowledgePoint {
        id: id.to_string(),
        name: "Pointer and memory safety".to_string(),
        tags: vec!["pointers".to_string()],
        weak_score: 5,
        weak_reason: "an earlier crash".to_string(),
        first_detected_at: Some("2026-01-01T00:00:00Z".parse().unwrap()),
        last_reviewed_at: Some("2026-01-05T00:00:00Z".parse().unwrap()),
        review_count: 2,
    }
}

#[tokio::test]
async fn test_new_candidate_is_created_against_known_profile() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&request("round-1", vec![candidate("k_review_logic_null_deref", 8)]), None)
        .await;

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.skipped, 0);
    assert!(outcome.errors.is_empty());
    // The fetched profile proved the id absent, so no update was attempted
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

    let stored = store.point("k_review_logic_null_deref").unwrap();
    assert_eq!(stored.weak_score, 8);
    assert!(stored.first_detected_at.is_some());
    assert_eq!(stored.review_count, 0);
}

#[tokio::test]
async fn test_existing_point_is_merged_and_updated() {
    let store = Arc::new(FakeProfileStore::with_point(existing_point(
        "k_review_logic_pointer_safety",
    )));
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&request("round-1", vec![candidate("k_review_logic_pointer_safety", 9)]), None)
        .await;

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.updated, 1);
    assert!(outcome.errors.is_empty());
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);

    let stored = store.point("k_review_logic_pointer_safety").unwrap();
    assert_eq!(stored.weak_score, 9);
    assert!(stored.last_reviewed_at.is_none());
}

#[tokio::test]
async fn test_replayed_round_skips_without_network_calls() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());
    let req = request(
        "round-7",
        vec![
            candidate("k_review_logic_pointer_safety", 9),
            candidate("k_review_logic_timeout", 8),
        ],
    );

    let first = service.sync(&req, None).await;
    assert_eq!(first.added, 2);
    let calls_after_first = store.total_calls();

    let second = service.sync(&req, None).await;
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 2);
    assert!(second.errors.is_empty());
    // Full replay short-circuits before the profile fetch
    assert_eq!(store.total_calls(), calls_after_first);
}

#[tokio::test]
async fn test_duplicate_ids_in_one_round_write_once() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(
            &request(
                "round-1",
                vec![
                    candidate("k_review_logic_pointer_safety", 9),
                    candidate("k_review_logic_pointer_safety", 9),
                ],
            ),
            None,
        )
        .await;

    // The first occurrence is written and marked; the second is skipped
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.skipped, 1);
    assert!(outcome.errors.is_empty());
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_new_round_processes_the_same_candidates_again() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());
    let ids = vec![candidate("k_review_logic_pointer_safety", 9)];

    let first = service.sync(&request("round-1", ids.clone()), None).await;
    assert_eq!(first.added, 1);

    let second = service.sync(&request("round-2", ids), None).await;
    assert_eq!(second.skipped, 0);
    assert_eq!(second.updated, 1);
}

#[tokio::test]
async fn test_missing_profile_falls_back_from_update_to_create() {
    let store = Arc::new(FakeProfileStore::new());
    store.profile_missing.store(true, Ordering::SeqCst);
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&request("round-1", vec![candidate("k_review_logic_timeout", 8)]), None)
        .await;

    // "No profile yet" is not an error: the engine tries the update, takes
    // the not-found fallback and creates the record.
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.updated, 0);
    assert!(outcome.errors.is_empty());
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    assert!(store.point("k_review_logic_timeout").is_some());
}

#[tokio::test]
async fn test_fetch_failure_degrades_but_still_writes() {
    let store = Arc::new(FakeProfileStore::new());
    store.fail_fetch.store(true, Ordering::SeqCst);
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&request("round-1", vec![candidate("k_review_logic_timeout", 8)]), None)
        .await;

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("profile fetch:"));
}

#[tokio::test]
async fn test_update_hard_failure_is_recorded_without_create_fallback() {
    let store = Arc::new(FakeProfileStore::with_point(existing_point(
        "k_review_logic_pointer_safety",
    )));
    store.fail_update_status.store(500, Ordering::SeqCst);
    let service = ProfileSyncService::new(store.clone());
    let req = request("round-1", vec![candidate("k_review_logic_pointer_safety", 9)]);

    let outcome = service.sync(&req, None).await;

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("k_review_logic_pointer_safety"));
    assert!(outcome.errors[0].contains("HTTP 500"));
    // Only not-found triggers the create fallback
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);

    // The failed candidate was never marked processed, so the same round
    // retries it instead of skipping.
    store.fail_update_status.store(0, Ordering::SeqCst);
    let retry = service.sync(&req, None).await;
    assert_eq!(retry.skipped, 0);
    assert_eq!(retry.updated, 1);
}

#[tokio::test]
async fn test_empty_inputs_are_no_ops() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());

    let no_user = SyncRequest {
        user_id: "   ".to_string(),
        ..request("round-1", vec![candidate("k_review_logic_timeout", 8)])
    };
    let outcome = service.sync(&no_user, None).await;
    assert_eq!(outcome, Default::default());

    let no_candidates = request("round-1", vec![]);
    let outcome = service.sync(&no_candidates, None).await;
    assert_eq!(outcome, Default::default());

    // Candidates that normalize away leave nothing to do either
    let all_dropped = request("round-1", vec![candidate("k_review_logic_timeout", 0)]);
    let outcome = service.sync(&all_dropped, None).await;
    assert_eq!(outcome, Default::default());

    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_cancellation_fails_candidates_without_writing() {
    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = service
        .sync(
            &request(
                "round-1",
                vec![
                    candidate("k_review_logic_pointer_safety", 9),
                    candidate("k_review_logic_timeout", 8),
                ],
            ),
            Some(&cancel),
        )
        .await;

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.updated, 0);
    // One error for the fetch plus one per candidate
    assert_eq!(outcome.errors.len(), 3);
    assert!(outcome.errors.iter().all(|e| e.contains("cancelled")));
    assert_eq!(store.total_calls(), 0);
}
