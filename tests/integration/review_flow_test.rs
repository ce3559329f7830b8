//! Review Flow Tests
//!
//! End-to-end: a submission goes through detection, the report's candidates
//! feed the sync engine, and the stored weak point gets a review schedule.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use review_coach::{next_review_at, ProfileSyncService, SyncRequest};
use review_coach_core::{AnalysisMode, ExecutionOutcome};
use review_coach_rules::ReviewReport;

use crate::support::FakeProfileStore;

fn sync_request(
    mode: AnalysisMode,
    run_result: Option<ExecutionOutcome>,
    report: &ReviewReport,
) -> SyncRequest {
    SyncRequest {
        user_id: "student-42".to_string(),
        mode,
        round_id: Some("round-1".to_string()),
        review_summary: format!("{} review of submission 7", mode),
        run_result,
        candidates: report.candidates(),
    }
}

#[tokio::test]
async fn test_missing_stdio_header_flows_into_profile_and_schedule() {
    let code = "int main(){printf(\"hi\");return 0;}";
    let report = ReviewReport::review(code, AnalysisMode::Syntax, None);
    assert!(!report.is_positive());

    let candidates = report.candidates();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "k_review_syntax_stdio_header");
    assert_eq!(candidates[0].weak_score, 6);

    let store = Arc::new(FakeProfileStore::new());
    store.profile_missing.store(true, Ordering::SeqCst);
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&sync_request(AnalysisMode::Syntax, None, &report), None)
        .await;
    assert_eq!(outcome.added, 1);
    assert!(outcome.errors.is_empty());

    let stored = store.point("k_review_syntax_stdio_header").unwrap();
    assert_eq!(stored.name, "Standard I/O headers");
    assert_eq!(stored.weak_score, 6);
    assert_eq!(stored.review_count, 0);

    // An unreviewed point comes due half a day after first detection
    let detected_at = stored.first_detected_at.unwrap();
    let schedule = next_review_at(&stored, detected_at);
    assert_eq!(schedule.next_due_at, detected_at + chrono::Duration::hours(12));
    assert!(!schedule.is_due);
}

#[tokio::test]
async fn test_clean_submission_produces_no_sync_traffic() {
    let code = "#include <stdio.h>\nint main(){printf(\"hi\");return 0;}";
    let run = ExecutionOutcome::ok();
    let report = ReviewReport::review(code, AnalysisMode::Syntax, Some(&run));
    assert!(report.is_positive());

    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&sync_request(AnalysisMode::Syntax, Some(run), &report), None)
        .await;
    assert_eq!(outcome, Default::default());
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_segfault_run_is_stored_as_pointer_safety() {
    let run = ExecutionOutcome::failed("运行时错误", "Segmentation fault (core dumped)");
    let report = ReviewReport::review("int main(){return 0;}", AnalysisMode::Logic, Some(&run));

    let candidates = report.candidates();
    assert_eq!(candidates[0].id, "k_review_logic_pointer_safety");
    assert_eq!(candidates[0].weak_score, 9);

    let store = Arc::new(FakeProfileStore::new());
    let service = ProfileSyncService::new(store.clone());

    let outcome = service
        .sync(&sync_request(AnalysisMode::Logic, Some(run), &report), None)
        .await;
    assert_eq!(outcome.added, 1);

    let stored = store.point("k_review_logic_pointer_safety").unwrap();
    assert_eq!(stored.weak_score, 9);
    assert!(stored.weak_reason.contains("memory access violation"));
}
