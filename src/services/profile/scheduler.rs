//! Spaced-Repetition Scheduling
//!
//! Computes when a stored weak point should resurface for review. The
//! interval ladder is cyclic: a heavily-reviewed point wraps back to the
//! short intervals instead of settling on the longest one.

use chrono::{DateTime, Duration, Utc};

use review_coach_core::WeakKnowledgePoint;

/// Review interval ladder in days
pub const REVIEW_LADDER_DAYS: [f64; 7] = [0.5, 1.0, 2.0, 4.0, 7.0, 15.0, 30.0];

/// When a weak point is next due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSchedule {
    pub next_due_at: DateTime<Utc>,
    pub is_due: bool,
}

/// Schedule against the current wall-clock time
pub fn next_review(point: &WeakKnowledgePoint) -> ReviewSchedule {
    next_review_at(point, Utc::now())
}

/// Schedule against an explicit `now`. Pure; callable repeatedly without
/// changing state.
pub fn next_review_at(point: &WeakKnowledgePoint, now: DateTime<Utc>) -> ReviewSchedule {
    let rung = point.review_count as usize % REVIEW_LADDER_DAYS.len();
    let base = point
        .last_reviewed_at
        .or(point.first_detected_at)
        .unwrap_or(now);

    let interval_minutes = (REVIEW_LADDER_DAYS[rung] * 24.0 * 60.0) as i64;
    let next_due_at = base + Duration::minutes(interval_minutes);

    ReviewSchedule {
        next_due_at,
        is_due: now >= next_due_at,
    }
}
