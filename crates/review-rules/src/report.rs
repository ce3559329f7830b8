//! Review Report
//!
//! Wraps a detection run's outcome. A review either carries issues or, when
//! every rule stayed silent, a single positive result with an exploratory
//! question. The positive path never produces sync candidates.

use serde::{Deserialize, Serialize};

use review_coach_core::{AnalysisMode, ExecutionOutcome};

use crate::aggregator::aggregate;
use crate::detector::detect;
use crate::models::{Issue, WeakKnowledgeCandidate};

/// Encouraging feedback for a clean review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositiveFeedback {
    pub summary: String,
    pub question: String,
}

impl PositiveFeedback {
    /// The standard "no problems found" feedback for a mode
    pub fn no_issues(mode: AnalysisMode) -> Self {
        Self {
            summary: format!("No problems found in this {} review. Well done!", mode),
            question: "If you had to make this solution clearer or faster, where would you start?"
                .to_string(),
        }
    }
}

/// Outcome of reviewing one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReviewReport {
    /// One or more rules triggered
    Issues(Vec<Issue>),
    /// Every rule stayed silent
    Positive(PositiveFeedback),
}

impl ReviewReport {
    /// Wrap a detection result, synthesizing positive feedback when empty
    pub fn from_issues(mode: AnalysisMode, issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            ReviewReport::Positive(PositiveFeedback::no_issues(mode))
        } else {
            ReviewReport::Issues(issues)
        }
    }

    /// Detect and wrap in one step
    pub fn review(
        code: &str,
        mode: AnalysisMode,
        run_result: Option<&ExecutionOutcome>,
    ) -> Self {
        Self::from_issues(mode, detect(code, mode, run_result))
    }

    /// Sync candidates for this review. Positive reviews have none.
    pub fn candidates(&self) -> Vec<WeakKnowledgeCandidate> {
        match self {
            ReviewReport::Issues(issues) => aggregate(issues),
            ReviewReport::Positive(_) => Vec::new(),
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, ReviewReport::Positive(_))
    }
}
