//! Shared Data Models
//!
//! Data structures that cross the boundary between the detection rules crate
//! and the profile sync engine: analysis modes, execution outcomes from the
//! code-execution service, and the durable weak-knowledge record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a stored weak-knowledge reason, in characters.
///
/// Reasons merged from several detections are truncated to this many
/// characters, always on a character boundary.
pub const MAX_REASON_CHARS: usize = 280;

/// Analysis modes a learner can submit code under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Compilability, entry point, headers, balanced delimiters
    Syntax,
    /// Readability: line length, indentation, naming, comments
    Style,
    /// Runtime failures and suspicious control/memory patterns
    Logic,
}

impl AnalysisMode {
    /// Wire name of this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Syntax => "syntax",
            AnalysisMode::Style => "style",
            AnalysisMode::Logic => "logic",
        }
    }
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of running the learner's submission, as reported by the
/// code-execution service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Whether the run (compile + execute) succeeded
    pub success: bool,
    /// Coarse failure category, e.g. "编译错误" or "运行时错误"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Short human-readable failure summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
    /// Raw error output from the compiler or runtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// A successful run
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// A failed run with a category and raw error text
    pub fn failed(error_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error_type: Some(error_type.into()),
            error_summary: None,
            error: Some(error.into()),
        }
    }

    /// Best available failure text, preferring the summary over raw output.
    pub fn failure_text(&self) -> Option<&str> {
        self.error_summary
            .as_deref()
            .or(self.error.as_deref())
            .or(self.error_type.as_deref())
    }
}

/// Durable weak-knowledge record, owned by the remote profile store.
///
/// The sync engine only proposes merges against this record; the
/// review-completion workflow (outside this workspace) is the only writer of
/// `last_reviewed_at` and `review_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeakKnowledgePoint {
    /// Knowledge identifier, e.g. "k_review_syntax_stdio_header"
    pub id: String,
    /// Display name of the knowledge point
    pub name: String,
    /// Category tags, order-insensitive, deduplicated
    #[serde(default)]
    pub tags: Vec<String>,
    /// Weakness score in [0, 10]
    pub weak_score: u8,
    /// Merged reason text, at most [`MAX_REASON_CHARS`] characters
    #[serde(default)]
    pub weak_reason: String,
    /// When the weakness was first detected
    #[serde(default)]
    pub first_detected_at: Option<DateTime<Utc>>,
    /// When the learner last completed a review of this point
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Number of completed reviews
    #[serde(default)]
    pub review_count: u32,
}

/// Clamp a raw score into the storable [0, 10] range.
///
/// Idempotent: clamping twice equals clamping once.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 10) as u8
}

/// Truncate a string to at most `max` characters, never splitting a
/// character. Returns the input unchanged when it already fits.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
