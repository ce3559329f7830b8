//! Detection Models
//!
//! Data structures produced by the issue detector and the candidate
//! aggregator.

use serde::{Deserialize, Serialize};

/// A single detection result. Created only by the detector rules and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Fixed identifier of the rule that produced this issue,
    /// e.g. "syntax_stdio_header"
    pub id: String,
    /// Severity in [1, 10], a fixed constant per rule
    pub severity: u8,
    /// Display name of the associated knowledge point
    pub knowledge_name: String,
    /// Category tags of the knowledge point
    pub tags: Vec<String>,
    /// Human-readable reason the rule triggered
    pub reason: String,
    /// Suggested fix
    pub suggestion: String,
    /// Guiding question for the learner
    pub question: String,
}

impl Issue {
    /// Create a new issue with empty texts
    pub fn new(
        id: impl Into<String>,
        severity: u8,
        knowledge_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            knowledge_name: knowledge_name.into(),
            tags: Vec::new(),
            reason: String::new(),
            suggestion: String::new(),
            question: String::new(),
        }
    }

    /// Set category tags
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set the reason text
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Set the suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Set the guiding question
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }
}

/// An ephemeral, per-round proposal to create or update a weak knowledge
/// point. Produced by the aggregator, consumed by the sync engine, never
/// persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeakKnowledgeCandidate {
    /// Knowledge identifier derived from the issue id,
    /// e.g. "k_review_syntax_stdio_header"
    pub id: String,
    /// Display name of the knowledge point
    pub name: String,
    /// Category tags, deduplicated, first-appearance order
    pub tags: Vec<String>,
    /// Merged reason text
    pub reason: String,
    /// Weakness score in [0, 10]
    pub weak_score: u8,
}
