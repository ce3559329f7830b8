//! Candidate Aggregation
//!
//! Collapses raw detection issues into deduplicated, scored weak-knowledge
//! candidates keyed by a deterministic transform of the issue id.

use std::collections::HashMap;

use review_coach_core::{clamp_score, truncate_chars, MAX_REASON_CHARS};

use crate::models::{Issue, WeakKnowledgeCandidate};

/// Prefix turning an issue id into a knowledge identifier
pub const CANDIDATE_KEY_PREFIX: &str = "k_review_";

/// Separator between merged reason fragments (full-width semicolon)
pub const REASON_SEPARATOR: &str = "；";

/// Merge issues into candidates.
///
/// Issues sharing a derived knowledge identifier collapse into one candidate:
/// score is the clamped maximum of the group's severities, tags are the
/// deduplicated union in first-appearance order, and reasons are the
/// deduplicated fragments joined with a full-width semicolon, truncated to
/// [`MAX_REASON_CHARS`] characters. Candidates whose score ends up at zero
/// are dropped. Output order follows first appearance in the input.
pub fn aggregate(issues: &[Issue]) -> Vec<WeakKnowledgeCandidate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, WeakKnowledgeCandidate> = HashMap::new();
    let mut reasons: HashMap<String, Vec<String>> = HashMap::new();

    for issue in issues {
        let key = format!("{}{}", CANDIDATE_KEY_PREFIX, issue.id);

        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            WeakKnowledgeCandidate {
                id: key.clone(),
                name: issue.knowledge_name.clone(),
                tags: Vec::new(),
                reason: String::new(),
                weak_score: 0,
            }
        });

        entry.weak_score = entry.weak_score.max(clamp_score(issue.severity as i64));
        for tag in &issue.tags {
            if !entry.tags.contains(tag) {
                entry.tags.push(tag.clone());
            }
        }

        let fragments = reasons.entry(key).or_default();
        if !issue.reason.is_empty() && !fragments.contains(&issue.reason) {
            fragments.push(issue.reason.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let mut candidate = groups.remove(&key)?;
            if candidate.weak_score == 0 {
                return None;
            }
            let fragments = reasons.remove(&key).unwrap_or_default();
            candidate.reason =
                truncate_chars(&fragments.join(REASON_SEPARATOR), MAX_REASON_CHARS);
            Some(candidate)
        })
        .collect()
}
