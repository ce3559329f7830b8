//! Review Coach Core
//!
//! Foundational error types and shared data models for the Review Coach
//! workspace. This crate has zero dependencies on application-level code
//! (HTTP client, async runtime, detection rules).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `models` - Shared data models (`AnalysisMode`, `ExecutionOutcome`,
//!   `WeakKnowledgePoint`) and the score/reason helpers used by both the
//!   rules crate and the sync engine
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror/chrono** - keeps build times minimal
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod models;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Shared Models ──────────────────────────────────────────────────────
pub use models::{
    clamp_score, truncate_chars, AnalysisMode, ExecutionOutcome, WeakKnowledgePoint,
    MAX_REASON_CHARS,
};
