//! Service Layer
//!
//! Remote-facing services of the Review Coach core.

pub mod profile;
