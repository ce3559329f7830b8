//! Test Support
//!
//! An in-memory [`ProfileStore`] fake with call counters, so tests can
//! assert not just outcomes but also how many network calls the engine
//! issued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use review_coach::{ProfileStore, ReviewRecord, StoreError, WeakPointUpdate};
use review_coach_core::WeakKnowledgePoint;

/// Single-user in-memory profile store.
#[derive(Default)]
pub struct FakeProfileStore {
    points: Mutex<HashMap<String, WeakKnowledgePoint>>,
    /// When set, `fetch_profile` answers "no profile yet" (the 404 case)
    pub profile_missing: AtomicBool,
    /// When set, `fetch_profile` fails with a transport error
    pub fail_fetch: AtomicBool,
    /// When non-zero, `update_point` fails with this HTTP status
    pub fail_update_status: AtomicU16,
    pub fetch_calls: AtomicU32,
    pub create_calls: AtomicU32,
    pub update_calls: AtomicU32,
}

impl FakeProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a pre-existing weak point and an existing profile document
    pub fn with_point(point: WeakKnowledgePoint) -> Self {
        let store = Self::new();
        store
            .points
            .lock()
            .unwrap()
            .insert(point.id.clone(), point);
        store
    }

    pub fn point(&self, knowledge_id: &str) -> Option<WeakKnowledgePoint> {
        self.points.lock().unwrap().get(knowledge_id).cloned()
    }

    pub fn total_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn fetch_profile(
        &self,
        _user_id: &str,
    ) -> Result<Option<Vec<WeakKnowledgePoint>>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        if self.profile_missing.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.points.lock().unwrap().values().cloned().collect()))
    }

    async fn create_point(
        &self,
        _user_id: &str,
        point: &WeakKnowledgePoint,
        _record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.points
            .lock()
            .unwrap()
            .insert(point.id.clone(), point.clone());
        // The profile document exists once anything was written
        self.profile_missing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn update_point(
        &self,
        _user_id: &str,
        knowledge_id: &str,
        update: &WeakPointUpdate,
        _record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let status = self.fail_update_status.load(Ordering::SeqCst);
        if status != 0 {
            return Err(StoreError::Http {
                status,
                body: "injected failure".to_string(),
            });
        }

        let mut points = self.points.lock().unwrap();
        match points.get_mut(knowledge_id) {
            Some(point) => {
                point.weak_score = update.weak_score;
                point.weak_reason = update.weak_reason.clone();
                point.last_reviewed_at = None;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
