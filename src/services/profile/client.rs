//! HTTP Profile Store
//!
//! reqwest implementation of [`ProfileStore`] against the remote profile
//! service. The service wraps its JSON payloads in strings
//! (`profile_json_str` / `profile_update_str`), so both write calls encode a
//! nested document before sending.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use review_coach_core::WeakKnowledgePoint;

use crate::config::ProfileApiConfig;
use crate::services::profile::store::{ProfileStore, ReviewRecord, StoreError, WeakPointUpdate};

/// HTTP client for the profile service with a shared connection pool and a
/// configured per-request timeout.
pub struct HttpProfileStore {
    client: reqwest::Client,
    base_url: String,
}

/// Profile document returned by the GET endpoint
#[derive(Debug, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    weak_knowledge: Vec<WeakKnowledgePoint>,
}

/// Body of the create (POST) call
#[derive(Debug, Serialize)]
struct CreateProfileRequest {
    user_id: String,
    profile_json_str: String,
}

/// Body of the update (PUT) call
#[derive(Debug, Serialize)]
struct UpdateProfileRequest {
    profile_update_str: String,
}

impl HttpProfileStore {
    /// Create a store client from configuration
    pub fn new(config: &ProfileApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn profile_url(&self, user_id: &str) -> String {
        format!("{}/api/v1/user_profile/{}", self.base_url, user_id)
    }

    fn create_url(&self) -> String {
        format!("{}/api/v1/user_profile", self.base_url)
    }

    fn update_url(&self, user_id: &str, knowledge_id: &str) -> String {
        format!(
            "{}/api/v1/user_profile/{}/weak/{}",
            self.base_url, user_id, knowledge_id
        )
    }
}

/// Encode the nested document carried by `profile_json_str`.
fn create_payload_json(
    user_id: &str,
    point: &WeakKnowledgePoint,
    record: &ReviewRecord,
) -> Result<String, StoreError> {
    let payload = serde_json::json!({
        "user_id": user_id,
        "weak_knowledge": [point],
        "source": record.source,
        "mode": record.mode,
        "round_id": record.round_id,
        "review_summary": record.review_summary,
        "run_success": record.run_success,
    });
    serde_json::to_string(&payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Encode the nested document carried by `profile_update_str`.
fn update_payload_json(
    update: &WeakPointUpdate,
    record: &ReviewRecord,
) -> Result<String, StoreError> {
    let payload = serde_json::json!({
        "weak_score": update.weak_score,
        "weak_reason": update.weak_reason,
        "review_record": record,
    });
    serde_json::to_string(&payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

async fn error_for_status(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Http { status, body }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn fetch_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<WeakKnowledgePoint>>, StoreError> {
        let response = self
            .client
            .get(self.profile_url(user_id))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        // 404 means "no profile yet", not a failure
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let document: ProfileDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(document.weak_knowledge))
    }

    async fn create_point(
        &self,
        user_id: &str,
        point: &WeakKnowledgePoint,
        record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        let body = CreateProfileRequest {
            user_id: user_id.to_string(),
            profile_json_str: create_payload_json(user_id, point, record)?,
        };

        let response = self
            .client
            .post(self.create_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        Ok(())
    }

    async fn update_point(
        &self,
        user_id: &str,
        knowledge_id: &str,
        update: &WeakPointUpdate,
        record: &ReviewRecord,
    ) -> Result<(), StoreError> {
        let body = UpdateProfileRequest {
            profile_update_str: update_payload_json(update, record)?,
        };

        let response = self
            .client
            .put(self.update_url(user_id, knowledge_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        // A missing record is the fallback trigger, not an error
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        Ok(())
    }
}
