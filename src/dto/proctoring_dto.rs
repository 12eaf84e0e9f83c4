use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::violation::Violation;
use crate::services::proctoring_service::ViolationFeedItem;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LogViolationPayload {
    pub attempt_id: Uuid,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub violation_type: String,
    #[validate(length(max = 1024))]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationResponse {
    pub id: Uuid,
    pub attempt_id: Uuid,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub occurred_at: DateTime<Utc>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationFeedEntry {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub candidate_id: i64,
    pub assessment_title: String,
    #[serde(rename = "type")]
    pub violation_type: String,
    pub occurred_at: DateTime<Utc>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationFeedResponse {
    pub items: Vec<ViolationFeedEntry>,
}

impl From<Violation> for ViolationResponse {
    fn from(value: Violation) -> Self {
        Self {
            id: value.id,
            attempt_id: value.attempt_id,
            violation_type: value.violation_type,
            occurred_at: value.occurred_at,
            details: value.details,
        }
    }
}

impl From<ViolationFeedItem> for ViolationFeedEntry {
    fn from(value: ViolationFeedItem) -> Self {
        Self {
            id: value.id,
            attempt_id: value.attempt_id,
            candidate_id: value.candidate_id,
            assessment_title: value.assessment_title,
            violation_type: value.violation_type,
            occurred_at: value.occurred_at,
            details: value.details,
        }
    }
}
