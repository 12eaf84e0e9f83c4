use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only proctoring signal; never updated, never feeds back into the
/// attempt state machine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Violation {
    pub id: Uuid,
    pub attempt_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub violation_type: String,
    pub occurred_at: DateTime<Utc>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
