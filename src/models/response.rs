use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One recorded answer; unique per (attempt, question), later saves
/// overwrite. Frozen once the attempt leaves `ongoing`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Response {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub answer_value: String,
    pub is_correct: bool,
    pub time_spent_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
