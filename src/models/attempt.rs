use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attempt {
    pub id: Uuid,
    pub candidate_id: i64,
    pub assessment_id: Uuid,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `Submitted` and `Terminated` are terminal; the only normal transition is
/// the conditional update in `AttemptService::finish`. `Terminated` is
/// reserved for out-of-band invalidation and is never scorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttemptStatus {
    Ongoing,
    Submitted,
    Terminated,
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptStatus::Ongoing)
    }
}
