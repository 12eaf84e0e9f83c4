use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::assessment_dto::CandidateQuestionResponse;
use crate::models::attempt::AttemptStatus;
use crate::models::response::Response;
use crate::services::attempt_service::{StartedAttempt, SubmittedAttempt};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub assessment_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub questions: Vec<CandidateQuestionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveAnswerPayload {
    pub question_id: Uuid,
    #[validate(length(min = 1))]
    pub answer_value: String,
    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i64>,
}

/// Deliberately silent about correctness; graded results only appear after
/// the attempt is finished.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveAnswerResponse {
    pub saved: bool,
    pub question_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinishAttemptResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyAttemptResponse {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub assessment_title: String,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyAttemptsResponse {
    pub items: Vec<MyAttemptResponse>,
}

impl From<StartedAttempt> for StartAttemptResponse {
    fn from(value: StartedAttempt) -> Self {
        Self {
            attempt_id: value.attempt.id,
            assessment_id: value.attempt.assessment_id,
            status: value.attempt.status,
            started_at: value.attempt.started_at,
            deadline: value.deadline,
            questions: value.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Response> for SaveAnswerResponse {
    fn from(value: Response) -> Self {
        Self {
            saved: true,
            question_id: value.question_id,
            timestamp: value.updated_at,
        }
    }
}

impl From<SubmittedAttempt> for MyAttemptResponse {
    fn from(value: SubmittedAttempt) -> Self {
        Self {
            id: value.id,
            assessment_id: value.assessment_id,
            assessment_title: value.title,
            status: value.status,
            score: value.score,
            started_at: value.started_at,
            submitted_at: value.submitted_at,
        }
    }
}
