use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::assessment::{Assessment, AssessmentKind};
use crate::models::attempt::{Attempt, AttemptStatus};
use crate::models::question::{AnswerOption, Question, QuestionType};
use crate::services::assessment_service::PublishedAssessment;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAssessmentPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i64,
    pub kind: Option<AssessmentKind>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1))]
    pub questions: Vec<CreateQuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateQuestionPayload {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAssessmentStatusPayload {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    pub id: Uuid,
    pub examiner_id: i64,
    pub title: String,
    pub duration_minutes: i64,
    pub kind: AssessmentKind,
    pub is_published: bool,
    pub is_active: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub enabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentDetailResponse {
    pub id: Uuid,
    pub examiner_id: i64,
    pub title: String,
    pub duration_minutes: i64,
    pub kind: AssessmentKind,
    pub is_published: bool,
    pub is_active: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub enabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub questions: Vec<QuestionResponse>,
}

/// Examiner view of a question, correct answer included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
}

/// Candidate view of a question. The correct answer never leaves the server
/// through this shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateQuestionResponse {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<AnswerOption>,
}

/// Listing entry for candidates. `can_take` mirrors the availability flag;
/// the window itself is enforced again at start.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateAssessmentSummary {
    pub id: Uuid,
    pub title: String,
    pub duration_minutes: i64,
    pub kind: AssessmentKind,
    pub can_take: bool,
    pub is_scheduled: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateAssessmentDetail {
    pub id: Uuid,
    pub title: String,
    pub duration_minutes: i64,
    pub kind: AssessmentKind,
    pub is_active: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub questions: Vec<CandidateQuestionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentListResponse {
    pub items: Vec<AssessmentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateAssessmentListResponse {
    pub items: Vec<CandidateAssessmentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttemptOverviewResponse {
    pub id: Uuid,
    pub candidate_id: i64,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssessmentAttemptsResponse {
    pub items: Vec<AttemptOverviewResponse>,
}

impl From<Assessment> for AssessmentResponse {
    fn from(value: Assessment) -> Self {
        Self {
            id: value.id,
            examiner_id: value.examiner_id,
            title: value.title,
            duration_minutes: value.duration_minutes,
            kind: value.kind,
            is_published: value.is_published,
            is_active: value.is_active,
            scheduled_at: value.scheduled_at,
            enabled_at: value.enabled_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<(Assessment, Vec<Question>)> for AssessmentDetailResponse {
    fn from((assessment, questions): (Assessment, Vec<Question>)) -> Self {
        Self {
            id: assessment.id,
            examiner_id: assessment.examiner_id,
            title: assessment.title,
            duration_minutes: assessment.duration_minutes,
            kind: assessment.kind,
            is_published: assessment.is_published,
            is_active: assessment.is_active,
            scheduled_at: assessment.scheduled_at,
            enabled_at: assessment.enabled_at,
            created_at: assessment.created_at,
            updated_at: assessment.updated_at,
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Question> for QuestionResponse {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            text: value.text,
            question_type: value.question_type,
            options: value.options.0,
            correct_answer: value.correct_answer,
        }
    }
}

impl From<Question> for CandidateQuestionResponse {
    fn from(value: Question) -> Self {
        Self {
            id: value.id,
            text: value.text,
            question_type: value.question_type,
            options: value.options.0,
        }
    }
}

impl From<PublishedAssessment> for CandidateAssessmentSummary {
    fn from(value: PublishedAssessment) -> Self {
        Self {
            id: value.assessment.id,
            title: value.assessment.title,
            duration_minutes: value.assessment.duration_minutes,
            kind: value.assessment.kind,
            can_take: value.assessment.is_active,
            is_scheduled: value.assessment.scheduled_at.is_some(),
            scheduled_at: value.assessment.scheduled_at,
            question_count: value.question_count,
        }
    }
}

impl From<(Assessment, Vec<Question>)> for CandidateAssessmentDetail {
    fn from((assessment, questions): (Assessment, Vec<Question>)) -> Self {
        Self {
            id: assessment.id,
            title: assessment.title,
            duration_minutes: assessment.duration_minutes,
            kind: assessment.kind,
            is_active: assessment.is_active,
            scheduled_at: assessment.scheduled_at,
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Attempt> for AttemptOverviewResponse {
    fn from(value: Attempt) -> Self {
        Self {
            id: value.id,
            candidate_id: value.candidate_id,
            status: value.status,
            score: value.score,
            started_at: value.started_at,
            submitted_at: value.submitted_at,
        }
    }
}
