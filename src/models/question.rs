use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: QuestionType,
    #[serde(rename = "options")]
    #[sqlx(rename = "options_json")]
    pub options: Json<Vec<AnswerOption>>,
    pub correct_answer: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionType {
    SingleSelect,
    TrueFalse,
}

/// The id doubles as the option text; answers are matched against it as
/// opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}
