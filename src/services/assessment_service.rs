use crate::dto::assessment_dto::CreateAssessmentPayload;
use crate::error::{Error, Result};
use crate::models::assessment::{Assessment, AssessmentKind};
use crate::models::attempt::Attempt;
use crate::models::question::{AnswerOption, Question, QuestionType};
use crate::utils::clock::Clock;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssessmentService {
    pool: SqlitePool,
    clock: Clock,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishedAssessment {
    #[sqlx(flatten)]
    pub assessment: Assessment,
    pub question_count: i64,
}

impl AssessmentService {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        Self { pool, clock }
    }

    /// Creates an assessment together with its question bank in one
    /// transaction. Scheduled assessments start inactive and wait for the
    /// availability pass; unscheduled ones open immediately.
    pub async fn create(
        &self,
        examiner_id: i64,
        payload: CreateAssessmentPayload,
    ) -> Result<(Assessment, Vec<Question>)> {
        let now = self.clock.now();
        let kind = payload.kind.unwrap_or(AssessmentKind::Exam);
        let is_active = payload.scheduled_at.is_none();

        let assessment = Assessment {
            id: Uuid::new_v4(),
            examiner_id,
            title: payload.title,
            duration_minutes: payload.duration_minutes,
            kind,
            is_published: true,
            is_active,
            scheduled_at: payload.scheduled_at,
            enabled_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        let mut questions = Vec::with_capacity(payload.questions.len());
        for q in payload.questions {
            let text = q.text.trim().to_string();
            if text.is_empty() {
                return Err(Error::BadRequest("Question text cannot be empty".to_string()));
            }

            let options = match q.question_type {
                QuestionType::SingleSelect => {
                    if q.options.len() < 2 {
                        return Err(Error::BadRequest(format!(
                            "Question '{}' needs at least two options",
                            text
                        )));
                    }
                    if !q.options.contains(&q.correct_answer) {
                        return Err(Error::BadRequest(format!(
                            "Correct answer for '{}' is not among its options",
                            text
                        )));
                    }
                    q.options
                        .into_iter()
                        .map(|o| AnswerOption { id: o.clone(), text: o })
                        .collect()
                }
                QuestionType::TrueFalse => {
                    if q.correct_answer != "True" && q.correct_answer != "False" {
                        return Err(Error::BadRequest(format!(
                            "Correct answer for '{}' must be True or False",
                            text
                        )));
                    }
                    vec![
                        AnswerOption {
                            id: "True".to_string(),
                            text: "True".to_string(),
                        },
                        AnswerOption {
                            id: "False".to_string(),
                            text: "False".to_string(),
                        },
                    ]
                }
            };

            questions.push(Question {
                id: Uuid::new_v4(),
                assessment_id: assessment.id,
                text,
                question_type: q.question_type,
                options: Json(options),
                correct_answer: q.correct_answer,
                created_at: now,
            });
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO assessments (id, examiner_id, title, duration_minutes, kind, is_published, is_active, scheduled_at, enabled_at, deleted_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)
            "#,
        )
        .bind(assessment.id)
        .bind(assessment.examiner_id)
        .bind(&assessment.title)
        .bind(assessment.duration_minutes)
        .bind(assessment.kind)
        .bind(assessment.is_published)
        .bind(assessment.is_active)
        .bind(assessment.scheduled_at)
        .bind(assessment.created_at)
        .bind(assessment.updated_at)
        .execute(&mut *tx)
        .await?;

        for question in &questions {
            sqlx::query(
                r#"
                INSERT INTO questions (id, assessment_id, text, type, options_json, correct_answer, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(question.id)
            .bind(question.assessment_id)
            .bind(&question.text)
            .bind(question.question_type)
            .bind(&question.options)
            .bind(&question.correct_answer)
            .bind(question.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Examiner {} created assessment {} with {} questions",
            examiner_id,
            assessment.id,
            questions.len()
        );

        Ok((assessment, questions))
    }

    pub async fn list_for_examiner(&self, examiner_id: i64) -> Result<Vec<Assessment>> {
        let assessments = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT * FROM assessments
            WHERE examiner_id = ? AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(examiner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assessments)
    }

    /// Every published, live assessment with its question count, for the
    /// candidate catalogue.
    pub async fn list_published(&self) -> Result<Vec<PublishedAssessment>> {
        let assessments = sqlx::query_as::<_, PublishedAssessment>(
            r#"
            SELECT s.*,
                   (SELECT COUNT(*) FROM questions q WHERE q.assessment_id = s.id) AS question_count
            FROM assessments s
            WHERE s.is_published = 1 AND s.deleted_at IS NULL
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(assessments)
    }

    pub async fn get_for_examiner(
        &self,
        examiner_id: i64,
        id: Uuid,
    ) -> Result<(Assessment, Vec<Question>)> {
        let assessment = self.get_owned(examiner_id, id).await?;
        let questions = self.questions_for(id).await?;
        Ok((assessment, questions))
    }

    pub async fn get_for_candidate(&self, id: Uuid) -> Result<(Assessment, Vec<Question>)> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"SELECT * FROM assessments WHERE id = ? AND is_published = 1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Assessment not found".to_string()))?;

        let questions = self.questions_for(id).await?;
        Ok((assessment, questions))
    }

    /// Manual availability override. Enabling stamps enabled_at so the
    /// scheduler later closes the window; disabling clears it.
    pub async fn set_active(&self, examiner_id: i64, id: Uuid, active: bool) -> Result<Assessment> {
        self.get_owned(examiner_id, id).await?;
        let now = self.clock.now();
        let enabled_at = if active { Some(now) } else { None };

        sqlx::query(
            r#"
            UPDATE assessments
            SET is_active = ?, enabled_at = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(active)
        .bind(enabled_at)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_owned(examiner_id, id).await
    }

    /// Soft delete. Attempts and responses stay behind for the results
    /// history; ongoing attempts still expire through the sweep.
    pub async fn soft_delete(&self, examiner_id: i64, id: Uuid) -> Result<()> {
        self.get_owned(examiner_id, id).await?;
        let now = self.clock.now();

        sqlx::query(
            r#"
            UPDATE assessments
            SET deleted_at = ?, is_active = 0, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::info!("Examiner {} deleted assessment {}", examiner_id, id);
        Ok(())
    }

    pub async fn attempts_for_assessment(
        &self,
        examiner_id: i64,
        id: Uuid,
    ) -> Result<Vec<Attempt>> {
        self.get_owned(examiner_id, id).await?;
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"SELECT * FROM attempts WHERE assessment_id = ? ORDER BY started_at DESC"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn get_owned(&self, examiner_id: i64, id: Uuid) -> Result<Assessment> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"SELECT * FROM assessments WHERE id = ? AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Assessment not found".to_string()))?;

        if assessment.examiner_id != examiner_id {
            return Err(Error::NotOwner(format!("assessment {}", id)));
        }
        Ok(assessment)
    }

    async fn questions_for(&self, assessment_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE assessment_id = ? ORDER BY rowid"#,
        )
        .bind(assessment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }
}
