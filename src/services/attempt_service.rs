use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::attempt::{Attempt, AttemptStatus};
use crate::models::question::Question;
use crate::models::response::Response;
use crate::services::scoring_service::ScoringService;
use crate::utils::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AttemptService {
    pool: SqlitePool,
    clock: Clock,
}

impl AttemptService {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        Self { pool, clock }
    }

    /// Starts (or resumes) the candidate's attempt. The authoritative
    /// deadline is derived from started_at and never stored.
    pub async fn start(&self, candidate_id: i64, assessment_id: Uuid) -> Result<StartedAttempt> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"SELECT * FROM assessments WHERE id = ? AND deleted_at IS NULL"#,
        )
        .bind(assessment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Assessment not found".to_string()))?;

        if !assessment.is_published {
            return Err(Error::NotAvailable(
                "Assessment is not published".to_string(),
            ));
        }
        if !assessment.is_active {
            let reason = if assessment.scheduled_at.is_some() {
                "Assessment has not opened yet"
            } else {
                "Assessment is not currently active"
            };
            return Err(Error::NotAvailable(reason.to_string()));
        }

        let existing = self.find_ongoing(candidate_id, assessment_id).await?;
        let attempt = match existing {
            Some(attempt) => attempt,
            None => {
                let now = self.clock.now();
                // The partial unique index absorbs a concurrent duplicate
                // start; whichever insert lands first wins and both callers
                // read the same row back.
                sqlx::query(
                    r#"
                    INSERT INTO attempts (id, candidate_id, assessment_id, status, score, started_at, submitted_at, created_at, updated_at)
                    VALUES (?, ?, ?, 'ongoing', NULL, ?, NULL, ?, ?)
                    ON CONFLICT(candidate_id, assessment_id) WHERE status = 'ongoing' DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(candidate_id)
                .bind(assessment_id)
                .bind(now)
                .bind(now)
                .bind(now)
                .execute(&self.pool)
                .await?;

                self.find_ongoing(candidate_id, assessment_id)
                    .await?
                    .ok_or_else(|| {
                        Error::Internal("Attempt disappeared while starting".to_string())
                    })?
            }
        };

        let questions = self.questions_for_assessment(assessment_id).await?;
        let deadline = attempt.started_at + Duration::minutes(assessment.duration_minutes);

        Ok(StartedAttempt {
            attempt,
            deadline,
            questions,
        })
    }

    /// Records (or overwrites) the candidate's answer to one question. The
    /// attempt status is always re-read here, and the upsert itself is
    /// guarded on `status = 'ongoing'` so a save racing the sweep's finish
    /// cannot land after closure.
    pub async fn save_answer(
        &self,
        candidate_id: i64,
        attempt_id: Uuid,
        question_id: Uuid,
        answer_value: &str,
        time_spent_seconds: i64,
    ) -> Result<Response> {
        let attempt = self.get_attempt(attempt_id).await?;
        if attempt.candidate_id != candidate_id {
            return Err(Error::NotOwner(format!("attempt {}", attempt_id)));
        }
        if attempt.status.is_terminal() {
            return Err(Error::NotOngoing("Exam already ended".to_string()));
        }

        let question = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE id = ? AND assessment_id = ?"#,
        )
        .bind(question_id)
        .bind(attempt.assessment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        // Opaque string comparison, case-sensitive, for both question types.
        let is_correct = answer_value == question.correct_answer;
        let now = self.clock.now();

        let result = sqlx::query(
            r#"
            INSERT INTO responses (id, attempt_id, question_id, answer_value, is_correct, time_spent_seconds, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM attempts WHERE id = ? AND status = 'ongoing')
            ON CONFLICT(attempt_id, question_id) DO UPDATE SET
                answer_value = excluded.answer_value,
                is_correct = excluded.is_correct,
                time_spent_seconds = excluded.time_spent_seconds,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt_id)
        .bind(question_id)
        .bind(answer_value)
        .bind(is_correct)
        .bind(time_spent_seconds)
        .bind(now)
        .bind(now)
        .bind(attempt_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotOngoing("Exam already ended".to_string()));
        }

        let response = sqlx::query_as::<_, Response>(
            r#"SELECT * FROM responses WHERE attempt_id = ? AND question_id = ?"#,
        )
        .bind(attempt_id)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(response)
    }

    /// Closes the attempt exactly once. The score is recomputed server-side
    /// from persisted responses and written together with the status flip in
    /// one conditional update; when the candidate and the sweep race, the
    /// loser finds the row already closed and returns the stored score.
    pub async fn finish(&self, attempt_id: Uuid, actor: FinishActor) -> Result<i64> {
        let attempt = self.get_attempt(attempt_id).await?;
        if let FinishActor::Candidate(candidate_id) = actor {
            if attempt.candidate_id != candidate_id {
                return Err(Error::NotOwner(format!("attempt {}", attempt_id)));
            }
        }

        let responses = sqlx::query_as::<_, Response>(
            r#"SELECT * FROM responses WHERE attempt_id = ?"#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        let question_count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM questions WHERE assessment_id = ?"#)
                .bind(attempt.assessment_id)
                .fetch_one(&self.pool)
                .await?;

        let score = ScoringService::score(&responses, question_count);
        let now = self.clock.now();

        let result = sqlx::query(
            r#"
            UPDATE attempts
            SET status = 'submitted', score = ?, submitted_at = ?, updated_at = ?
            WHERE id = ? AND status = 'ongoing'
            "#,
        )
        .bind(score)
        .bind(now)
        .bind(now)
        .bind(attempt_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(score);
        }

        // Lost the race: someone else already closed this attempt. A
        // submitted attempt's stored score is the desired end state; a
        // terminated one has no score to report.
        let current = self.get_attempt(attempt_id).await?;
        match (current.status, current.score) {
            (AttemptStatus::Submitted, Some(stored)) => {
                tracing::debug!(
                    "Attempt {} already submitted, returning stored score {}",
                    attempt_id,
                    stored
                );
                Ok(stored)
            }
            _ => Err(Error::NotOngoing(
                "Attempt is no longer scorable".to_string(),
            )),
        }
    }

    /// Submitted attempts for the candidate's results view, newest first.
    /// Soft-deleted assessments still contribute their title.
    pub async fn list_submitted(&self, candidate_id: i64) -> Result<Vec<SubmittedAttempt>> {
        let rows = sqlx::query_as::<_, SubmittedAttempt>(
            r#"
            SELECT a.id, a.assessment_id, s.title, a.status, a.score, a.started_at, a.submitted_at
            FROM attempts a
            JOIN assessments s ON s.id = a.assessment_id
            WHERE a.candidate_id = ? AND a.status = 'submitted'
            ORDER BY a.submitted_at DESC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_attempt(&self, attempt_id: Uuid) -> Result<Attempt> {
        let attempt = sqlx::query_as::<_, Attempt>(r#"SELECT * FROM attempts WHERE id = ?"#)
            .bind(attempt_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Attempt not found".to_string()))?;
        Ok(attempt)
    }

    async fn find_ongoing(
        &self,
        candidate_id: i64,
        assessment_id: Uuid,
    ) -> Result<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"SELECT * FROM attempts WHERE candidate_id = ? AND assessment_id = ? AND status = 'ongoing'"#,
        )
        .bind(candidate_id)
        .bind(assessment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn questions_for_assessment(&self, assessment_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE assessment_id = ? ORDER BY rowid"#,
        )
        .bind(assessment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }
}

/// Who asked for the closure; the sweep bypasses the ownership check.
#[derive(Debug, Clone, Copy)]
pub enum FinishActor {
    Candidate(i64),
    System,
}

#[derive(Debug, Clone)]
pub struct StartedAttempt {
    pub attempt: Attempt,
    pub deadline: DateTime<Utc>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct SubmittedAttempt {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub title: String,
    pub status: AttemptStatus,
    pub score: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}
