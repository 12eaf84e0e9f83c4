use crate::error::{Error, Result};
use crate::models::violation::Violation;
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProctoringService {
    pool: SqlitePool,
    clock: Clock,
}

impl ProctoringService {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        Self { pool, clock }
    }

    /// Appends one proctoring event against the candidate's own attempt.
    /// The timestamp is assigned here, never taken from the client, and
    /// events are accepted even after the attempt has closed so that
    /// signals in flight at submission are not lost.
    pub async fn log_violation(
        &self,
        candidate_id: i64,
        attempt_id: Uuid,
        violation_type: &str,
        details: Option<String>,
    ) -> Result<Violation> {
        let attempt_owner: Option<i64> =
            sqlx::query_scalar(r#"SELECT candidate_id FROM attempts WHERE id = ?"#)
                .bind(attempt_id)
                .fetch_optional(&self.pool)
                .await?;

        match attempt_owner {
            None => return Err(Error::NotFound("Attempt not found".to_string())),
            Some(owner) if owner != candidate_id => {
                return Err(Error::NotOwner(format!("attempt {}", attempt_id)));
            }
            Some(_) => {}
        }

        let now = self.clock.now();
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO violations (id, attempt_id, type, occurred_at, details, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(attempt_id)
        .bind(violation_type)
        .bind(now)
        .bind(&details)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Recorded {} violation on attempt {} by candidate {}",
            violation_type,
            attempt_id,
            candidate_id
        );

        Ok(Violation {
            id,
            attempt_id,
            violation_type: violation_type.to_string(),
            occurred_at: now,
            details,
            created_at: now,
        })
    }

    /// The examiner-facing feed, newest first.
    pub async fn list_all(&self) -> Result<Vec<ViolationFeedItem>> {
        let items = sqlx::query_as::<_, ViolationFeedItem>(
            r#"
            SELECT v.id, v.attempt_id, a.candidate_id, s.title AS assessment_title,
                   v.type, v.occurred_at, v.details
            FROM violations v
            JOIN attempts a ON a.id = v.attempt_id
            JOIN assessments s ON s.id = a.assessment_id
            ORDER BY v.occurred_at DESC, v.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct ViolationFeedItem {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub candidate_id: i64,
    pub assessment_title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub violation_type: String,
    pub occurred_at: DateTime<Utc>,
    pub details: Option<String>,
}
