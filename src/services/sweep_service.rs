use crate::error::{Error, Result};
use crate::services::attempt_service::{AttemptService, FinishActor};
use crate::utils::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Slack added on top of every attempt's deadline before the sweep closes
/// it, so a candidate submission in flight at the deadline still wins.
const EXPIRY_GRACE_SECS: i64 = 60;

#[derive(Clone)]
pub struct SweepService {
    pool: SqlitePool,
    clock: Clock,
    attempts: AttemptService,
}

impl SweepService {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        let attempts = AttemptService::new(pool.clone(), clock.clone());
        Self {
            pool,
            clock,
            attempts,
        }
    }

    /// One sweep pass: scan ongoing attempts, close every one whose
    /// deadline plus grace has passed. Deadlines are compared here rather
    /// than in SQL so a swept clock in tests behaves like real time.
    pub async fn run_once(&self) -> Result<u64> {
        let now = self.clock.now();
        let rows = sqlx::query_as::<_, ExpiryScanRow>(
            r#"
            SELECT a.id, a.started_at, s.duration_minutes
            FROM attempts a
            LEFT JOIN assessments s ON s.id = a.assessment_id
            WHERE a.status = 'ongoing'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut submitted = 0u64;
        for row in rows {
            let Some(duration_minutes) = row.duration_minutes else {
                tracing::warn!(
                    "Attempt {} references a missing assessment, skipping",
                    row.id
                );
                continue;
            };
            let deadline = row.started_at
                + Duration::minutes(duration_minutes)
                + Duration::seconds(EXPIRY_GRACE_SECS);
            if now <= deadline {
                continue;
            }

            match self.attempts.finish(row.id, FinishActor::System).await {
                Ok(score) => {
                    tracing::info!(
                        "Auto-submitted expired attempt {} with score {}",
                        row.id,
                        score
                    );
                    submitted += 1;
                }
                Err(Error::NotOngoing(_)) => {
                    tracing::debug!("Attempt {} closed before the sweep reached it", row.id);
                }
                Err(e) => {
                    tracing::error!("Failed to auto-submit attempt {}: {}", row.id, e);
                }
            }
        }

        Ok(submitted)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExpiryScanRow {
    id: Uuid,
    started_at: DateTime<Utc>,
    duration_minutes: Option<i64>,
}
