use crate::error::Result;
use crate::models::assessment::Assessment;
use crate::utils::clock::Clock;
use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;

/// A scheduled assessment is only auto-enabled within this window after its
/// scheduled_at, and auto-disabled once it has been enabled for this long.
const AVAILABILITY_WINDOW_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AvailabilityService {
    pool: SqlitePool,
    clock: Clock,
}

impl AvailabilityService {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        Self { pool, clock }
    }

    /// One scheduler pass over all live assessments. Returns how many were
    /// enabled and disabled. Each transition re-checks its preconditions in
    /// the UPDATE itself, so overlapping passes and manual toggles cannot
    /// double-apply a transition.
    pub async fn run_once(&self) -> Result<(u64, u64)> {
        let now = self.clock.now();
        let window = Duration::seconds(AVAILABILITY_WINDOW_SECS);

        let assessments = sqlx::query_as::<_, Assessment>(
            r#"SELECT * FROM assessments WHERE deleted_at IS NULL"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut enabled = 0u64;
        let mut disabled = 0u64;

        for assessment in assessments {
            if !assessment.is_active {
                let Some(scheduled_at) = assessment.scheduled_at else {
                    continue;
                };
                // Too-old schedules stay closed; the window is not reopened
                // retroactively.
                if assessment.enabled_at.is_none()
                    && scheduled_at <= now
                    && scheduled_at > now - window
                {
                    if self.activate(assessment.id).await? {
                        tracing::info!(
                            "Scheduler activated assessment {} ({})",
                            assessment.id,
                            assessment.title
                        );
                        enabled += 1;
                    }
                }
                continue;
            }

            match assessment.enabled_at {
                Some(enabled_at) if enabled_at < now - window => {
                    if self.deactivate(assessment.id).await? {
                        tracing::info!(
                            "Scheduler deactivated assessment {} ({})",
                            assessment.id,
                            assessment.title
                        );
                        disabled += 1;
                    }
                }
                // Active with no enable timestamp and a stale schedule means
                // a transition was lost somewhere; close it so it cannot
                // stay open forever. Unscheduled assessments stay open until
                // toggled by hand.
                None => {
                    if let Some(scheduled_at) = assessment.scheduled_at {
                        if scheduled_at < now - window {
                            if self.close_stale(assessment.id).await? {
                                tracing::warn!(
                                    "Scheduler closed stale assessment {} with no enabled_at",
                                    assessment.id
                                );
                                disabled += 1;
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok((enabled, disabled))
    }

    async fn activate(&self, id: Uuid) -> Result<bool> {
        let now = self.clock.now();
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET is_active = 1, enabled_at = ?, updated_at = ?
            WHERE id = ? AND is_active = 0 AND enabled_at IS NULL AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let now = self.clock.now();
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET is_active = 0, enabled_at = NULL, updated_at = ?
            WHERE id = ? AND is_active = 1
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn close_stale(&self, id: Uuid) -> Result<bool> {
        let now = self.clock.now();
        let result = sqlx::query(
            r#"
            UPDATE assessments
            SET is_active = 0, updated_at = ?
            WHERE id = ? AND is_active = 1 AND enabled_at IS NULL
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
