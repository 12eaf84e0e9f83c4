pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assessment_service::AssessmentService, attempt_service::AttemptService,
    proctoring_service::ProctoringService,
};
use crate::utils::clock::Clock;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub clock: Clock,
    pub assessment_service: AssessmentService,
    pub attempt_service: AttemptService,
    pub proctoring_service: ProctoringService,
}

impl AppState {
    pub fn new(pool: SqlitePool, clock: Clock) -> Self {
        let assessment_service = AssessmentService::new(pool.clone(), clock.clone());
        let attempt_service = AttemptService::new(pool.clone(), clock.clone());
        let proctoring_service = ProctoringService::new(pool.clone(), clock.clone());

        Self {
            pool,
            clock,
            assessment_service,
            attempt_service,
            proctoring_service,
        }
    }
}
