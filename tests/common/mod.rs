#![allow(dead_code)]

use assessment_backend::dto::assessment_dto::{CreateAssessmentPayload, CreateQuestionPayload};
use assessment_backend::middleware::auth::Claims;
use assessment_backend::models::assessment::Assessment;
use assessment_backend::models::question::{Question, QuestionType};
use assessment_backend::services::assessment_service::AssessmentService;
use assessment_backend::utils::clock::Clock;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const JWT_SECRET: &str = "test_secret_key";

pub fn setup_env() {
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("JWT_SECRET", JWT_SECRET);
    let _ = assessment_backend::config::init_config();
}

/// Single-connection in-memory database; every handle sees the same data.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("sqlite options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

pub fn bearer(user_id: i64, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: 4102444800,
        role: Some(role.to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token");
    format!("Bearer {}", token)
}

/// Four-question assessment: three single select plus one true/false, so
/// partial scores land on quarter boundaries.
pub async fn seed_assessment(
    pool: &SqlitePool,
    clock: &Clock,
    examiner_id: i64,
    duration_minutes: i64,
    scheduled_at: Option<DateTime<Utc>>,
) -> (Assessment, Vec<Question>) {
    let service = AssessmentService::new(pool.clone(), clock.clone());
    service
        .create(
            examiner_id,
            CreateAssessmentPayload {
                title: "Rust Fundamentals".to_string(),
                duration_minutes,
                kind: None,
                scheduled_at,
                questions: vec![
                    CreateQuestionPayload {
                        text: "Which keyword declares an immutable binding?".to_string(),
                        question_type: QuestionType::SingleSelect,
                        options: vec![
                            "let".to_string(),
                            "mut".to_string(),
                            "static".to_string(),
                        ],
                        correct_answer: "let".to_string(),
                    },
                    CreateQuestionPayload {
                        text: "Which type owns a growable UTF-8 string?".to_string(),
                        question_type: QuestionType::SingleSelect,
                        options: vec![
                            "str".to_string(),
                            "String".to_string(),
                            "char".to_string(),
                        ],
                        correct_answer: "String".to_string(),
                    },
                    CreateQuestionPayload {
                        text: "Which trait enables the ? operator conversion?".to_string(),
                        question_type: QuestionType::SingleSelect,
                        options: vec![
                            "From".to_string(),
                            "Clone".to_string(),
                            "Copy".to_string(),
                        ],
                        correct_answer: "From".to_string(),
                    },
                    CreateQuestionPayload {
                        text: "A Vec grows automatically when pushed into".to_string(),
                        question_type: QuestionType::TrueFalse,
                        options: vec![],
                        correct_answer: "True".to_string(),
                    },
                ],
            },
        )
        .await
        .expect("seed assessment")
}
