mod common;

use assessment_backend::error::Error;
use assessment_backend::models::attempt::AttemptStatus;
use assessment_backend::services::attempt_service::{AttemptService, FinishActor};
use assessment_backend::utils::clock::Clock;
use chrono::{Duration, TimeZone, Utc};

#[tokio::test]
async fn start_is_idempotent_per_candidate_and_assessment() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let service = AttemptService::new(pool.clone(), clock.clone());

    let first = service.start(7, assessment.id).await.expect("first start");
    assert_eq!(first.attempt.status, AttemptStatus::Ongoing);
    assert_eq!(first.questions.len(), questions.len());
    assert_eq!(
        first.deadline,
        first.attempt.started_at + Duration::minutes(30)
    );

    clock.advance(Duration::minutes(5));
    let second = service.start(7, assessment.id).await.expect("second start");
    assert_eq!(second.attempt.id, first.attempt.id);
    assert_eq!(second.attempt.started_at, first.attempt.started_at);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM attempts WHERE candidate_id = ? AND assessment_id = ?")
            .bind(7i64)
            .bind(assessment.id)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(count, 1);

    // Another candidate gets their own attempt.
    let other = service.start(8, assessment.id).await.expect("other start");
    assert_ne!(other.attempt.id, first.attempt.id);
}

#[tokio::test]
async fn start_rejects_unavailable_assessments() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let opens_at = clock.now() + Duration::hours(2);
    let (scheduled, _) = common::seed_assessment(&pool, &clock, 1, 30, Some(opens_at)).await;
    assert!(!scheduled.is_active);

    let service = AttemptService::new(pool.clone(), clock.clone());
    let err = service.start(7, scheduled.id).await.unwrap_err();
    assert!(matches!(err, Error::NotAvailable(_)));

    let missing = uuid::Uuid::new_v4();
    let err = service.start(7, missing).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn save_answer_overwrites_and_enforces_ownership() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let service = AttemptService::new(pool.clone(), clock.clone());

    let started = service.start(7, assessment.id).await.expect("start");
    let attempt_id = started.attempt.id;
    let q = &questions[0];

    service
        .save_answer(7, attempt_id, q.id, "mut", 4)
        .await
        .expect("first save");
    let is_correct: bool =
        sqlx::query_scalar("SELECT is_correct FROM responses WHERE attempt_id = ? AND question_id = ?")
            .bind(attempt_id)
            .bind(q.id)
            .fetch_one(&pool)
            .await
            .expect("read response");
    assert!(!is_correct);

    // Re-answering replaces the stored value instead of adding a row.
    service
        .save_answer(7, attempt_id, q.id, "let", 9)
        .await
        .expect("second save");
    let (count, is_correct): (i64, bool) = (
        sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE attempt_id = ?")
            .bind(attempt_id)
            .fetch_one(&pool)
            .await
            .expect("count"),
        sqlx::query_scalar("SELECT is_correct FROM responses WHERE attempt_id = ? AND question_id = ?")
            .bind(attempt_id)
            .bind(q.id)
            .fetch_one(&pool)
            .await
            .expect("read response"),
    );
    assert_eq!(count, 1);
    assert!(is_correct);

    let err = service
        .save_answer(8, attempt_id, q.id, "let", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOwner(_)));

    service
        .finish(attempt_id, FinishActor::Candidate(7))
        .await
        .expect("finish");
    let err = service
        .save_answer(7, attempt_id, q.id, "static", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOngoing(_)));

    // The rejected save left the frozen responses untouched.
    let (count, answer): (i64, String) = (
        sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE attempt_id = ?")
            .bind(attempt_id)
            .fetch_one(&pool)
            .await
            .expect("count"),
        sqlx::query_scalar("SELECT answer_value FROM responses WHERE attempt_id = ? AND question_id = ?")
            .bind(attempt_id)
            .bind(q.id)
            .fetch_one(&pool)
            .await
            .expect("read response"),
    );
    assert_eq!(count, 1);
    assert_eq!(answer, "let");
}

#[tokio::test]
async fn concurrent_finishes_agree_on_one_score() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let service = AttemptService::new(pool.clone(), clock.clone());

    let started = service.start(7, assessment.id).await.expect("start");
    let attempt_id = started.attempt.id;

    // Three of four correct, the fourth left unanswered.
    for (q, answer) in questions.iter().zip(["let", "String", "From"]) {
        service
            .save_answer(7, attempt_id, q.id, answer, 5)
            .await
            .expect("save");
    }

    let (candidate, sweeper) = tokio::join!(
        service.finish(attempt_id, FinishActor::Candidate(7)),
        service.finish(attempt_id, FinishActor::System),
    );
    assert_eq!(candidate.expect("candidate finish"), 75);
    assert_eq!(sweeper.expect("system finish"), 75);

    let attempt = service.get_attempt(attempt_id).await.expect("reload");
    assert_eq!(attempt.status, AttemptStatus::Submitted);
    assert_eq!(attempt.score, Some(75));
    assert!(attempt.submitted_at.is_some());
}

#[tokio::test]
async fn terminated_attempts_reject_saves_and_finishes() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let service = AttemptService::new(pool.clone(), clock.clone());

    let started = service.start(7, assessment.id).await.expect("start");
    sqlx::query("UPDATE attempts SET status = 'terminated' WHERE id = ?")
        .bind(started.attempt.id)
        .execute(&pool)
        .await
        .expect("terminate");

    let err = service
        .save_answer(7, started.attempt.id, questions[0].id, "let", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOngoing(_)));

    let err = service
        .finish(started.attempt.id, FinishActor::Candidate(7))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOngoing(_)));

    let score: Option<i64> = sqlx::query_scalar("SELECT score FROM attempts WHERE id = ?")
        .bind(started.attempt.id)
        .fetch_one(&pool)
        .await
        .expect("reload");
    assert_eq!(score, None);
}

#[tokio::test]
async fn finish_with_no_answers_scores_zero() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, _) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let service = AttemptService::new(pool.clone(), clock.clone());

    let started = service.start(7, assessment.id).await.expect("start");
    let score = service
        .finish(started.attempt.id, FinishActor::Candidate(7))
        .await
        .expect("finish");
    assert_eq!(score, 0);

    let submitted = service.list_submitted(7).await.expect("list");
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].score, Some(0));
    assert_eq!(submitted[0].title, "Rust Fundamentals");
}
