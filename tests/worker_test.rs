mod common;

use assessment_backend::models::attempt::{Attempt, AttemptStatus};
use assessment_backend::services::assessment_service::AssessmentService;
use assessment_backend::services::attempt_service::AttemptService;
use assessment_backend::services::availability_service::AvailabilityService;
use assessment_backend::services::sweep_service::SweepService;
use assessment_backend::utils::clock::Clock;
use chrono::{Duration, TimeZone, Utc};

#[tokio::test]
async fn sweep_closes_expired_attempts_and_leaves_live_ones() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 30, None).await;
    let attempts = AttemptService::new(pool.clone(), clock.clone());
    let sweep = SweepService::new(pool.clone(), clock.clone());

    // First attempt starts at T, answers half the questions.
    let expired = attempts.start(7, assessment.id).await.expect("start");
    for (q, answer) in questions.iter().zip(["let", "String"]) {
        attempts
            .save_answer(7, expired.attempt.id, q.id, answer, 10)
            .await
            .expect("save");
    }

    // Second attempt starts four minutes later and is still inside its
    // window when the sweep runs.
    clock.advance(Duration::minutes(4));
    let live = attempts.start(8, assessment.id).await.expect("start");

    // T+32: past the first deadline plus grace (31 min), before the second
    // one (35 min).
    clock.set(Utc.with_ymd_and_hms(2026, 3, 10, 9, 32, 0).unwrap());
    let closed = sweep.run_once().await.expect("sweep");
    assert_eq!(closed, 1);

    let swept = attempts
        .get_attempt(expired.attempt.id)
        .await
        .expect("reload expired");
    assert_eq!(swept.status, AttemptStatus::Submitted);
    assert_eq!(swept.score, Some(50));
    assert_eq!(swept.submitted_at, Some(clock.now()));

    let untouched = attempts
        .get_attempt(live.attempt.id)
        .await
        .expect("reload live");
    assert_eq!(untouched.status, AttemptStatus::Ongoing);
    assert_eq!(untouched.score, None);

    // A second pass finds nothing new.
    let closed = sweep.run_once().await.expect("second sweep");
    assert_eq!(closed, 0);
}

#[tokio::test]
async fn sweep_scores_from_persisted_answers_only() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let (assessment, questions) = common::seed_assessment(&pool, &clock, 1, 10, None).await;
    let attempts = AttemptService::new(pool.clone(), clock.clone());
    let sweep = SweepService::new(pool.clone(), clock.clone());

    let started = attempts.start(7, assessment.id).await.expect("start");
    attempts
        .save_answer(7, started.attempt.id, questions[3].id, "True", 3)
        .await
        .expect("save");

    clock.advance(Duration::minutes(12));
    assert_eq!(sweep.run_once().await.expect("sweep"), 1);

    let swept: Attempt = sqlx::query_as("SELECT * FROM attempts WHERE id = ?")
        .bind(started.attempt.id)
        .fetch_one(&pool)
        .await
        .expect("reload");
    assert_eq!(swept.score, Some(25));
}

#[tokio::test]
async fn availability_pass_opens_and_closes_the_window() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let opens_at = Utc.with_ymd_and_hms(2026, 3, 10, 9, 10, 0).unwrap();
    let (assessment, _) = common::seed_assessment(&pool, &clock, 1, 30, Some(opens_at)).await;
    assert!(!assessment.is_active);

    let scheduler = AvailabilityService::new(pool.clone(), clock.clone());
    let service = AssessmentService::new(pool.clone(), clock.clone());

    // Before the scheduled time nothing moves.
    assert_eq!(scheduler.run_once().await.expect("early pass"), (0, 0));

    clock.set(opens_at);
    assert_eq!(scheduler.run_once().await.expect("opening pass"), (1, 0));
    let (opened, _) = service.get_for_examiner(1, assessment.id).await.expect("reload");
    assert!(opened.is_active);
    assert_eq!(opened.enabled_at, Some(opens_at));

    // Re-running at the same instant changes nothing.
    assert_eq!(scheduler.run_once().await.expect("repeat pass"), (0, 0));

    // One hour after enabling, the window closes again.
    clock.advance(Duration::minutes(61));
    assert_eq!(scheduler.run_once().await.expect("closing pass"), (0, 1));
    let (closed, _) = service.get_for_examiner(1, assessment.id).await.expect("reload");
    assert!(!closed.is_active);
    assert_eq!(closed.enabled_at, None);

    // The stale schedule is not reopened on later passes.
    assert_eq!(scheduler.run_once().await.expect("late pass"), (0, 0));
}

#[tokio::test]
async fn availability_pass_ignores_missed_schedules() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let opens_at = clock.now();
    let (assessment, _) = common::seed_assessment(&pool, &clock, 1, 30, Some(opens_at)).await;

    // The scheduler was down for two hours; the window has already passed.
    clock.advance(Duration::hours(2));
    let scheduler = AvailabilityService::new(pool.clone(), clock.clone());
    assert_eq!(scheduler.run_once().await.expect("pass"), (0, 0));

    let is_active: bool = sqlx::query_scalar("SELECT is_active FROM assessments WHERE id = ?")
        .bind(assessment.id)
        .fetch_one(&pool)
        .await
        .expect("reload");
    assert!(!is_active);
}

#[tokio::test]
async fn manual_enable_expires_after_the_window() {
    common::setup_env();
    let pool = common::test_pool().await;
    let clock = Clock::fixed(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
    let opens_at = Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap();
    let (assessment, _) = common::seed_assessment(&pool, &clock, 1, 30, Some(opens_at)).await;

    let service = AssessmentService::new(pool.clone(), clock.clone());
    let scheduler = AvailabilityService::new(pool.clone(), clock.clone());

    // Examiner opens it early by hand; enabled_at is stamped.
    let toggled = service
        .set_active(1, assessment.id, true)
        .await
        .expect("toggle on");
    assert!(toggled.is_active);
    assert_eq!(toggled.enabled_at, Some(clock.now()));

    clock.advance(Duration::minutes(61));
    assert_eq!(scheduler.run_once().await.expect("pass"), (0, 1));

    let (reloaded, _) = service.get_for_examiner(1, assessment.id).await.expect("reload");
    assert!(!reloaded.is_active);
}
