use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::attempt_dto::{
        FinishAttemptResponse, MyAttemptsResponse, SaveAnswerPayload, SaveAnswerResponse,
        StartAttemptResponse,
    },
    error::Result,
    middleware::auth::AuthUser,
    models::attempt::AttemptStatus,
    services::attempt_service::FinishActor,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/assessments/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    responses(
        (status = 201, description = "Attempt started or resumed", body = StartAttemptResponse),
        (status = 403, description = "Assessment is not open"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(assessment_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let started = state.attempt_service.start(user.id, assessment_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(StartAttemptResponse::from(started)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/attempts/{id}/save",
    params(
        ("id" = Uuid, Path, description = "Attempt ID")
    ),
    request_body = SaveAnswerPayload,
    responses(
        (status = 200, description = "Answer stored", body = SaveAnswerResponse),
        (status = 403, description = "Attempt belongs to another candidate"),
        (status = 404, description = "Attempt or question not found"),
        (status = 409, description = "Attempt is no longer ongoing")
    )
)]
#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<SaveAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state
        .attempt_service
        .save_answer(
            user.id,
            attempt_id,
            payload.question_id,
            &payload.answer_value,
            payload.time_spent_seconds.unwrap_or(0),
        )
        .await?;
    Ok(Json(SaveAnswerResponse::from(response)))
}

#[utoipa::path(
    post,
    path = "/api/attempts/{id}/finish",
    params(
        ("id" = Uuid, Path, description = "Attempt ID")
    ),
    responses(
        (status = 200, description = "Attempt submitted and scored", body = FinishAttemptResponse),
        (status = 403, description = "Attempt belongs to another candidate"),
        (status = 404, description = "Attempt not found"),
        (status = 409, description = "Attempt was terminated")
    )
)]
#[axum::debug_handler]
pub async fn finish_attempt(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let score = state
        .attempt_service
        .finish(attempt_id, FinishActor::Candidate(user.id))
        .await?;
    Ok(Json(FinishAttemptResponse {
        attempt_id,
        status: AttemptStatus::Submitted,
        score,
    }))
}

#[axum::debug_handler]
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let attempts = state.attempt_service.list_submitted(user.id).await?;
    let items = attempts.into_iter().map(Into::into).collect();
    Ok(Json(MyAttemptsResponse { items }))
}
