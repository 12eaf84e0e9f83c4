use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::proctoring_dto::{LogViolationPayload, ViolationFeedResponse, ViolationResponse},
    error::Result,
    middleware::auth::{require_examiner, AuthUser},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/violations",
    request_body = LogViolationPayload,
    responses(
        (status = 201, description = "Violation recorded", body = ViolationResponse),
        (status = 403, description = "Attempt belongs to another candidate"),
        (status = 404, description = "Attempt not found")
    )
)]
#[axum::debug_handler]
pub async fn report_violation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<LogViolationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let violation = state
        .proctoring_service
        .log_violation(
            user.id,
            payload.attempt_id,
            &payload.violation_type,
            payload.details,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ViolationResponse::from(violation))))
}

#[axum::debug_handler]
pub async fn list_violations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    require_examiner(&user)?;
    let violations = state.proctoring_service.list_all().await?;
    let items = violations.into_iter().map(Into::into).collect();
    Ok(Json(ViolationFeedResponse { items }))
}
