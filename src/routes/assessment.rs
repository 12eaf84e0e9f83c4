use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::assessment_dto::{
        AssessmentAttemptsResponse, AssessmentDetailResponse, AssessmentListResponse,
        AssessmentResponse, CandidateAssessmentDetail, CandidateAssessmentListResponse,
        CreateAssessmentPayload, UpdateAssessmentStatusPayload,
    },
    error::Result,
    middleware::auth::{require_examiner, AuthUser, Role},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/assessments",
    request_body = CreateAssessmentPayload,
    responses(
        (status = 201, description = "Assessment created with its questions", body = AssessmentDetailResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an examiner")
    )
)]
#[axum::debug_handler]
pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAssessmentPayload>,
) -> Result<impl IntoResponse> {
    require_examiner(&user)?;
    payload.validate()?;
    let (assessment, questions) = state.assessment_service.create(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AssessmentDetailResponse::from((assessment, questions))),
    ))
}

/// Examiners see their own assessments, candidates the published catalogue.
#[axum::debug_handler]
pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    match user.role {
        Role::Examiner => {
            let items = state.assessment_service.list_for_examiner(user.id).await?;
            let items = items.into_iter().map(AssessmentResponse::from).collect();
            Ok(Json(AssessmentListResponse { items }).into_response())
        }
        Role::Candidate => {
            let items = state.assessment_service.list_published().await?;
            let items = items.into_iter().map(Into::into).collect();
            Ok(Json(CandidateAssessmentListResponse { items }).into_response())
        }
    }
}

/// Candidates get the sanitized view; correct answers only ever show up in
/// the examiner's.
#[axum::debug_handler]
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    match user.role {
        Role::Examiner => {
            let detail = state.assessment_service.get_for_examiner(user.id, id).await?;
            Ok(Json(AssessmentDetailResponse::from(detail)).into_response())
        }
        Role::Candidate => {
            let detail = state.assessment_service.get_for_candidate(id).await?;
            Ok(Json(CandidateAssessmentDetail::from(detail)).into_response())
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/assessments/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Assessment ID")
    ),
    request_body = UpdateAssessmentStatusPayload,
    responses(
        (status = 200, description = "Availability toggled", body = AssessmentResponse),
        (status = 403, description = "Not the owning examiner"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_assessment_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssessmentStatusPayload>,
) -> Result<impl IntoResponse> {
    require_examiner(&user)?;
    let assessment = state
        .assessment_service
        .set_active(user.id, id, payload.is_active)
        .await?;
    Ok(Json(AssessmentResponse::from(assessment)))
}

#[axum::debug_handler]
pub async fn delete_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_examiner(&user)?;
    state.assessment_service.soft_delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_assessment_attempts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_examiner(&user)?;
    let attempts = state
        .assessment_service
        .attempts_for_assessment(user.id, id)
        .await?;
    let items = attempts.into_iter().map(Into::into).collect();
    Ok(Json(AssessmentAttemptsResponse { items }))
}
