//! Submission handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    services::SubmissionService,
    state::AppState,
};

use super::{
    request::{CreateSubmissionRequest, EditScreenshotRequest, ListSubmissionsQuery},
    response::{CreateSubmissionResponse, SubmissionResponse, SubmissionsListResponse},
};

/// Create a new submission attempt
pub async fn create_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<CreateSubmissionResponse>)> {
    payload.validate()?;

    let (submission, remaining) = SubmissionService::create_submission(
        state.db(),
        state.evidence(),
        &auth_user.id,
        payload,
        Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSubmissionResponse {
            id: submission.id,
            attempt_number: submission.attempt_number,
            remaining_attempts: remaining,
            status: submission.submission_status,
            message: "Submission received and awaiting review".to_string(),
        }),
    ))
}

/// List submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListSubmissionsQuery>,
) -> AppResult<Json<SubmissionsListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    // Students only ever see their own submissions
    let filter_user_id = if auth_user.is_admin() {
        query.user_id
    } else {
        Some(auth_user.id)
    };

    let (submissions, total) = SubmissionService::list_submissions(
        state.db(),
        page,
        per_page,
        filter_user_id.as_ref(),
        query.ctf_id.as_ref(),
        query.status.as_deref(),
        query.marked_for_review,
    )
    .await?;

    Ok(Json(SubmissionsListResponse {
        submissions,
        total,
        page,
        per_page,
    }))
}

/// Get a specific submission
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionResponse>> {
    let submission = SubmissionService::get_submission(state.db(), &id).await?;

    if submission.user_id != auth_user.id && !auth_user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view other users' submissions".to_string(),
        ));
    }

    Ok(Json(submission))
}

/// Replace the screenshot on a pending submission
pub async fn edit_screenshot(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditScreenshotRequest>,
) -> AppResult<Json<SubmissionResponse>> {
    payload.validate()?;

    let submission = SubmissionService::edit_screenshot(
        state.db(),
        state.evidence(),
        &auth_user.id,
        &id,
        payload,
        Utc::now(),
    )
    .await?;

    let response = SubmissionService::to_submission_response(state.db(), submission).await?;
    Ok(Json(response))
}
