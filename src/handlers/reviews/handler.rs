//! Review handler implementations

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{submission_statuses, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    services::{ReviewService, SubmissionService},
    state::AppState,
};

use super::{
    request::{
        AddNoteRequest, ApproveRequest, BulkApproveRequest, MarkForReviewRequest,
        PendingQueueQuery, RejectRequest,
    },
    response::{BulkApproveResponse, BulkItemResult, ReviewDetailResponse, ReviewNoteResponse},
};
use crate::handlers::submissions::response::{SubmissionResponse, SubmissionsListResponse};

/// Pending submissions awaiting a decision
pub async fn pending_queue(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<PendingQueueQuery>,
) -> AppResult<Json<SubmissionsListResponse>> {
    require_admin(&auth_user)?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let (submissions, total) = SubmissionService::list_submissions(
        state.db(),
        page,
        per_page,
        None,
        query.ctf_id.as_ref(),
        Some(submission_statuses::PENDING),
        None,
    )
    .await?;

    Ok(Json(SubmissionsListResponse {
        submissions,
        total,
        page,
        per_page,
    }))
}

/// Reviewer view of one submission
pub async fn review_detail(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReviewDetailResponse>> {
    require_admin(&auth_user)?;

    let (submission, hint, notes) = ReviewService::review_detail(state.db(), &id).await?;
    let submission = SubmissionService::to_submission_response(state.db(), submission).await?;

    Ok(Json(ReviewDetailResponse {
        submission,
        flag_matches_reference: hint,
        notes: notes.into_iter().map(ReviewNoteResponse::from).collect(),
    }))
}

/// Approve a submission
pub async fn approve_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Json<SubmissionResponse>> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let submission = ReviewService::approve(
        state.db(),
        state.notifier(),
        &id,
        &auth_user.id,
        payload.feedback.as_deref(),
        payload.points_override,
    )
    .await?;

    let response = SubmissionService::to_submission_response(state.db(), submission).await?;
    Ok(Json(response))
}

/// Reject a submission with mandatory feedback
pub async fn reject_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<SubmissionResponse>> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let submission = ReviewService::reject(
        state.db(),
        state.notifier(),
        &id,
        &auth_user.id,
        &payload.feedback,
    )
    .await?;

    let response = SubmissionService::to_submission_response(state.db(), submission).await?;
    Ok(Json(response))
}

/// Approve a batch of submissions, reporting a per-item outcome
pub async fn bulk_approve(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<BulkApproveRequest>,
) -> AppResult<Json<BulkApproveResponse>> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let outcomes = ReviewService::bulk_approve(
        state.db(),
        state.notifier(),
        &payload.submission_ids,
        &auth_user.id,
        payload.feedback.as_deref(),
        payload.points_override,
    )
    .await;

    let results: Vec<BulkItemResult> = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(submission) => BulkItemResult {
                id: outcome.id,
                success: true,
                status: Some(submission.submission_status),
                error_code: None,
                error: None,
            },
            Err(e) => BulkItemResult {
                id: outcome.id,
                success: false,
                status: None,
                error_code: Some(e.error_code().to_string()),
                error: Some(e.to_string()),
            },
        })
        .collect();

    let approved = results.iter().filter(|r| r.success).count();
    let failed = results.len() - approved;

    Ok(Json(BulkApproveResponse {
        results,
        approved,
        failed,
    }))
}

/// Flag a submission for security review
pub async fn mark_for_review(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkForReviewRequest>,
) -> AppResult<Json<SubmissionResponse>> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let submission =
        ReviewService::mark_for_review(state.db(), &id, &auth_user.id, &payload.reason).await?;

    let response = SubmissionService::to_submission_response(state.db(), submission).await?;
    Ok(Json(response))
}

/// Clear the security-review flag
pub async fn unmark_review(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionResponse>> {
    require_admin(&auth_user)?;

    let submission = ReviewService::unmark_review(state.db(), &id).await?;

    let response = SubmissionService::to_submission_response(state.db(), submission).await?;
    Ok(Json(response))
}

/// List a submission's review notes
pub async fn list_review_notes(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewNoteResponse>>> {
    require_admin(&auth_user)?;

    let notes = ReviewService::list_review_notes(state.db(), &id).await?;

    Ok(Json(notes.into_iter().map(ReviewNoteResponse::from).collect()))
}

/// Append a review note
pub async fn add_review_note(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNoteRequest>,
) -> AppResult<(StatusCode, Json<ReviewNoteResponse>)> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let note = ReviewService::add_review_note(state.db(), &id, &auth_user.id, &payload.note).await?;

    Ok((StatusCode::CREATED, Json(ReviewNoteResponse::from(note))))
}

/// Serve a submission's screenshot evidence
pub async fn submission_screenshot(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    require_admin(&auth_user)?;

    let (blob, content_type) =
        ReviewService::screenshot(state.db(), state.evidence(), &id).await?;

    Ok(([(header::CONTENT_TYPE, content_type)], blob).into_response())
}

fn require_admin(auth_user: &AuthenticatedUser) -> AppResult<()> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can review submissions".to_string(),
        ));
    }
    Ok(())
}
