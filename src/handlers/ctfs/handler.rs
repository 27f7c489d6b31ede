//! CTF handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::{AppError, AppResult},
    middleware::auth::AuthenticatedUser,
    services::CtfService,
    state::AppState,
};

use super::{
    request::{
        CreateCtfRequest, LeaderboardQuery, ListCtfsQuery, PublishRequest, UpdateCtfRequest,
        VisibilityRequest,
    },
    response::{CtfsListResponse, LeaderboardResponse, StudentCtfsListResponse},
};

/// List CTFs.
///
/// Admins get the full records (optionally including hidden content);
/// students get the filtered view over visible published content only.
pub async fn list_ctfs(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListCtfsQuery>,
) -> AppResult<Response> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let now = Utc::now();

    if auth_user.is_admin() {
        let include_hidden = query.include_hidden.unwrap_or(false);

        let (ctfs, total) = CtfService::list_ctfs(
            state.db(),
            page,
            per_page,
            query.category.as_deref(),
            query.difficulty.as_deref(),
            !include_hidden,
            query.search.as_deref(),
            now,
        )
        .await?;

        Ok(Json(CtfsListResponse {
            ctfs,
            total,
            page,
            per_page,
        })
        .into_response())
    } else {
        let (ctfs, total) = CtfService::list_ctfs_for_student(
            state.db(),
            &auth_user.id,
            page,
            per_page,
            query.category.as_deref(),
            query.difficulty.as_deref(),
            query.search.as_deref(),
            now,
        )
        .await?;

        Ok(Json(StudentCtfsListResponse {
            ctfs,
            total,
            page,
            per_page,
        })
        .into_response())
    }
}

/// Create a new CTF
pub async fn create_ctf(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateCtfRequest>,
) -> AppResult<(StatusCode, Json<super::response::CtfResponse>)> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let ctf = CtfService::create_ctf(state.db(), &auth_user.id, payload, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(ctf)))
}

/// Get a specific CTF.
///
/// Admins get the full record; students get the filtered view with their
/// remaining attempts, and hidden or draft CTFs appear not to exist.
pub async fn get_ctf(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let now = Utc::now();

    if auth_user.is_admin() {
        let ctf = CtfService::get_ctf(state.db(), &id, now).await?;
        Ok(Json(ctf).into_response())
    } else {
        let ctf = CtfService::get_ctf_for_student(state.db(), &id, &auth_user.id, now).await?;
        Ok(Json(ctf).into_response())
    }
}

/// Update a CTF
pub async fn update_ctf(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCtfRequest>,
) -> AppResult<Json<super::response::CtfResponse>> {
    payload.validate()?;
    require_admin(&auth_user)?;

    let ctf = CtfService::update_ctf(state.db(), &id, payload, Utc::now()).await?;

    Ok(Json(ctf))
}

/// Publish or unpublish a CTF
pub async fn set_published(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishRequest>,
) -> AppResult<Json<super::response::CtfResponse>> {
    require_admin(&auth_user)?;

    let ctf = CtfService::set_published(state.db(), &id, payload.published, Utc::now()).await?;

    Ok(Json(ctf))
}

/// Show or hide a CTF
pub async fn set_visible(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VisibilityRequest>,
) -> AppResult<Json<super::response::CtfResponse>> {
    require_admin(&auth_user)?;

    let ctf = CtfService::set_visible(state.db(), &id, payload.visible, Utc::now()).await?;

    Ok(Json(ctf))
}

/// Platform-wide leaderboard over approved submissions
pub async fn global_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<LeaderboardResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).min(MAX_PAGE_SIZE);

    let leaderboard = CtfService::leaderboard(state.db(), None, page, per_page).await?;

    Ok(Json(leaderboard))
}

/// Leaderboard scoped to a single CTF
pub async fn ctf_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<LeaderboardResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).min(MAX_PAGE_SIZE);

    let leaderboard = CtfService::leaderboard(state.db(), Some(&id), page, per_page).await?;

    Ok(Json(leaderboard))
}

fn require_admin(auth_user: &AuthenticatedUser) -> AppResult<()> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can manage CTFs".to_string(),
        ));
    }
    Ok(())
}
