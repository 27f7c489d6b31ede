//! CTF service

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::{CtfRepository, SubmissionRepository},
    error::{AppError, AppResult},
    handlers::ctfs::{
        request::{CreateCtfRequest, UpdateCtfRequest},
        response::{CtfResponse, LeaderboardEntry, LeaderboardResponse, StudentCtfResponse},
    },
    models::{parse_time_of_day, parse_timezone, Ctf},
    utils::{crypto, validation},
};

/// CTF service for business logic
pub struct CtfService;

impl CtfService {
    /// Create a new CTF (starts as a hidden draft)
    pub async fn create_ctf(
        pool: &PgPool,
        creator_id: &Uuid,
        payload: CreateCtfRequest,
        now: DateTime<Utc>,
    ) -> AppResult<CtfResponse> {
        let title = validation::validate_ctf_title(&payload.title)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validation::validate_category(&payload.category)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validation::validate_difficulty(&payload.difficulty)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if payload.points < 0 {
            return Err(AppError::Validation(
                "Points cannot be negative".to_string(),
            ));
        }
        if payload.max_attempts <= 0 {
            return Err(AppError::Validation(
                "Attempt limit must be positive".to_string(),
            ));
        }
        Self::validate_schedule(payload.start_date, payload.end_date)?;
        Self::validate_active_hours(
            payload.active_start_time.as_deref(),
            payload.active_end_time.as_deref(),
            payload.active_timezone.as_deref(),
        )?;
        if let Some(link) = payload.ctf_link.as_deref() {
            validation::validate_ctf_link(link)
                .map_err(|e| AppError::Validation(e.to_string()))?;
        }

        let flag_hash = payload.flag.as_deref().map(crypto::hash_flag);

        let ctf = CtfRepository::create(
            pool,
            &title,
            payload.description.as_deref(),
            &payload.category,
            &payload.difficulty,
            payload.points,
            payload.max_attempts,
            payload.start_date,
            payload.end_date,
            payload.active_start_time.as_deref(),
            payload.active_end_time.as_deref(),
            payload.active_timezone.as_deref(),
            payload.require_screenshot.unwrap_or(false),
            payload.allow_multiple_submissions.unwrap_or(false),
            payload.ctf_link.as_deref(),
            flag_hash.as_deref(),
            creator_id,
        )
        .await?;

        Self::to_ctf_response(pool, ctf, now).await
    }

    /// Get CTF by ID (admin view, availability computed at `now`)
    pub async fn get_ctf(pool: &PgPool, id: &Uuid, now: DateTime<Utc>) -> AppResult<CtfResponse> {
        let ctf = CtfRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        Self::to_ctf_response(pool, ctf, now).await
    }

    /// Get CTF by ID for a student.
    ///
    /// Hidden and draft CTFs do not exist for students. The external link
    /// is withheld unless the CTF is currently active; remaining attempts
    /// are computed for the calling user.
    pub async fn get_ctf_for_student(
        pool: &PgPool,
        id: &Uuid,
        user_id: &Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<StudentCtfResponse> {
        let ctf = CtfRepository::find_by_id(pool, id)
            .await?
            .filter(|c| c.is_visible && c.is_published)
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        let attempts = SubmissionRepository::count_attempts(pool, user_id, id).await?;
        let remaining = (ctf.max_attempts as i64 - attempts).max(0) as i32;

        let availability = ctf.availability(now)?;
        Ok(StudentCtfResponse::from_model(ctf, availability, remaining))
    }

    /// Update CTF fields; schedule and active-hours invariants are checked
    /// against the merged result so a partial update cannot corrupt them
    pub async fn update_ctf(
        pool: &PgPool,
        id: &Uuid,
        payload: UpdateCtfRequest,
        now: DateTime<Utc>,
    ) -> AppResult<CtfResponse> {
        let existing = CtfRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        let title = payload
            .title
            .as_deref()
            .map(|t| {
                validation::validate_ctf_title(t).map_err(|e| AppError::Validation(e.to_string()))
            })
            .transpose()?;
        if let Some(category) = payload.category.as_deref() {
            validation::validate_category(category)
                .map_err(|e| AppError::Validation(e.to_string()))?;
        }
        if let Some(difficulty) = payload.difficulty.as_deref() {
            validation::validate_difficulty(difficulty)
                .map_err(|e| AppError::Validation(e.to_string()))?;
        }
        if payload.points.is_some_and(|p| p < 0) {
            return Err(AppError::Validation(
                "Points cannot be negative".to_string(),
            ));
        }
        if payload.max_attempts.is_some_and(|m| m <= 0) {
            return Err(AppError::Validation(
                "Attempt limit must be positive".to_string(),
            ));
        }

        let effective_start = payload.start_date.unwrap_or(existing.start_date);
        let effective_end = payload.end_date.unwrap_or(existing.end_date);
        Self::validate_schedule(effective_start, effective_end)?;

        Self::validate_active_hours(
            payload
                .active_start_time
                .as_deref()
                .or(existing.active_start_time.as_deref()),
            payload
                .active_end_time
                .as_deref()
                .or(existing.active_end_time.as_deref()),
            payload
                .active_timezone
                .as_deref()
                .or(existing.active_timezone.as_deref()),
        )?;

        if let Some(link) = payload.ctf_link.as_deref() {
            validation::validate_ctf_link(link)
                .map_err(|e| AppError::Validation(e.to_string()))?;
        }

        let flag_hash = payload.flag.as_deref().map(crypto::hash_flag);

        let updated = CtfRepository::update(
            pool,
            id,
            title.as_deref(),
            payload.description.as_deref(),
            payload.category.as_deref(),
            payload.difficulty.as_deref(),
            payload.points,
            payload.max_attempts,
            payload.start_date,
            payload.end_date,
            payload.active_start_time.as_deref(),
            payload.active_end_time.as_deref(),
            payload.active_timezone.as_deref(),
            payload.require_screenshot,
            payload.allow_multiple_submissions,
            payload.ctf_link.as_deref(),
            flag_hash.as_deref(),
        )
        .await?;

        Self::to_ctf_response(pool, updated, now).await
    }

    /// Toggle publish state
    pub async fn set_published(
        pool: &PgPool,
        id: &Uuid,
        published: bool,
        now: DateTime<Utc>,
    ) -> AppResult<CtfResponse> {
        Self::ensure_exists(pool, id).await?;
        let ctf = CtfRepository::set_published(pool, id, published).await?;
        Self::to_ctf_response(pool, ctf, now).await
    }

    /// Toggle visibility independently of publish state
    pub async fn set_visible(
        pool: &PgPool,
        id: &Uuid,
        visible: bool,
        now: DateTime<Utc>,
    ) -> AppResult<CtfResponse> {
        Self::ensure_exists(pool, id).await?;
        let ctf = CtfRepository::set_visible(pool, id, visible).await?;
        Self::to_ctf_response(pool, ctf, now).await
    }

    /// List CTFs with the full admin projection
    #[allow(clippy::too_many_arguments)]
    pub async fn list_ctfs(
        pool: &PgPool,
        page: u32,
        per_page: u32,
        category: Option<&str>,
        difficulty: Option<&str>,
        visible_only: bool,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<(Vec<CtfResponse>, i64)> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        let (ctfs, total) = CtfRepository::list(
            pool, offset, limit, category, difficulty, visible_only, search,
        )
        .await?;

        let responses: Vec<CtfResponse> = futures::future::try_join_all(
            ctfs.into_iter().map(|c| Self::to_ctf_response(pool, c, now)),
        )
        .await?;

        Ok((responses, total))
    }

    /// List CTFs for a student: visible published content only, projected
    /// through the student view so links stay withheld outside active hours
    /// and publication switches are not echoed back
    #[allow(clippy::too_many_arguments)]
    pub async fn list_ctfs_for_student(
        pool: &PgPool,
        user_id: &Uuid,
        page: u32,
        per_page: u32,
        category: Option<&str>,
        difficulty: Option<&str>,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<(Vec<StudentCtfResponse>, i64)> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        let (ctfs, total) =
            CtfRepository::list(pool, offset, limit, category, difficulty, true, search).await?;

        let responses: Vec<StudentCtfResponse> =
            futures::future::try_join_all(ctfs.into_iter().map(|ctf| async move {
                let attempts =
                    SubmissionRepository::count_attempts(pool, user_id, &ctf.id).await?;
                let remaining = (ctf.max_attempts as i64 - attempts).max(0) as i32;
                let availability = ctf.availability(now)?;
                Ok::<_, AppError>(StudentCtfResponse::from_model(ctf, availability, remaining))
            }))
            .await?;

        Ok((responses, total))
    }

    /// Leaderboard: sum of approved points per user, optionally scoped to
    /// one CTF. Each approval is an independent scoring event; the
    /// exactly-once-per-solve property is enforced at review time.
    pub async fn leaderboard(
        pool: &PgPool,
        ctf_id: Option<&Uuid>,
        page: u32,
        per_page: u32,
    ) -> AppResult<LeaderboardResponse> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                user_id,
                SUM(points)::bigint AS total_points,
                COUNT(*) AS solves,
                MAX(reviewed_at) AS last_solved_at
            FROM submissions
            WHERE submission_status = 'approved'
                AND ($1::uuid IS NULL OR ctf_id = $1)
            GROUP BY user_id
            ORDER BY total_points DESC, last_solved_at ASC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(ctf_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT user_id) FROM submissions
            WHERE submission_status = 'approved'
                AND ($1::uuid IS NULL OR ctf_id = $1)
            "#,
        )
        .bind(ctf_id)
        .fetch_one(pool)
        .await?;

        Ok(LeaderboardResponse {
            entries,
            total,
            page,
            per_page,
            generated_at: Utc::now(),
        })
    }

    fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
        if end < start {
            return Err(AppError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }
        Ok(())
    }

    /// Reject malformed daily-window config at write time so the read
    /// path never has to choose a fallback for it
    fn validate_active_hours(
        start: Option<&str>,
        end: Option<&str>,
        timezone: Option<&str>,
    ) -> AppResult<()> {
        for bound in [start, end].into_iter().flatten() {
            if !bound.is_empty() {
                parse_time_of_day(bound)?;
            }
        }
        if let Some(tz) = timezone {
            if !tz.is_empty() {
                parse_timezone(tz)?;
            }
        }
        Ok(())
    }

    async fn ensure_exists(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        CtfRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;
        Ok(())
    }

    // Helper function
    async fn to_ctf_response(pool: &PgPool, ctf: Ctf, now: DateTime<Utc>) -> AppResult<CtfResponse> {
        let submission_count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM submissions WHERE ctf_id = $1"#)
                .bind(ctf.id)
                .fetch_one(pool)
                .await?;

        let solved_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT user_id) FROM submissions
            WHERE ctf_id = $1 AND submission_status = 'approved'
            "#,
        )
        .bind(ctf.id)
        .fetch_one(pool)
        .await?;

        let availability = ctf.availability(now)?;

        Ok(CtfResponse::from_model(
            ctf,
            availability,
            submission_count,
            solved_count,
        ))
    }
}
