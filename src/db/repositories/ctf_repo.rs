//! CTF repository

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::AppResult, models::Ctf};

/// Repository for CTF database operations
pub struct CtfRepository;

impl CtfRepository {
    /// Create a new CTF (always starts as an unpublished draft)
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: Option<&str>,
        category: &str,
        difficulty: &str,
        points: i32,
        max_attempts: i32,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        active_start_time: Option<&str>,
        active_end_time: Option<&str>,
        active_timezone: Option<&str>,
        require_screenshot: bool,
        allow_multiple_submissions: bool,
        ctf_link: Option<&str>,
        flag_hash: Option<&str>,
        created_by: &Uuid,
    ) -> AppResult<Ctf> {
        let ctf = sqlx::query_as::<_, Ctf>(
            r#"
            INSERT INTO ctfs (
                title, description, category, difficulty, points, max_attempts,
                start_date, end_date, active_start_time, active_end_time, active_timezone,
                require_screenshot, allow_multiple_submissions, ctf_link, flag_hash, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(difficulty)
        .bind(points)
        .bind(max_attempts)
        .bind(start_date)
        .bind(end_date)
        .bind(active_start_time)
        .bind(active_end_time)
        .bind(active_timezone)
        .bind(require_screenshot)
        .bind(allow_multiple_submissions)
        .bind(ctf_link)
        .bind(flag_hash)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(ctf)
    }

    /// Find CTF by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Ctf>> {
        let ctf = sqlx::query_as::<_, Ctf>(r#"SELECT * FROM ctfs WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ctf)
    }

    /// Find CTF by ID inside a transaction, taking the row lock.
    ///
    /// Submission creation holds this lock so the count-then-insert of
    /// attempt numbers serializes per CTF.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: &Uuid,
    ) -> AppResult<Option<Ctf>> {
        let ctf = sqlx::query_as::<_, Ctf>(r#"SELECT * FROM ctfs WHERE id = $1 FOR UPDATE"#)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(ctf)
    }

    /// Update CTF fields (None leaves a column unchanged)
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        id: &Uuid,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        difficulty: Option<&str>,
        points: Option<i32>,
        max_attempts: Option<i32>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        active_start_time: Option<&str>,
        active_end_time: Option<&str>,
        active_timezone: Option<&str>,
        require_screenshot: Option<bool>,
        allow_multiple_submissions: Option<bool>,
        ctf_link: Option<&str>,
        flag_hash: Option<&str>,
    ) -> AppResult<Ctf> {
        let ctf = sqlx::query_as::<_, Ctf>(
            r#"
            UPDATE ctfs
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                difficulty = COALESCE($5, difficulty),
                points = COALESCE($6, points),
                max_attempts = COALESCE($7, max_attempts),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date),
                active_start_time = COALESCE($10, active_start_time),
                active_end_time = COALESCE($11, active_end_time),
                active_timezone = COALESCE($12, active_timezone),
                require_screenshot = COALESCE($13, require_screenshot),
                allow_multiple_submissions = COALESCE($14, allow_multiple_submissions),
                ctf_link = COALESCE($15, ctf_link),
                flag_hash = COALESCE($16, flag_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(difficulty)
        .bind(points)
        .bind(max_attempts)
        .bind(start_date)
        .bind(end_date)
        .bind(active_start_time)
        .bind(active_end_time)
        .bind(active_timezone)
        .bind(require_screenshot)
        .bind(allow_multiple_submissions)
        .bind(ctf_link)
        .bind(flag_hash)
        .fetch_one(pool)
        .await?;

        Ok(ctf)
    }

    /// Toggle the publish flag
    pub async fn set_published(pool: &PgPool, id: &Uuid, published: bool) -> AppResult<Ctf> {
        let ctf = sqlx::query_as::<_, Ctf>(
            r#"UPDATE ctfs SET is_published = $2, updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(published)
        .fetch_one(pool)
        .await?;

        Ok(ctf)
    }

    /// Toggle the visibility flag (independent of publish state)
    pub async fn set_visible(pool: &PgPool, id: &Uuid, visible: bool) -> AppResult<Ctf> {
        let ctf = sqlx::query_as::<_, Ctf>(
            r#"UPDATE ctfs SET is_visible = $2, updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(visible)
        .fetch_one(pool)
        .await?;

        Ok(ctf)
    }

    /// List CTFs with pagination and filters
    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        category: Option<&str>,
        difficulty: Option<&str>,
        visible_only: bool,
        search: Option<&str>,
    ) -> AppResult<(Vec<Ctf>, i64)> {
        let search_pattern = search.map(|s| format!("%{}%", s));

        let ctfs = sqlx::query_as::<_, Ctf>(
            r#"
            SELECT * FROM ctfs
            WHERE
                ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR difficulty = $2)
                AND (NOT $3 OR (is_visible AND is_published))
                AND ($4::text IS NULL OR title ILIKE $4)
            ORDER BY start_date DESC, created_at DESC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(category)
        .bind(difficulty)
        .bind(visible_only)
        .bind(&search_pattern)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM ctfs
            WHERE
                ($1::text IS NULL OR category = $1)
                AND ($2::text IS NULL OR difficulty = $2)
                AND (NOT $3 OR (is_visible AND is_published))
                AND ($4::text IS NULL OR title ILIKE $4)
            "#,
        )
        .bind(category)
        .bind(difficulty)
        .bind(visible_only)
        .bind(&search_pattern)
        .fetch_one(pool)
        .await?;

        Ok((ctfs, count))
    }
}
