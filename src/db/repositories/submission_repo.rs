//! Submission repository

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    constants::submission_statuses,
    error::AppResult,
    models::{AttemptHistory, ReviewNote, Submission},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Gather the attempt history of a (user, CTF) pair.
    ///
    /// Runs inside the creation transaction, after the CTF row lock is
    /// taken, so the returned counts cannot go stale before the insert.
    pub async fn attempt_history(
        conn: &mut PgConnection,
        user_id: &Uuid,
        ctf_id: &Uuid,
    ) -> AppResult<AttemptHistory> {
        #[derive(sqlx::FromRow)]
        struct HistoryRow {
            attempt_count: i64,
            has_approved: bool,
        }

        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                COUNT(*) AS attempt_count,
                COUNT(*) FILTER (WHERE submission_status = 'approved') > 0 AS has_approved
            FROM submissions
            WHERE user_id = $1 AND ctf_id = $2
            "#,
        )
        .bind(user_id)
        .bind(ctf_id)
        .fetch_one(conn)
        .await?;

        Ok(AttemptHistory {
            attempt_count: row.attempt_count,
            has_approved: row.has_approved,
        })
    }

    /// Insert a new pending attempt with the next contiguous attempt number
    pub async fn insert_attempt(
        conn: &mut PgConnection,
        user_id: &Uuid,
        ctf_id: &Uuid,
        attempt_number: i32,
        flag: &str,
        screenshot: Option<&str>,
    ) -> AppResult<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (user_id, ctf_id, attempt_number, flag, screenshot, submission_status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(ctf_id)
        .bind(attempt_number)
        .bind(flag)
        .bind(screenshot)
        .fetch_one(conn)
        .await?;

        Ok(submission)
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(submission)
    }

    /// Replace the screenshot reference on a still-pending submission.
    ///
    /// Clears any admin feedback tied to the old evidence. Returns None if
    /// the submission is no longer pending (the conditional guard lost).
    pub async fn update_screenshot(
        pool: &PgPool,
        id: &Uuid,
        screenshot: &str,
    ) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET screenshot = $2, admin_feedback = NULL
            WHERE id = $1 AND submission_status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(screenshot)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Transition a pending submission to a terminal status.
    ///
    /// The `submission_status = 'pending'` guard makes concurrent reviews
    /// race safely: exactly one writer wins, the loser gets None and must
    /// re-read the row to take the idempotent or conflict path.
    pub async fn transition_from_pending(
        pool: &PgPool,
        id: &Uuid,
        to_status: &str,
        reviewer_id: &Uuid,
        feedback: Option<&str>,
        points: i32,
    ) -> AppResult<Option<Submission>> {
        debug_assert!(submission_statuses::ALL.contains(&to_status));

        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET
                submission_status = $2,
                points = $3,
                reviewed_at = NOW(),
                reviewed_by = $4,
                admin_feedback = $5
            WHERE id = $1 AND submission_status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to_status)
        .bind(points)
        .bind(reviewer_id)
        .bind(feedback)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Set the security-review flag (any status, purely additive metadata)
    pub async fn mark_for_review(
        pool: &PgPool,
        id: &Uuid,
        marker_id: &Uuid,
        reason: &str,
    ) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET marked_for_review = TRUE, review_reason = $2, marked_by = $3, marked_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(marker_id)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Clear the security-review flag; status, points, and notes survive
    pub async fn unmark_review(pool: &PgPool, id: &Uuid) -> AppResult<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET marked_for_review = FALSE, review_reason = NULL, marked_by = NULL, marked_at = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Append an immutable review note
    pub async fn add_note(
        pool: &PgPool,
        submission_id: &Uuid,
        author_id: &Uuid,
        note: &str,
    ) -> AppResult<ReviewNote> {
        let note = sqlx::query_as::<_, ReviewNote>(
            r#"
            INSERT INTO review_notes (submission_id, note, added_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(submission_id)
        .bind(note)
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// List a submission's review notes in insertion order
    pub async fn list_notes(pool: &PgPool, submission_id: &Uuid) -> AppResult<Vec<ReviewNote>> {
        let notes = sqlx::query_as::<_, ReviewNote>(
            r#"SELECT * FROM review_notes WHERE submission_id = $1 ORDER BY added_at, id"#,
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// List submissions with pagination and filters
    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        user_id: Option<&Uuid>,
        ctf_id: Option<&Uuid>,
        status: Option<&str>,
        marked_for_review: Option<bool>,
    ) -> AppResult<(Vec<Submission>, i64)> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE
                ($1::uuid IS NULL OR user_id = $1)
                AND ($2::uuid IS NULL OR ctf_id = $2)
                AND ($3::text IS NULL OR submission_status = $3)
                AND ($4::bool IS NULL OR marked_for_review = $4)
            ORDER BY submitted_at DESC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(user_id)
        .bind(ctf_id)
        .bind(status)
        .bind(marked_for_review)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM submissions
            WHERE
                ($1::uuid IS NULL OR user_id = $1)
                AND ($2::uuid IS NULL OR ctf_id = $2)
                AND ($3::text IS NULL OR submission_status = $3)
                AND ($4::bool IS NULL OR marked_for_review = $4)
            "#,
        )
        .bind(user_id)
        .bind(ctf_id)
        .bind(status)
        .bind(marked_for_review)
        .fetch_one(pool)
        .await?;

        Ok((submissions, count))
    }

    /// Count a user's submissions against one CTF (read-only path, no lock)
    pub async fn count_attempts(pool: &PgPool, user_id: &Uuid, ctf_id: &Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM submissions WHERE user_id = $1 AND ctf_id = $2"#,
        )
        .bind(user_id)
        .bind(ctf_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
