//! Submission service

use base64::Engine;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    constants::MAX_SCREENSHOT_SIZE,
    db::repositories::{CtfRepository, SubmissionRepository},
    error::{AppError, AppResult},
    handlers::submissions::{
        request::{CreateSubmissionRequest, EditScreenshotRequest},
        response::SubmissionResponse,
    },
    models::{check_new_attempt, Submission},
    storage::EvidenceStore,
    utils::validation,
};

/// Submission service for business logic
pub struct SubmissionService;

impl SubmissionService {
    /// Create a new submission attempt.
    ///
    /// The whole gate-and-insert runs in one transaction holding the CTF
    /// row lock, so two tabs submitting at once cannot share an attempt
    /// number or slip past the cap. Returns the created submission and the
    /// attempts the user has left.
    pub async fn create_submission(
        pool: &PgPool,
        evidence: &dyn EvidenceStore,
        user_id: &Uuid,
        payload: CreateSubmissionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<(Submission, i32)> {
        validation::validate_flag(&payload.flag)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut tx = pool.begin().await?;

        let ctf = CtfRepository::find_by_id_for_update(&mut tx, &payload.ctf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        let availability = ctf.availability(now)?;
        let history =
            SubmissionRepository::attempt_history(&mut tx, user_id, &payload.ctf_id).await?;

        let has_screenshot = payload.screenshot_base64.is_some();
        check_new_attempt(&ctf, &availability, history, has_screenshot)?;

        // Store evidence only after the gates pass; a rejected call must
        // not leave orphan blobs behind.
        let screenshot = match payload.screenshot_base64.as_deref() {
            Some(b64) => {
                let (blob, content_type) =
                    decode_screenshot(b64, payload.screenshot_content_type.as_deref())?;
                Some(evidence.store(&blob, &content_type).await?)
            }
            None => None,
        };

        let attempt_number = (history.attempt_count + 1) as i32;
        let submission = SubmissionRepository::insert_attempt(
            &mut tx,
            user_id,
            &payload.ctf_id,
            attempt_number,
            payload.flag.trim(),
            screenshot.as_deref(),
        )
        .await?;

        tx.commit().await?;

        let remaining = ctf.max_attempts - attempt_number;
        tracing::info!(
            submission_id = %submission.id,
            ctf_id = %ctf.id,
            user_id = %user_id,
            attempt_number,
            remaining,
            "Submission created"
        );

        Ok((submission, remaining))
    }

    /// Replace the screenshot on a still-pending submission.
    ///
    /// Allowed only to the owner, only while the submission is pending and
    /// the CTF is currently active. Clears stale admin feedback; attempt
    /// number and review timestamps are untouched.
    pub async fn edit_screenshot(
        pool: &PgPool,
        evidence: &dyn EvidenceStore,
        user_id: &Uuid,
        submission_id: &Uuid,
        payload: EditScreenshotRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Submission> {
        let submission = SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.user_id != *user_id {
            return Err(AppError::Forbidden(
                "Cannot edit other users' submissions".to_string(),
            ));
        }

        if !submission.is_pending() {
            return Err(AppError::EditNotAllowed(
                "Submission has already been reviewed".to_string(),
            ));
        }

        let ctf = CtfRepository::find_by_id(pool, &submission.ctf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        let availability = ctf.availability(now)?;
        if !availability.currently_active {
            return Err(AppError::EditNotAllowed(format!(
                "CTF is not currently active (status: {})",
                availability.status
            )));
        }

        let (blob, content_type) = decode_screenshot(
            &payload.screenshot_base64,
            payload.screenshot_content_type.as_deref(),
        )?;
        let reference = evidence.store(&blob, &content_type).await?;

        // Conditional update: if a reviewer decided in the meantime, the
        // guard fails and the edit is refused rather than clobbering.
        match SubmissionRepository::update_screenshot(pool, submission_id, &reference).await? {
            Some(updated) => Ok(updated),
            None => {
                // Lost the race against a reviewer; the blob just stored
                // will never be referenced, so clean it up.
                if let Err(e) = evidence.remove(&reference).await {
                    tracing::warn!(
                        submission_id = %submission_id,
                        reference = %reference,
                        error = %e,
                        "Failed to remove unreferenced screenshot"
                    );
                }
                Err(AppError::EditNotAllowed(
                    "Submission has already been reviewed".to_string(),
                ))
            }
        }
    }

    /// Get submission by ID
    pub async fn get_submission(pool: &PgPool, id: &Uuid) -> AppResult<SubmissionResponse> {
        let submission = SubmissionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        Self::to_submission_response(pool, submission).await
    }

    /// List submissions
    #[allow(clippy::too_many_arguments)]
    pub async fn list_submissions(
        pool: &PgPool,
        page: u32,
        per_page: u32,
        user_id: Option<&Uuid>,
        ctf_id: Option<&Uuid>,
        status: Option<&str>,
        marked_for_review: Option<bool>,
    ) -> AppResult<(Vec<SubmissionResponse>, i64)> {
        if let Some(status) = status {
            if crate::models::SubmissionStatus::from_str(status).is_none() {
                return Err(AppError::Validation(format!(
                    "Unknown submission status: {status}"
                )));
            }
        }

        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        let (submissions, total) = SubmissionRepository::list(
            pool,
            offset,
            limit,
            user_id,
            ctf_id,
            status,
            marked_for_review,
        )
        .await?;

        let responses: Vec<SubmissionResponse> = futures::future::try_join_all(
            submissions
                .into_iter()
                .map(|s| Self::to_submission_response(pool, s)),
        )
        .await?;

        Ok((responses, total))
    }

    /// Join the CTF title onto a submission row for API responses
    pub async fn to_submission_response(
        pool: &PgPool,
        submission: Submission,
    ) -> AppResult<SubmissionResponse> {
        let ctf_title: Option<String> =
            sqlx::query_scalar(r#"SELECT title FROM ctfs WHERE id = $1"#)
                .bind(submission.ctf_id)
                .fetch_optional(pool)
                .await?;

        Ok(SubmissionResponse::from_model(
            submission,
            ctf_title.unwrap_or_default(),
        ))
    }
}

/// Decode a base64 screenshot payload, enforcing the size cap
fn decode_screenshot(b64: &str, content_type: Option<&str>) -> AppResult<(Vec<u8>, String)> {
    let blob = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| AppError::Validation(format!("Invalid base64 for screenshot: {e}")))?;

    if blob.is_empty() {
        return Err(AppError::Validation("Screenshot is empty".to_string()));
    }
    if blob.len() > MAX_SCREENSHOT_SIZE {
        return Err(AppError::Validation(format!(
            "Screenshot exceeds maximum size of {} bytes",
            MAX_SCREENSHOT_SIZE
        )));
    }

    Ok((blob, content_type.unwrap_or("image/png").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_screenshot_rejects_bad_base64() {
        assert!(matches!(
            decode_screenshot("not base64!!!", None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_screenshot_defaults_to_png() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(b"imagebytes");
        let (blob, content_type) = decode_screenshot(&b64, None).unwrap();
        assert_eq!(blob, b"imagebytes");
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn test_decode_screenshot_rejects_empty() {
        assert!(decode_screenshot("", None).is_err());
    }
}
