//! Review service
//!
//! Admin-side operations over submissions: terminal review transitions,
//! bulk approval, and the security-review overlay.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    constants::submission_statuses,
    db::repositories::{CtfRepository, SubmissionRepository},
    error::{AppError, AppResult},
    models::{ReviewNote, Submission, SubmissionStatus},
    notify::{Notifier, ReviewEvent},
    storage::{self, EvidenceStore},
    utils::{crypto, validation},
};

/// Per-item outcome of a bulk review operation
pub struct BulkOutcome {
    pub id: Uuid,
    pub result: AppResult<Submission>,
}

/// Review service for admin business logic
pub struct ReviewService;

impl ReviewService {
    /// Approve a pending submission, awarding `override_points` or the
    /// CTF's configured reward.
    ///
    /// Idempotent: re-approving an approved submission returns the
    /// existing record without touching points or emitting another event.
    /// Approving a rejected submission is a lost race and reported as such.
    pub async fn approve(
        pool: &PgPool,
        notifier: &dyn Notifier,
        submission_id: &Uuid,
        reviewer_id: &Uuid,
        feedback: Option<&str>,
        override_points: Option<i32>,
    ) -> AppResult<Submission> {
        if let Some(points) = override_points {
            if points < 0 {
                return Err(AppError::Validation(
                    "Point override cannot be negative".to_string(),
                ));
            }
        }

        let submission = SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        let ctf = CtfRepository::find_by_id(pool, &submission.ctf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        let points = override_points.unwrap_or(ctf.points);

        let updated = SubmissionRepository::transition_from_pending(
            pool,
            submission_id,
            submission_statuses::APPROVED,
            reviewer_id,
            feedback,
            points,
        )
        .await?;

        match updated {
            Some(submission) => {
                notifier
                    .notify(ReviewEvent::SubmissionApproved {
                        submission_id: submission.id,
                        user_id: submission.user_id,
                        ctf_id: submission.ctf_id,
                        points: submission.points,
                    })
                    .await;
                Ok(submission)
            }
            None => Self::resolve_lost_transition(pool, submission_id, SubmissionStatus::Approved).await,
        }
    }

    /// Reject a pending submission. Feedback is mandatory; points stay 0
    /// and the consumed attempt slot is not refunded.
    pub async fn reject(
        pool: &PgPool,
        notifier: &dyn Notifier,
        submission_id: &Uuid,
        reviewer_id: &Uuid,
        feedback: &str,
    ) -> AppResult<Submission> {
        validation::validate_feedback(feedback)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let updated = SubmissionRepository::transition_from_pending(
            pool,
            submission_id,
            submission_statuses::REJECTED,
            reviewer_id,
            Some(feedback),
            0,
        )
        .await?;

        match updated {
            Some(submission) => {
                notifier
                    .notify(ReviewEvent::SubmissionRejected {
                        submission_id: submission.id,
                        user_id: submission.user_id,
                        ctf_id: submission.ctf_id,
                        feedback: feedback.to_string(),
                    })
                    .await;
                Ok(submission)
            }
            None => Self::resolve_lost_transition(pool, submission_id, SubmissionStatus::Rejected).await,
        }
    }

    /// Approve a batch of submissions, continuing past per-item failures.
    ///
    /// The items carry no cross-item invariant, so one bad id must not
    /// poison the rest of the batch.
    pub async fn bulk_approve(
        pool: &PgPool,
        notifier: &dyn Notifier,
        submission_ids: &[Uuid],
        reviewer_id: &Uuid,
        feedback: Option<&str>,
        override_points: Option<i32>,
    ) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(submission_ids.len());

        for id in submission_ids {
            let result =
                Self::approve(pool, notifier, id, reviewer_id, feedback, override_points).await;
            if let Err(e) = &result {
                tracing::warn!(submission_id = %id, error = %e, "Bulk approve item failed");
            }
            outcomes.push(BulkOutcome { id: *id, result });
        }

        outcomes
    }

    /// Flag a submission for security review.
    ///
    /// Purely additive metadata; works retroactively on approved and
    /// rejected submissions and never changes status or points.
    pub async fn mark_for_review(
        pool: &PgPool,
        submission_id: &Uuid,
        marker_id: &Uuid,
        reason: &str,
    ) -> AppResult<Submission> {
        validation::validate_review_note(reason)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        SubmissionRepository::mark_for_review(pool, submission_id, marker_id, reason)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// Clear the security-review flag; review notes are kept
    pub async fn unmark_review(pool: &PgPool, submission_id: &Uuid) -> AppResult<Submission> {
        SubmissionRepository::unmark_review(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// Append an immutable note to a submission's audit trail
    pub async fn add_review_note(
        pool: &PgPool,
        submission_id: &Uuid,
        author_id: &Uuid,
        note: &str,
    ) -> AppResult<ReviewNote> {
        validation::validate_review_note(note)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Ensure the submission exists so a typo'd id doesn't create an
        // orphaned note error deep in the foreign key.
        SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        SubmissionRepository::add_note(pool, submission_id, author_id, note).await
    }

    /// List a submission's review notes in insertion order
    pub async fn list_review_notes(
        pool: &PgPool,
        submission_id: &Uuid,
    ) -> AppResult<Vec<ReviewNote>> {
        SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        SubmissionRepository::list_notes(pool, submission_id).await
    }

    /// Everything a reviewer needs for one submission: the record, the
    /// flag-match hint, and the note trail
    pub async fn review_detail(
        pool: &PgPool,
        submission_id: &Uuid,
    ) -> AppResult<(Submission, Option<bool>, Vec<ReviewNote>)> {
        let submission = SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        let hint = Self::flag_hint(pool, &submission).await?;
        let notes = SubmissionRepository::list_notes(pool, submission_id).await?;

        Ok((submission, hint, notes))
    }

    /// Reviewer hint: whether the submitted flag matches the CTF's stored
    /// reference hash. None when the CTF carries no reference flag; the
    /// approve/reject decision stays with the human either way.
    pub async fn flag_hint(pool: &PgPool, submission: &Submission) -> AppResult<Option<bool>> {
        let ctf = CtfRepository::find_by_id(pool, &submission.ctf_id)
            .await?
            .ok_or_else(|| AppError::NotFound("CTF not found".to_string()))?;

        Ok(ctf
            .flag_hash
            .as_deref()
            .map(|hash| crypto::flag_matches(&submission.flag, hash)))
    }

    /// Fetch a submission's screenshot evidence bytes for the review screen
    pub async fn screenshot(
        pool: &PgPool,
        evidence: &dyn EvidenceStore,
        submission_id: &Uuid,
    ) -> AppResult<(Vec<u8>, &'static str)> {
        let submission = SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        let reference = submission
            .screenshot
            .ok_or_else(|| AppError::NotFound("Submission has no screenshot".to_string()))?;

        let blob = evidence.retrieve(&reference).await?;
        Ok((blob, storage::content_type_for(&reference)))
    }

    /// A conditional transition found no pending row. Re-read to decide
    /// between the idempotent no-op and a genuine lost race.
    async fn resolve_lost_transition(
        pool: &PgPool,
        submission_id: &Uuid,
        wanted: SubmissionStatus,
    ) -> AppResult<Submission> {
        let submission = SubmissionRepository::find_by_id(pool, submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        reconcile_terminal_state(submission, wanted)
    }
}

/// Decide the outcome of a terminal transition that found no pending row.
///
/// The submission already carries a decision: if it matches what the caller
/// wanted, the retry is an idempotent no-op returning the existing record
/// as-is. A different terminal state means another reviewer won the race.
fn reconcile_terminal_state(
    submission: Submission,
    wanted: SubmissionStatus,
) -> AppResult<Submission> {
    match submission.status() {
        Some(status) if status == wanted => Ok(submission),
        Some(status) => Err(AppError::ConcurrentModification(format!(
            "Submission is already {status}"
        ))),
        None => Err(AppError::Database(format!(
            "Unknown submission status: {}",
            submission.submission_status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reviewed_submission(status: &str, points: i32) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            ctf_id: Uuid::new_v4(),
            attempt_number: 1,
            flag: "flag{test}".to_string(),
            screenshot: None,
            submission_status: status.to_string(),
            points,
            submitted_at: Utc::now(),
            reviewed_at: Some(Utc::now()),
            reviewed_by: Some(Uuid::new_v4()),
            admin_feedback: None,
            marked_for_review: false,
            review_reason: None,
            marked_by: None,
            marked_at: None,
        }
    }

    #[test]
    fn test_re_approving_approved_submission_is_idempotent() {
        let submission = reviewed_submission("approved", 150);

        let resolved =
            reconcile_terminal_state(submission, SubmissionStatus::Approved).unwrap();

        // The existing record comes back untouched; points are awarded once.
        assert_eq!(resolved.submission_status, "approved");
        assert_eq!(resolved.points, 150);
    }

    #[test]
    fn test_re_rejecting_rejected_submission_is_idempotent() {
        let submission = reviewed_submission("rejected", 0);

        let resolved =
            reconcile_terminal_state(submission, SubmissionStatus::Rejected).unwrap();
        assert_eq!(resolved.points, 0);
    }

    #[test]
    fn test_crossing_terminal_states_is_a_conflict() {
        let approved = reviewed_submission("approved", 100);
        assert!(matches!(
            reconcile_terminal_state(approved, SubmissionStatus::Rejected),
            Err(AppError::ConcurrentModification(_))
        ));

        let rejected = reviewed_submission("rejected", 0);
        assert!(matches!(
            reconcile_terminal_state(rejected, SubmissionStatus::Approved),
            Err(AppError::ConcurrentModification(_))
        ));
    }

    #[test]
    fn test_unrecognized_status_surfaces_as_database_error() {
        let submission = reviewed_submission("escalated", 0);
        assert!(matches!(
            reconcile_terminal_state(submission, SubmissionStatus::Approved),
            Err(AppError::Database(_))
        ));
    }
}
