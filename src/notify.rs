//! Notification collaborator
//!
//! Review outcomes emit fire-and-forget events. Delivery (email, webhooks)
//! lives behind the `Notifier` trait so the review core stays testable
//! without a live mail service.

use async_trait::async_trait;
use uuid::Uuid;

/// A review outcome worth telling the submitter about
#[derive(Debug, Clone)]
pub enum ReviewEvent {
    SubmissionApproved {
        submission_id: Uuid,
        user_id: Uuid,
        ctf_id: Uuid,
        points: i32,
    },
    SubmissionRejected {
        submission_id: Uuid,
        user_id: Uuid,
        ctf_id: Uuid,
        feedback: String,
    },
}

/// Fire-and-forget event sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an event. Failures are the notifier's problem; the review
    /// transition has already committed and is never rolled back.
    async fn notify(&self, event: ReviewEvent);
}

/// Tracing-backed notifier, used until a real delivery subsystem is wired in
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: ReviewEvent) {
        match event {
            ReviewEvent::SubmissionApproved {
                submission_id,
                user_id,
                ctf_id,
                points,
            } => {
                tracing::info!(
                    submission_id = %submission_id,
                    user_id = %user_id,
                    ctf_id = %ctf_id,
                    points,
                    "Submission approved"
                );
            }
            ReviewEvent::SubmissionRejected {
                submission_id,
                user_id,
                ctf_id,
                feedback,
            } => {
                tracing::info!(
                    submission_id = %submission_id,
                    user_id = %user_id,
                    ctf_id = %ctf_id,
                    feedback = %feedback,
                    "Submission rejected"
                );
            }
        }
    }
}
