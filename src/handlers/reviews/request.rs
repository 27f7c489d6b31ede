//! Review request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::{MAX_FEEDBACK_LENGTH, MAX_REVIEW_NOTE_LENGTH};

/// Approve submission request
#[derive(Debug, Deserialize, Validate)]
pub struct ApproveRequest {
    #[validate(length(max = MAX_FEEDBACK_LENGTH))]
    pub feedback: Option<String>,

    /// Award these points instead of the CTF's configured reward
    pub points_override: Option<i32>,
}

/// Reject submission request (feedback is mandatory)
#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1, max = MAX_FEEDBACK_LENGTH))]
    pub feedback: String,
}

/// Bulk approve request
#[derive(Debug, Deserialize, Validate)]
pub struct BulkApproveRequest {
    #[validate(length(min = 1, max = 100))]
    pub submission_ids: Vec<Uuid>,

    #[validate(length(max = MAX_FEEDBACK_LENGTH))]
    pub feedback: Option<String>,

    pub points_override: Option<i32>,
}

/// Mark a submission for security review
#[derive(Debug, Deserialize, Validate)]
pub struct MarkForReviewRequest {
    #[validate(length(min = 1, max = MAX_REVIEW_NOTE_LENGTH))]
    pub reason: String,
}

/// Append a review note
#[derive(Debug, Deserialize, Validate)]
pub struct AddNoteRequest {
    #[validate(length(min = 1, max = MAX_REVIEW_NOTE_LENGTH))]
    pub note: String,
}

/// Pending queue query parameters
#[derive(Debug, Deserialize)]
pub struct PendingQueueQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub ctf_id: Option<Uuid>,
}
