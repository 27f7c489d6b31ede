//! Review response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{handlers::submissions::response::SubmissionResponse, models::ReviewNote};

/// Review note response
#[derive(Debug, Serialize)]
pub struct ReviewNoteResponse {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub note: String,
    pub added_by: Uuid,
    pub added_at: DateTime<Utc>,
}

impl From<ReviewNote> for ReviewNoteResponse {
    fn from(note: ReviewNote) -> Self {
        Self {
            id: note.id,
            submission_id: note.submission_id,
            note: note.note,
            added_by: note.added_by,
            added_at: note.added_at,
        }
    }
}

/// Full reviewer view of one submission
#[derive(Debug, Serialize)]
pub struct ReviewDetailResponse {
    pub submission: SubmissionResponse,
    /// Whether the submitted flag matches the stored reference hash;
    /// absent when the CTF has no reference flag
    pub flag_matches_reference: Option<bool>,
    pub notes: Vec<ReviewNoteResponse>,
}

/// Outcome of one item in a bulk operation
#[derive(Debug, Serialize)]
pub struct BulkItemResult {
    pub id: Uuid,
    pub success: bool,
    pub status: Option<String>,
    pub error_code: Option<String>,
    pub error: Option<String>,
}

/// Bulk approve response
#[derive(Debug, Serialize)]
pub struct BulkApproveResponse {
    pub results: Vec<BulkItemResult>,
    pub approved: usize,
    pub failed: usize,
}
