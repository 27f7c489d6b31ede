//! Submission request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::MAX_FLAG_LENGTH;

/// Create submission request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    /// CTF to submit against
    pub ctf_id: Uuid,

    /// Captured flag
    #[validate(length(min = 1, max = MAX_FLAG_LENGTH))]
    pub flag: String,

    /// Base64-encoded screenshot evidence (optional unless the CTF
    /// requires it)
    pub screenshot_base64: Option<String>,

    /// Screenshot MIME type, defaults to image/png
    pub screenshot_content_type: Option<String>,
}

/// Replace the screenshot on a pending submission
#[derive(Debug, Deserialize, Validate)]
pub struct EditScreenshotRequest {
    #[validate(length(min = 1))]
    pub screenshot_base64: String,

    pub screenshot_content_type: Option<String>,
}

/// List submissions query parameters
#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<Uuid>,
    pub ctf_id: Option<Uuid>,
    /// pending, approved, rejected
    pub status: Option<String>,
    pub marked_for_review: Option<bool>,
}
