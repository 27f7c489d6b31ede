//! Submission response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Submission;

/// Submission response
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ctf_id: Uuid,
    pub ctf_title: String,
    pub attempt_number: i32,
    pub flag: String,
    pub screenshot: Option<String>,
    pub status: String,
    pub points: i32,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub admin_feedback: Option<String>,
    pub marked_for_review: bool,
    pub review_reason: Option<String>,
    pub marked_by: Option<Uuid>,
    pub marked_at: Option<DateTime<Utc>>,
}

impl SubmissionResponse {
    pub fn from_model(submission: Submission, ctf_title: String) -> Self {
        Self {
            id: submission.id,
            user_id: submission.user_id,
            ctf_id: submission.ctf_id,
            ctf_title,
            attempt_number: submission.attempt_number,
            flag: submission.flag,
            screenshot: submission.screenshot,
            status: submission.submission_status,
            points: submission.points,
            submitted_at: submission.submitted_at,
            reviewed_at: submission.reviewed_at,
            reviewed_by: submission.reviewed_by,
            admin_feedback: submission.admin_feedback,
            marked_for_review: submission.marked_for_review,
            review_reason: submission.review_reason,
            marked_by: submission.marked_by,
            marked_at: submission.marked_at,
        }
    }
}

/// Submission list response
#[derive(Debug, Serialize)]
pub struct SubmissionsListResponse {
    pub submissions: Vec<SubmissionResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Create submission response
#[derive(Debug, Serialize)]
pub struct CreateSubmissionResponse {
    pub id: Uuid,
    pub attempt_number: i32,
    pub remaining_attempts: i32,
    pub status: String,
    pub message: String,
}
