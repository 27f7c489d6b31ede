//! CTF response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Availability, Ctf};

/// Full CTF response (admin view)
#[derive(Debug, Serialize)]
pub struct CtfResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: String,
    pub points: i32,
    pub max_attempts: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub active_start_time: Option<String>,
    pub active_end_time: Option<String>,
    pub active_timezone: Option<String>,
    pub is_published: bool,
    pub is_visible: bool,
    pub require_screenshot: bool,
    pub allow_multiple_submissions: bool,
    pub ctf_link: Option<String>,
    pub has_reference_flag: bool,
    pub created_by: Uuid,
    /// Computed status: upcoming, active, ended, inactive
    pub status: String,
    pub currently_active: bool,
    /// Why the CTF is not currently active, when it isn't
    pub status_reason: Option<String>,
    pub submission_count: i64,
    pub solved_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CtfResponse {
    pub fn from_model(
        ctf: Ctf,
        availability: Availability,
        submission_count: i64,
        solved_count: i64,
    ) -> Self {
        Self {
            id: ctf.id,
            title: ctf.title,
            description: ctf.description,
            category: ctf.category,
            difficulty: ctf.difficulty,
            points: ctf.points,
            max_attempts: ctf.max_attempts,
            start_date: ctf.start_date,
            end_date: ctf.end_date,
            active_start_time: ctf.active_start_time,
            active_end_time: ctf.active_end_time,
            active_timezone: ctf.active_timezone,
            is_published: ctf.is_published,
            is_visible: ctf.is_visible,
            require_screenshot: ctf.require_screenshot,
            allow_multiple_submissions: ctf.allow_multiple_submissions,
            ctf_link: ctf.ctf_link,
            has_reference_flag: ctf.flag_hash.is_some(),
            created_by: ctf.created_by,
            status: availability.status.to_string(),
            currently_active: availability.currently_active,
            status_reason: availability.reason.map(|r| r.label().to_string()),
            submission_count,
            solved_count,
            created_at: ctf.created_at,
            updated_at: ctf.updated_at,
        }
    }
}

/// Student-facing CTF response.
///
/// The external link only appears while the CTF is currently active, and
/// publication switches are not echoed back.
#[derive(Debug, Serialize)]
pub struct StudentCtfResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub difficulty: String,
    pub points: i32,
    pub max_attempts: i32,
    pub remaining_attempts: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub active_start_time: Option<String>,
    pub active_end_time: Option<String>,
    pub active_timezone: Option<String>,
    pub require_screenshot: bool,
    pub allow_multiple_submissions: bool,
    pub ctf_link: Option<String>,
    pub status: String,
    pub currently_active: bool,
    pub status_reason: Option<String>,
}

impl StudentCtfResponse {
    pub fn from_model(ctf: Ctf, availability: Availability, remaining_attempts: i32) -> Self {
        let ctf_link = if availability.currently_active {
            ctf.ctf_link
        } else {
            None
        };

        Self {
            id: ctf.id,
            title: ctf.title,
            description: ctf.description,
            category: ctf.category,
            difficulty: ctf.difficulty,
            points: ctf.points,
            max_attempts: ctf.max_attempts,
            remaining_attempts,
            start_date: ctf.start_date,
            end_date: ctf.end_date,
            active_start_time: ctf.active_start_time,
            active_end_time: ctf.active_end_time,
            active_timezone: ctf.active_timezone,
            require_screenshot: ctf.require_screenshot,
            allow_multiple_submissions: ctf.allow_multiple_submissions,
            ctf_link,
            status: availability.status.to_string(),
            currently_active: availability.currently_active,
            status_reason: availability.reason.map(|r| r.label().to_string()),
        }
    }
}

/// CTF list response (admin view)
#[derive(Debug, Serialize)]
pub struct CtfsListResponse {
    pub ctfs: Vec<CtfResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// CTF list response (student view)
#[derive(Debug, Serialize)]
pub struct StudentCtfsListResponse {
    pub ctfs: Vec<StudentCtfResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Leaderboard entry
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub total_points: i64,
    pub solves: i64,
    pub last_solved_at: Option<DateTime<Utc>>,
}

/// Leaderboard response
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scheduled_ctf() -> Ctf {
        Ctf {
            id: Uuid::new_v4(),
            title: "Packet Archaeology".to_string(),
            description: None,
            category: "forensics".to_string(),
            difficulty: "medium".to_string(),
            points: 100,
            max_attempts: 3,
            start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap(),
            active_start_time: Some("09:00".to_string()),
            active_end_time: Some("18:00".to_string()),
            active_timezone: None,
            is_published: true,
            is_visible: true,
            require_screenshot: false,
            allow_multiple_submissions: false,
            ctf_link: Some("https://challenges.example.com/packets".to_string()),
            flag_hash: Some("deadbeef".to_string()),
            created_by: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_student_view_withholds_link_outside_active_hours() {
        let ctf = scheduled_ctf();
        // 20:00 is outside the 09:00-18:00 daily window
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0).unwrap();
        let availability = ctf.availability(now).unwrap();

        let view = StudentCtfResponse::from_model(ctf, availability, 3);

        assert!(!view.currently_active);
        assert_eq!(view.ctf_link, None);
        assert_eq!(view.status_reason.as_deref(), Some("inactive hours"));
    }

    #[test]
    fn test_student_view_carries_link_while_active() {
        let ctf = scheduled_ctf();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let availability = ctf.availability(now).unwrap();

        let view = StudentCtfResponse::from_model(ctf, availability, 2);

        assert!(view.currently_active);
        assert_eq!(
            view.ctf_link.as_deref(),
            Some("https://challenges.example.com/packets")
        );
        assert_eq!(view.remaining_attempts, 2);
    }

    #[test]
    fn test_student_view_omits_admin_switches() {
        // The student projection must not expose publication state or the
        // existence of a reference flag.
        let ctf = scheduled_ctf();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let availability = ctf.availability(now).unwrap();

        let view = StudentCtfResponse::from_model(ctf, availability, 3);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("is_published").is_none());
        assert!(json.get("is_visible").is_none());
        assert!(json.get("has_reference_flag").is_none());
        assert!(json.get("submission_count").is_none());
    }
}
