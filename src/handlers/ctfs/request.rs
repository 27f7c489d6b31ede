//! CTF request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_CTF_DESCRIPTION_LENGTH, MAX_CTF_TITLE_LENGTH};

/// Create CTF request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCtfRequest {
    #[validate(length(min = 1, max = MAX_CTF_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(max = MAX_CTF_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    /// Challenge category: web, crypto, pwn, reversing, forensics, osint, misc
    pub category: String,

    /// Difficulty tier: beginner, easy, medium, hard, insane
    pub difficulty: String,

    /// Points awarded on approval
    pub points: i32,

    /// Attempt cap per user
    pub max_attempts: i32,

    /// Calendar window start
    pub start_date: DateTime<Utc>,

    /// Calendar window end
    pub end_date: DateTime<Utc>,

    /// Daily active window start, HH:MM 24h (optional)
    pub active_start_time: Option<String>,

    /// Daily active window end, HH:MM 24h (optional)
    pub active_end_time: Option<String>,

    /// IANA timezone for the daily window (optional)
    pub active_timezone: Option<String>,

    /// Require screenshot evidence with every submission
    pub require_screenshot: Option<bool>,

    /// Allow further submissions after an approved solve
    pub allow_multiple_submissions: Option<bool>,

    /// External challenge link
    pub ctf_link: Option<String>,

    /// Reference flag; only its hash is stored
    pub flag: Option<String>,
}

/// Update CTF request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCtfRequest {
    #[validate(length(min = 1, max = MAX_CTF_TITLE_LENGTH))]
    pub title: Option<String>,

    #[validate(length(max = MAX_CTF_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub points: Option<i32>,
    pub max_attempts: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Empty string clears the bound
    pub active_start_time: Option<String>,
    pub active_end_time: Option<String>,
    pub active_timezone: Option<String>,
    pub require_screenshot: Option<bool>,
    pub allow_multiple_submissions: Option<bool>,
    pub ctf_link: Option<String>,
    pub flag: Option<String>,
}

/// List CTFs query parameters
#[derive(Debug, Deserialize)]
pub struct ListCtfsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    /// Admin-only: include hidden and draft CTFs
    pub include_hidden: Option<bool>,
    pub search: Option<String>,
}

/// Publish switch request
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

/// Visibility switch request
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Leaderboard query parameters
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
