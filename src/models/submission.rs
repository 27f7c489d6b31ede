//! Submission model and lifecycle rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ctf::{Availability, Ctf};

/// Submission database model
///
/// One attempt by one user against one CTF. Rows are never deleted; review
/// outcomes and the security-review overlay only mark them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ctf_id: Uuid,
    pub attempt_number: i32,
    pub flag: String,
    pub screenshot: Option<String>,
    pub submission_status: String,
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

impl Submission {
    pub fn status(&self) -> Option<SubmissionStatus> {
        SubmissionStatus::from_str(&self.submission_status)
    }

    pub fn is_pending(&self) -> bool {
        self.submission_status == SubmissionStatus::Pending.as_str()
    }
}

/// Submission review status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Check if this is a terminal status (review complete)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable audit note attached to a submission's security review
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReviewNote {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub note: String,
    pub added_by: Uuid,
    pub added_at: DateTime<Utc>,
}

/// Prior history of a (user, CTF) pair, gathered inside the creation
/// transaction while the CTF row lock is held.
#[derive(Debug, Clone, Copy)]
pub struct AttemptHistory {
    /// Count of existing submissions, regardless of status
    pub attempt_count: i64,
    /// Whether any existing submission is approved
    pub has_approved: bool,
}

/// Gate a new submission attempt.
///
/// Check order is significant: a solved CTF reports `AlreadySolved` even
/// when the attempt cap is also exhausted, and the availability gate comes
/// before either. Rejected attempts are not refunded; they count against
/// the cap like any other.
pub fn check_new_attempt(
    ctf: &Ctf,
    availability: &Availability,
    history: AttemptHistory,
    has_screenshot: bool,
) -> AppResult<()> {
    if !availability.currently_active {
        return Err(AppError::CtfNotActive {
            status: availability.status.to_string(),
        });
    }

    if history.has_approved && !ctf.allow_multiple_submissions {
        return Err(AppError::AlreadySolved);
    }

    if history.attempt_count >= ctf.max_attempts as i64 {
        return Err(AppError::AttemptsExhausted {
            max_attempts: ctf.max_attempts,
        });
    }

    if ctf.require_screenshot && !has_screenshot {
        return Err(AppError::ScreenshotRequired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ctf::CtfStatus;
    use chrono::TimeZone;

    fn test_ctf(max_attempts: i32) -> Ctf {
        Ctf {
            id: Uuid::new_v4(),
            title: "Buffer overflow basics".to_string(),
            description: None,
            category: "pwn".to_string(),
            difficulty: "medium".to_string(),
            points: 100,
            max_attempts,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            active_start_time: None,
            active_end_time: None,
            active_timezone: None,
            is_published: true,
            is_visible: true,
            require_screenshot: false,
            allow_multiple_submissions: false,
            ctf_link: None,
            flag_hash: None,
            created_by: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn active(ctf: &Ctf) -> Availability {
        ctf.availability(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap())
            .unwrap()
    }

    fn history(attempt_count: i64, has_approved: bool) -> AttemptHistory {
        AttemptHistory {
            attempt_count,
            has_approved,
        }
    }

    #[test]
    fn test_inactive_ctf_rejects_creation() {
        let mut ctf = test_ctf(3);
        ctf.active_start_time = Some("09:00".to_string());
        ctf.active_end_time = Some("18:00".to_string());
        let avail = ctf
            .availability(Utc.with_ymd_and_hms(2025, 6, 15, 20, 0, 0).unwrap())
            .unwrap();
        assert_eq!(avail.status, CtfStatus::Inactive);

        let err = check_new_attempt(&ctf, &avail, history(0, false), false).unwrap_err();
        assert!(matches!(err, AppError::CtfNotActive { status } if status == "inactive"));
    }

    #[test]
    fn test_attempt_cap_enforced() {
        let ctf = test_ctf(3);
        let avail = active(&ctf);

        assert!(check_new_attempt(&ctf, &avail, history(2, false), false).is_ok());

        let err = check_new_attempt(&ctf, &avail, history(3, false), false).unwrap_err();
        assert!(matches!(err, AppError::AttemptsExhausted { max_attempts: 3 }));
    }

    #[test]
    fn test_already_solved_takes_precedence_over_exhausted_cap() {
        // max_attempts = 1 and one approved attempt: both gates would fire,
        // the caller must see AlreadySolved
        let ctf = test_ctf(1);
        let avail = active(&ctf);

        let err = check_new_attempt(&ctf, &avail, history(1, true), false).unwrap_err();
        assert!(matches!(err, AppError::AlreadySolved));
    }

    #[test]
    fn test_multiple_submissions_policy_allows_resubmit_after_solve() {
        let mut ctf = test_ctf(5);
        ctf.allow_multiple_submissions = true;
        let avail = active(&ctf);

        assert!(check_new_attempt(&ctf, &avail, history(1, true), false).is_ok());
        // The cap still binds even when multiples are allowed
        let err = check_new_attempt(&ctf, &avail, history(5, true), false).unwrap_err();
        assert!(matches!(err, AppError::AttemptsExhausted { .. }));
    }

    #[test]
    fn test_screenshot_requirement() {
        let mut ctf = test_ctf(3);
        ctf.require_screenshot = true;
        let avail = active(&ctf);

        let err = check_new_attempt(&ctf, &avail, history(0, false), false).unwrap_err();
        assert!(matches!(err, AppError::ScreenshotRequired));

        assert!(check_new_attempt(&ctf, &avail, history(0, false), true).is_ok());
    }

    #[test]
    fn test_rejected_attempts_still_consume_the_cap() {
        // Two rejected attempts out of three used: one left
        let ctf = test_ctf(3);
        let avail = active(&ctf);
        assert!(check_new_attempt(&ctf, &avail, history(2, false), false).is_ok());
        assert!(check_new_attempt(&ctf, &avail, history(3, false), false).is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "approved", "rejected"] {
            assert_eq!(SubmissionStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(SubmissionStatus::from_str("escalated").is_none());
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Rejected.is_terminal());
    }
}
