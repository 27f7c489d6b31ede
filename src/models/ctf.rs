//! CTF model and availability computation

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// CTF database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Ctf {
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
    #[serde(skip_serializing)]
    pub flag_hash: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ctf {
    /// Compute the canonical availability of this CTF at `now`.
    ///
    /// Evaluation order (each step short-circuits):
    /// 1. hidden or draft content is never active, regardless of time
    /// 2. the calendar window yields `upcoming` / `ended`
    /// 3. no daily window configured means always active within the calendar
    /// 4. the daily active-hours window, inclusive on both boundaries,
    ///    wrapping past midnight when end < start
    ///
    /// Status is never persisted; callers recompute from `now` on demand.
    pub fn availability(&self, now: DateTime<Utc>) -> AppResult<Availability> {
        if !self.is_visible {
            return Ok(Availability::inactive(AvailabilityReason::Hidden));
        }
        if !self.is_published {
            return Ok(Availability::inactive(AvailabilityReason::Draft));
        }

        if now < self.start_date {
            return Ok(Availability {
                status: CtfStatus::Upcoming,
                currently_active: false,
                reason: Some(AvailabilityReason::BeforeStart),
            });
        }
        if now > self.end_date {
            return Ok(Availability {
                status: CtfStatus::Ended,
                currently_active: false,
                reason: Some(AvailabilityReason::AfterEnd),
            });
        }

        match self.active_hours()? {
            None => Ok(Availability::active()),
            Some(hours) if hours.contains(now) => Ok(Availability::active()),
            Some(_) => Ok(Availability::inactive(AvailabilityReason::OutsideActiveHours)),
        }
    }

    /// Parse the configured daily window, if any.
    ///
    /// Absent or empty bounds mean no daily restriction. Malformed time
    /// strings or an unknown timezone fail closed with a validation error;
    /// write paths run the same parse so bad config never persists.
    pub fn active_hours(&self) -> AppResult<Option<ActiveHours>> {
        let (start, end) = match (
            self.active_start_time.as_deref(),
            self.active_end_time.as_deref(),
        ) {
            (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => (s, e),
            _ => return Ok(None),
        };

        let tz = self
            .active_timezone
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_timezone)
            .transpose()?;

        Ok(Some(ActiveHours {
            start_minutes: minutes_since_midnight(parse_time_of_day(start)?),
            end_minutes: minutes_since_midnight(parse_time_of_day(end)?),
            timezone: tz,
        }))
    }
}

/// A daily recurring wall-clock window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHours {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub timezone: Option<Tz>,
}

impl ActiveHours {
    /// Check whether `now` falls within the window, boundaries inclusive.
    ///
    /// `end < start` means the window spans midnight. Without a configured
    /// timezone the comparison uses the wall clock of `now` as given.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let time = match self.timezone {
            Some(tz) => now.with_timezone(&tz).time(),
            None => now.time(),
        };
        let current = minutes_since_midnight(time);

        if self.end_minutes < self.start_minutes {
            current >= self.start_minutes || current <= self.end_minutes
        } else {
            current >= self.start_minutes && current <= self.end_minutes
        }
    }
}

/// Parse a `HH:MM` 24-hour time string
pub fn parse_time_of_day(s: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time of day (expected HH:MM): {s}")))
}

/// Parse an IANA timezone name
pub fn parse_timezone(s: &str) -> AppResult<Tz> {
    s.parse::<Tz>()
        .map_err(|_| AppError::Validation(format!("Unknown timezone: {s}")))
}

fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Computed CTF status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtfStatus {
    Upcoming,
    Active,
    Ended,
    Inactive,
}

impl std::fmt::Display for CtfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Why a CTF is not currently active (display label only; all inactive
/// causes gate identically)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    Hidden,
    Draft,
    BeforeStart,
    AfterEnd,
    OutsideActiveHours,
}

impl AvailabilityReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Draft => "draft",
            Self::BeforeStart => "not started",
            Self::AfterEnd => "ended",
            Self::OutsideActiveHours => "inactive hours",
        }
    }
}

/// Result of an availability computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub status: CtfStatus,
    pub currently_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<AvailabilityReason>,
}

impl Availability {
    fn active() -> Self {
        Self {
            status: CtfStatus::Active,
            currently_active: true,
            reason: None,
        }
    }

    fn inactive(reason: AvailabilityReason) -> Self {
        Self {
            status: CtfStatus::Inactive,
            currently_active: false,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_ctf() -> Ctf {
        Ctf {
            id: Uuid::new_v4(),
            title: "SQL injection 101".to_string(),
            description: None,
            category: "web".to_string(),
            difficulty: "easy".to_string(),
            points: 100,
            max_attempts: 3,
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

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_hidden_or_draft_is_always_inactive() {
        let mut ctf = base_ctf();
        ctf.is_visible = false;
        let avail = ctf.availability(at(12, 0)).unwrap();
        assert_eq!(avail.status, CtfStatus::Inactive);
        assert!(!avail.currently_active);
        assert_eq!(avail.reason, Some(AvailabilityReason::Hidden));

        let mut ctf = base_ctf();
        ctf.is_published = false;
        // Active hours that would match do not matter for a draft
        ctf.active_start_time = Some("00:00".to_string());
        ctf.active_end_time = Some("23:59".to_string());
        let avail = ctf.availability(at(12, 0)).unwrap();
        assert_eq!(avail.status, CtfStatus::Inactive);
        assert_eq!(avail.reason, Some(AvailabilityReason::Draft));
    }

    #[test]
    fn test_no_active_hours_means_active_within_schedule() {
        let ctf = base_ctf();
        let avail = ctf.availability(at(3, 0)).unwrap();
        assert_eq!(avail.status, CtfStatus::Active);
        assert!(avail.currently_active);

        // Empty strings behave like absent bounds
        let mut ctf = base_ctf();
        ctf.active_start_time = Some(String::new());
        ctf.active_end_time = Some("18:00".to_string());
        assert!(ctf.availability(at(3, 0)).unwrap().currently_active);
    }

    #[test]
    fn test_schedule_window_yields_upcoming_and_ended() {
        let mut ctf = base_ctf();
        ctf.start_date = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let avail = ctf.availability(at(12, 0)).unwrap();
        assert_eq!(avail.status, CtfStatus::Upcoming);
        assert!(!avail.currently_active);

        let mut ctf = base_ctf();
        ctf.end_date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let avail = ctf.availability(at(12, 0)).unwrap();
        assert_eq!(avail.status, CtfStatus::Ended);
        assert!(!avail.currently_active);
    }

    #[test]
    fn test_schedule_equal_dates_allowed() {
        let mut ctf = base_ctf();
        let instant = at(12, 0);
        ctf.start_date = instant;
        ctf.end_date = instant;
        assert!(ctf.availability(instant).unwrap().currently_active);
        assert_eq!(
            ctf.availability(at(12, 1)).unwrap().status,
            CtfStatus::Ended
        );
    }

    #[test]
    fn test_daytime_window_inclusive_boundaries() {
        let mut ctf = base_ctf();
        ctf.active_start_time = Some("09:00".to_string());
        ctf.active_end_time = Some("18:00".to_string());

        let avail = ctf.availability(at(8, 59)).unwrap();
        assert_eq!(avail.status, CtfStatus::Inactive);
        assert_eq!(avail.reason, Some(AvailabilityReason::OutsideActiveHours));

        assert!(ctf.availability(at(9, 0)).unwrap().currently_active);
        assert!(ctf.availability(at(18, 0)).unwrap().currently_active);
        assert!(!ctf.availability(at(18, 1)).unwrap().currently_active);
        assert!(!ctf.availability(at(20, 0)).unwrap().currently_active);
    }

    #[test]
    fn test_midnight_crossing_window() {
        let mut ctf = base_ctf();
        ctf.active_start_time = Some("22:00".to_string());
        ctf.active_end_time = Some("06:00".to_string());

        assert!(ctf.availability(at(23, 30)).unwrap().currently_active);
        assert!(ctf.availability(at(2, 0)).unwrap().currently_active);
        assert!(!ctf.availability(at(12, 0)).unwrap().currently_active);
        // Boundaries stay inclusive across the wrap
        assert!(ctf.availability(at(22, 0)).unwrap().currently_active);
        assert!(ctf.availability(at(6, 0)).unwrap().currently_active);
        assert!(!ctf.availability(at(6, 1)).unwrap().currently_active);
    }

    #[test]
    fn test_window_evaluated_in_configured_timezone() {
        let mut ctf = base_ctf();
        ctf.active_start_time = Some("09:00".to_string());
        ctf.active_end_time = Some("18:00".to_string());
        ctf.active_timezone = Some("America/New_York".to_string());

        // 14:00 UTC on 2025-06-15 is 10:00 in New York (EDT): inside
        assert!(ctf.availability(at(14, 0)).unwrap().currently_active);
        // 10:00 UTC is 06:00 in New York: outside
        assert!(!ctf.availability(at(10, 0)).unwrap().currently_active);
    }

    #[test]
    fn test_malformed_time_strings_fail_closed() {
        let mut ctf = base_ctf();
        ctf.active_start_time = Some("25:00".to_string());
        ctf.active_end_time = Some("18:00".to_string());
        assert!(matches!(
            ctf.availability(at(12, 0)),
            Err(AppError::Validation(_))
        ));

        let mut ctf = base_ctf();
        ctf.active_start_time = Some("09:00".to_string());
        ctf.active_end_time = Some("nine pm".to_string());
        assert!(ctf.availability(at(12, 0)).is_err());

        let mut ctf = base_ctf();
        ctf.active_start_time = Some("09:00".to_string());
        ctf.active_end_time = Some("18:00".to_string());
        ctf.active_timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(ctf.availability(at(12, 0)).is_err());
    }

    #[test]
    fn test_parse_time_of_day() {
        assert!(parse_time_of_day("00:00").is_ok());
        assert!(parse_time_of_day("23:59").is_ok());
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("12:60").is_err());
        assert!(parse_time_of_day("").is_err());
    }
}
