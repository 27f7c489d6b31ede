//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

// =============================================================================
// CTF DEFAULTS
// =============================================================================

/// Default attempt cap per user per CTF when the admin does not set one
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Default point reward for a solved CTF
pub const DEFAULT_CTF_POINTS: i32 = 100;

// =============================================================================
// CTF CLASSIFICATION
// =============================================================================

/// Difficulty tiers
pub mod difficulties {
    pub const BEGINNER: &str = "beginner";
    pub const EASY: &str = "easy";
    pub const MEDIUM: &str = "medium";
    pub const HARD: &str = "hard";
    pub const INSANE: &str = "insane";

    /// All difficulty tiers
    pub const ALL: &[&str] = &[BEGINNER, EASY, MEDIUM, HARD, INSANE];
}

/// Challenge categories
pub mod categories {
    pub const WEB: &str = "web";
    pub const CRYPTO: &str = "crypto";
    pub const PWN: &str = "pwn";
    pub const REVERSING: &str = "reversing";
    pub const FORENSICS: &str = "forensics";
    pub const OSINT: &str = "osint";
    pub const MISC: &str = "misc";

    /// All challenge categories
    pub const ALL: &[&str] = &[WEB, CRYPTO, PWN, REVERSING, FORENSICS, OSINT, MISC];
}

// =============================================================================
// SUBMISSION STATUSES
// =============================================================================

/// Submission review statuses
pub mod submission_statuses {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";

    /// All submission statuses
    pub const ALL: &[&str] = &[PENDING, APPROVED, REJECTED];
}

// =============================================================================
// USER ROLES
// =============================================================================

/// User role identifiers
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const STUDENT: &str = "student";

    /// All user roles
    pub const ALL: &[&str] = &[ADMIN, STUDENT];
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// Current API version
pub const API_VERSION: &str = "v1";

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Rate limiting configuration
pub mod rate_limits {
    /// Submission endpoint - max requests
    pub const SUBMISSION_MAX_REQUESTS: i64 = 10;
    /// Submission endpoint - window in seconds
    pub const SUBMISSION_WINDOW_SECS: i64 = 60;

    /// General API - max requests
    pub const GENERAL_MAX_REQUESTS: i64 = 100;
    /// General API - window in seconds
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for paginated results
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum CTF title length
pub const MAX_CTF_TITLE_LENGTH: u64 = 256;

/// Maximum CTF description length
pub const MAX_CTF_DESCRIPTION_LENGTH: u64 = 65535;

/// Maximum submitted flag length
pub const MAX_FLAG_LENGTH: u64 = 512;

/// Maximum admin feedback length
pub const MAX_FEEDBACK_LENGTH: u64 = 4096;

/// Maximum review note length
pub const MAX_REVIEW_NOTE_LENGTH: u64 = 4096;

/// Maximum decoded screenshot size in bytes (8 MB)
pub const MAX_SCREENSHOT_SIZE: usize = 8 * 1024 * 1024;
