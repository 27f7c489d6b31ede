//! Flagdesk - CTF Training Platform Backend
//!
//! This library provides the core functionality for the Flagdesk platform,
//! a capture-the-flag training system with scheduled challenge windows and
//! human-reviewed, attempt-limited submissions.
//!
//! # Features
//!
//! - Deterministic CTF availability (publish/visibility flags, calendar
//!   window, daily recurring active hours)
//! - Attempt-capped submission pipeline with screenshot evidence
//! - Admin review workflow (approve/reject/bulk approve) that awards
//!   points exactly once per solve
//! - Security-review overlay (flagging and audit notes) independent of
//!   the review outcome
//! - Leaderboard aggregation over approved solves
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Repositories**: Database access
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
