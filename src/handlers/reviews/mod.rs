//! Admin review handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Review routes (admin only, enforced per handler)
pub fn routes() -> Router<AppState> {
    Router::new()
        // Review queue
        .route("/pending", get(handler::pending_queue))
        // Terminal decisions
        .route("/{id}/approve", post(handler::approve_submission))
        .route("/{id}/reject", post(handler::reject_submission))
        .route("/bulk-approve", post(handler::bulk_approve))
        // Security-review overlay
        .route("/{id}/mark", post(handler::mark_for_review))
        .route("/{id}/mark", delete(handler::unmark_review))
        .route("/{id}/notes", get(handler::list_review_notes))
        .route("/{id}/notes", post(handler::add_review_note))
        // Evidence
        .route("/{id}/screenshot", get(handler::submission_screenshot))
        // Detail with flag hint and note trail
        .route("/{id}", get(handler::review_detail))
}
