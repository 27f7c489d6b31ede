//! CTF management handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// CTF routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // CTF CRUD
        .route("/", get(handler::list_ctfs))
        .route("/", post(handler::create_ctf))
        .route("/{id}", get(handler::get_ctf))
        .route("/{id}", put(handler::update_ctf))
        // Lifecycle switches
        .route("/{id}/publish", put(handler::set_published))
        .route("/{id}/visibility", put(handler::set_visible))
        // Leaderboards
        .route("/leaderboard", get(handler::global_leaderboard))
        .route("/{id}/leaderboard", get(handler::ctf_leaderboard))
}
