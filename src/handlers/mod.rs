//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod ctfs;
pub mod health;
pub mod reviews;
pub mod submissions;

use axum::{middleware, Router};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest(
            "/ctfs",
            ctfs::routes().route_layer(middleware::from_fn(auth_middleware)),
        )
        .nest(
            "/submissions",
            submissions::routes().route_layer(middleware::from_fn(auth_middleware)),
        )
        .nest(
            "/reviews",
            reviews::routes().route_layer(middleware::from_fn(auth_middleware)),
        )
}
