use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(origin, "CORS_ORIGIN is not a valid header value, cross-origin requests disabled");
            CorsLayer::new()
        }
    }
}

/// Build the axum router with all API routes and middleware.
///
/// Fixed paths under `/api/schedules/` are matched ahead of `{id}`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(api::health))
        // Projections
        .route("/api/schedules/due-today", get(api::due_today))
        .route("/api/schedules/overdue", get(api::overdue))
        .route("/api/schedules/calendar", get(api::calendar))
        .route("/api/schedules/stats", get(api::stats))
        .route("/api/schedules/preview", post(api::preview))
        // Schedules
        .route(
            "/api/schedules",
            get(api::list_schedules).post(api::create_schedule),
        )
        .route(
            "/api/schedules/{id}",
            get(api::get_schedule)
                .put(api::update_schedule)
                .delete(api::delete_schedule),
        )
        .route("/api/schedules/{id}/activate", post(api::activate_schedule))
        .route("/api/schedules/{id}/deactivate", post(api::deactivate_schedule))
        .route("/api/schedules/{id}/complete", post(api::complete_schedule))
        .route("/api/schedules/{id}/completions", get(api::completion_history))
        .layer(cors)
        .with_state(state)
}
