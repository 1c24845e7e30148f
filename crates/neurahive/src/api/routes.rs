//! API route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::auth_middleware;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // Tracing layer with request spans and timing
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/auth/refresh", post(handlers::refresh))
        // User management (admin only)
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/{user_id}", get(handlers::get_user).put(handlers::update_user))
        .route("/users/{user_id}/enabled", put(handlers::set_user_enabled))
        .route("/users/{user_id}/roles", put(handlers::set_user_roles))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
}
