// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, session},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public, token-addressed routes for candidates taking a test.
/// * Admin routes behind bearer authentication and the admin role check.
/// * Global middleware (Trace, CORS for the configured public origin).
pub fn create_router(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    match HeaderValue::from_str(&state.config.public_base_url.origin().ascii_serialization()) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => tracing::warn!("PUBLIC_BASE_URL is not a usable CORS origin: {}", e),
    }

    let session_routes = Router::new()
        .route("/{token}", get(session::show_session))
        .route("/{token}/start", post(session::start_session))
        .route("/{token}/submit", post(session::submit_answers));

    let admin_routes = Router::new()
        .route("/tests", get(admin::list_tests).post(admin::create_test))
        .route(
            "/sessions",
            get(admin::list_sessions).post(admin::issue_link),
        )
        .route(
            "/sessions/{id}",
            delete(admin::delete_session),
        )
        .route("/sessions/{id}/report", get(admin::session_report))
        // Auth first, then the admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/sessions", session_routes)
        .nest("/api/admin", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
