pub mod auth;
pub mod dashboard;
pub mod diligence;
pub mod docs;
pub mod extract;
pub mod health;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::AccessPolicy, cors::cors_layer};
use crate::AppState;

const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Assembles every `/api` route with its access guard and the shared layers.
pub fn build_router(state: AppState) -> Router {
    let auth_public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout));

    let auth_session = AccessPolicy::Authenticated.guard(
        Router::new()
            .route("/api/auth/me", get(auth::me))
            .route("/api/auth/profile", put(auth::update_profile)),
        &state,
    );

    let users_api = state.config.users_access.guard(
        Router::new()
            .route("/api/users", get(users::list_users).post(users::create_user))
            .route(
                "/api/users/:id",
                get(users::get_user)
                    .put(users::update_user)
                    .delete(users::delete_user),
            ),
        &state,
    );

    let diligences_api = state.config.diligences_access.guard(
        Router::new()
            .route(
                "/api/diligences",
                get(diligence::list_diligences).post(diligence::create_diligence),
            )
            .route(
                "/api/diligences/:id",
                get(diligence::get_diligence)
                    .put(diligence::update_diligence)
                    .delete(diligence::delete_diligence),
            )
            .route("/api/dashboard/stats", get(dashboard::get_dashboard_stats)),
        &state,
    );

    let base_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/openapi.json", get(docs::openapi_json));

    let cors = cors_layer(&state.config.frontend_url);

    base_routes
        .merge(auth_public)
        .merge(auth_session)
        .merge(users_api)
        .merge(diligences_api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

async fn route_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route non trouvée", "path": uri.path() })),
    )
}
