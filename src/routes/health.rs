use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub database: String,
}

/// Always 200; `database` reports whether a trivial query went through.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.pool().await {
        Ok(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "health check query failed");
                "error"
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "health check could not open the database");
            "error"
        }
    };

    let body = HealthResponse {
        status: "OK".to_string(),
        message: "Serveur backend opérationnel".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        database: database.to_string(),
    };
    (StatusCode::OK, Json(body))
}
