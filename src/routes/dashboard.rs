use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::diligence_dto::DashboardStats, error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Counts per status and priority", body = DashboardStats)
    )
)]
#[axum::debug_handler]
pub async fn get_dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.diligence_service.stats().await?;
    Ok(Json(stats))
}
