use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::{
        common_dto::{ActionResponse, CreatedResponse},
        diligence_dto::{DiligenceListQuery, DiligencePayload, DiligenceResponse},
    },
    error::Result,
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/diligences",
    params(DiligenceListQuery),
    responses(
        (status = 200, description = "Diligences, newest first", body = Vec<DiligenceResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_diligences(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DiligenceListQuery>,
) -> Result<impl IntoResponse> {
    let items = state.diligence_service.list(query).await?;
    let body: Vec<DiligenceResponse> = items.into_iter().map(DiligenceResponse::from).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/diligences/{id}",
    params(
        ("id" = i64, Path, description = "Diligence ID")
    ),
    responses(
        (status = 200, description = "Diligence", body = DiligenceResponse),
        (status = 404, description = "Diligence not found")
    )
)]
#[axum::debug_handler]
pub async fn get_diligence(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    let diligence = state.diligence_service.get_by_id(id).await?;
    Ok(Json(DiligenceResponse::from(diligence)))
}

#[utoipa::path(
    post,
    path = "/api/diligences",
    request_body = DiligencePayload,
    responses(
        (status = 201, description = "Diligence created", body = CreatedResponse),
        (status = 400, description = "Missing required field")
    )
)]
#[axum::debug_handler]
pub async fn create_diligence(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DiligencePayload>,
) -> Result<impl IntoResponse> {
    let record = payload.into_record()?;
    let id = state.diligence_service.create(record).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(id, "Diligence créée avec succès")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/diligences/{id}",
    params(
        ("id" = i64, Path, description = "Diligence ID")
    ),
    request_body = DiligencePayload,
    responses(
        (status = 200, description = "Diligence replaced", body = ActionResponse),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "Diligence not found")
    )
)]
#[axum::debug_handler]
pub async fn update_diligence(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<DiligencePayload>,
) -> Result<impl IntoResponse> {
    let record = payload.into_record()?;
    state.diligence_service.replace(id, record).await?;
    Ok(Json(ActionResponse::ok("Diligence modifiée avec succès")))
}

#[utoipa::path(
    delete,
    path = "/api/diligences/{id}",
    params(
        ("id" = i64, Path, description = "Diligence ID")
    ),
    responses(
        (status = 200, description = "Diligence deleted", body = ActionResponse),
        (status = 404, description = "Diligence not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_diligence(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    state.diligence_service.delete(id).await?;
    Ok(Json(ActionResponse::ok("Diligence supprimée avec succès")))
}
