use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::{
        common_dto::{ActionResponse, CreatedResponse},
        user_dto::{CreateUserPayload, UpdateUserPayload, UserResponse},
    },
    error::Result,
    routes::extract::{ApiJson, ApiPath},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Active users", body = Vec<UserResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_active().await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Active user", body = UserResponse),
        (status = 404, description = "User not found or deactivated")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_active(id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = CreatedResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already in use")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(user.id, "Utilisateur créé avec succès")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = ActionResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "User not found or deactivated"),
        (status = 409, description = "Email already in use")
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.user_service.update(id, payload).await?;
    Ok(Json(ActionResponse::ok("Utilisateur modifié avec succès")))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = ActionResponse),
        (status = 404, description = "User not found or already deactivated")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse> {
    state.user_service.soft_delete(id).await?;
    Ok(Json(ActionResponse::ok("Utilisateur supprimé avec succès")))
}
