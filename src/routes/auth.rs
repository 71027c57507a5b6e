use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        auth_dto::{CurrentUserResponse, LoginPayload, LoginResponse, UpdateProfilePayload},
        common_dto::ActionResponse,
        user_dto::UserResponse,
    },
    error::{AuthFailure, Error},
    routes::extract::AuthJson,
    utils::token::SessionClaims,
    AppState,
};

type AuthResult<T> = std::result::Result<T, AuthFailure>;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AuthJson(payload): AuthJson<LoginPayload>,
) -> AuthResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|_| Error::BadRequest("Email et mot de passe requis".to_string()))?;

    let (token, user) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Connexion réussie".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user with profile", body = CurrentUserResponse),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid or expired token"),
        (status = 404, description = "User no longer active")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> AuthResult<impl IntoResponse> {
    let user = state
        .user_service
        .find_with_profile(claims.id)
        .await?
        .ok_or_else(|| Error::NotFound("Utilisateur non trouvé".to_string()))?;
    Ok(Json(CurrentUserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = ActionResponse),
        (status = 400, description = "Name missing"),
        (status = 404, description = "User no longer active")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    AuthJson(payload): AuthJson<UpdateProfilePayload>,
) -> AuthResult<impl IntoResponse> {
    payload.validate()?;
    state
        .profile_service
        .update_own_profile(claims.id, &payload)
        .await?;
    tracing::info!(user_id = claims.id, "profile updated");
    Ok(Json(ActionResponse::ok("Profil mis à jour avec succès")))
}

/// Tokens are not tracked server-side; the client drops its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ActionResponse)
    )
)]
pub async fn logout() -> impl IntoResponse {
    Json(ActionResponse::ok("Déconnexion réussie"))
}
