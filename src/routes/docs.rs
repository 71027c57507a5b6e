use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::{
    auth_dto::{CurrentUserResponse, LoginPayload, LoginResponse, UpdateProfilePayload},
    common_dto::{ActionResponse, CreatedResponse},
    diligence_dto::{DashboardStats, DiligencePayload, DiligenceResponse},
    user_dto::{CreateUserPayload, UpdateUserPayload, UserResponse},
};
use crate::models::diligence::{Priority, Status};
use crate::models::user::Role;
use crate::routes::{auth, dashboard, diligence, health, users};

#[derive(OpenApi)]
#[openapi(
    info(title = "Diligence backend", description = "Suivi des diligences"),
    paths(
        auth::login,
        auth::me,
        auth::update_profile,
        auth::logout,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        diligence::list_diligences,
        diligence::get_diligence,
        diligence::create_diligence,
        diligence::update_diligence,
        diligence::delete_diligence,
        dashboard::get_dashboard_stats,
        health::health,
    ),
    components(schemas(
        LoginPayload,
        LoginResponse,
        UpdateProfilePayload,
        CurrentUserResponse,
        ActionResponse,
        CreatedResponse,
        CreateUserPayload,
        UpdateUserPayload,
        UserResponse,
        Role,
        DiligencePayload,
        DiligenceResponse,
        DashboardStats,
        Priority,
        Status,
        health::HealthResponse,
    )),
    modifiers(&BearerScheme)
)]
pub struct ApiDoc;

struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
