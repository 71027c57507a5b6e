use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::user_dto::UserResponse;
use crate::models::user::{Role, UserWithProfile};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email et mot de passe requis"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email et mot de passe requis"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Le nom est requis"))]
    pub name: String,
    pub phone: Option<String>,
    pub poste: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub poste: Option<String>,
}

impl From<UserWithProfile> for CurrentUserResponse {
    fn from(value: UserWithProfile) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            role: value.role,
            phone: value.phone,
            poste: value.poste,
        }
    }
}
