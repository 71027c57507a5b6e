use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::user::{Role, User};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[serde(default)]
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        message = "Le mot de passe est requis pour la création d'un utilisateur"
    ))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email et nom complet sont requis"))]
    pub name: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[serde(default)]
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email et nom complet sont requis"))]
    pub name: String,
    pub role: Option<Role>,
    /// Rehashed only when present and non-empty.
    pub password: Option<String>,
}

impl UpdateUserPayload {
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            role: value.role,
            created_at: value.created_at,
        }
    }
}
