use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::user_service::UserService;
use crate::utils::crypto::verify_password_async;
use crate::utils::token::{Identity, TokenService};

/// Same message for an unknown email and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Email ou mot de passe incorrect";

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Checks the credentials of an active user and issues a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let Some(user) = self.users.find_active_by_email(email).await? else {
            tracing::info!("login rejected: no active user for the given email");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let matches = verify_password_async(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self
            .tokens
            .issue(&Identity::from(&user))
            .map_err(|e| Error::Internal(e.to_string()))?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((token, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::dto::user_dto::CreateUserPayload;
    use crate::models::user::Role;
    use chrono::Duration;

    async fn setup() -> (AuthService, UserService, TokenService) {
        let users = UserService::new(Database::new("sqlite::memory:", 1));
        let tokens = TokenService::new("test_secret_key", Duration::hours(24));
        (AuthService::new(users.clone(), tokens.clone()), users, tokens)
    }

    #[tokio::test]
    async fn login_token_decodes_to_the_created_user() {
        let (auth, users, tokens) = setup().await;
        let created = users
            .create(CreateUserPayload {
                email: "a@x.com".into(),
                password: "p".into(),
                name: "A".into(),
                role: Some(Role::Admin),
            })
            .await
            .unwrap();

        let (token, user) = auth.login("a@x.com", "p").await.unwrap();
        assert_eq!(user.id, created.id);

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, created.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let (auth, users, _) = setup().await;
        users
            .create(CreateUserPayload {
                email: "b@x.com".into(),
                password: "right".into(),
                name: "B".into(),
                role: None,
            })
            .await
            .unwrap();

        let wrong = auth.login("b@x.com", "wrong").await.unwrap_err();
        let missing = auth.login("nobody@x.com", "right").await.unwrap_err();
        assert_eq!(wrong.to_string(), missing.to_string());
        assert!(matches!(wrong, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn deactivated_user_cannot_log_in() {
        let (auth, users, _) = setup().await;
        let user = users
            .create(CreateUserPayload {
                email: "c@x.com".into(),
                password: "p".into(),
                name: "C".into(),
                role: None,
            })
            .await
            .unwrap();
        users.soft_delete(user.id).await.unwrap();

        assert!(matches!(
            auth.login("c@x.com", "p").await,
            Err(Error::Unauthorized(_))
        ));
    }
}
