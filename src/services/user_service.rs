use chrono::Utc;

use crate::config::SeedAdmin;
use crate::database::{delete_by_id, Database, Deletable, DeletionPolicy};
use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload};
use crate::error::{Error, Result};
use crate::models::user::{Role, User, UserWithProfile};
use crate::utils::crypto::hash_password_async;

const USER_COLUMNS: &str =
    "id, email, name, role, password_hash, is_active, created_at, updated_at";

const EMAIL_TAKEN: &str = "Un utilisateur avec cet email existe déjà";

impl Deletable for User {
    const TABLE: &'static str = "users";
    const POLICY: DeletionPolicy = DeletionPolicy::Soft;
    const NOT_FOUND: &'static str = "Utilisateur non trouvé";
}

fn user_not_found() -> Error {
    Error::NotFound(<User as Deletable>::NOT_FOUND.to_string())
}

#[derive(Clone)]
pub struct UserService {
    db: Database,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_active_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.db.pool().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ? AND is_active = 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_active_by_id(&self, id: i64) -> Result<Option<User>> {
        let pool = self.db.pool().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ? AND is_active = 1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn get_active(&self, id: i64) -> Result<User> {
        self.find_active_by_id(id).await?.ok_or_else(user_not_found)
    }

    pub async fn find_with_profile(&self, id: i64) -> Result<Option<UserWithProfile>> {
        let pool = self.db.pool().await?;
        let user = sqlx::query_as::<_, UserWithProfile>(
            r#"
            SELECT u.id, u.email, u.name, u.role, p.phone, p.poste, u.created_at
            FROM users u
            LEFT JOIN profiles p ON u.id = p.user_id
            WHERE u.id = ? AND u.is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn list_active(&self) -> Result<Vec<User>> {
        let pool = self.db.pool().await?;
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE is_active = 1 ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    /// Inserts a new active user. The email must not belong to any row,
    /// active or not.
    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        let password_hash = hash_password_async(payload.password).await?;
        self.insert(
            &payload.email,
            &payload.name,
            payload.role.unwrap_or_default(),
            &password_hash,
        )
        .await
    }

    /// A single INSERT: the UNIQUE constraint on `email` decides between
    /// concurrent creates, and the losers get `Conflict`.
    async fn insert(&self, email: &str, name: &str, role: Role, password_hash: &str) -> Result<User> {
        let pool = self.db.pool().await?;
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(conflict_on_unique)?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Rewrites an active user in one statement. No row back means the
    /// target is absent or inactive; an email held by another row is a
    /// `Conflict`.
    pub async fn update(&self, id: i64, payload: UpdateUserPayload) -> Result<User> {
        let password_hash = match payload.new_password() {
            Some(password) => Some(hash_password_async(password.to_string()).await?),
            None => None,
        };

        let pool = self.db.pool().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = ?, name = ?, role = ?,
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ? AND is_active = 1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&payload.email)
        .bind(&payload.name)
        .bind(payload.role.unwrap_or_default().as_str())
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(conflict_on_unique)?
        .ok_or_else(user_not_found)?;

        tracing::info!(user_id = id, "user updated");
        Ok(user)
    }

    /// Marks the user inactive. Rows that reference the user stay valid.
    pub async fn soft_delete(&self, id: i64) -> Result<()> {
        let pool = self.db.pool().await?;
        let mut tx = pool.begin().await?;
        delete_by_id::<User>(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Creates the seed administrator unless a user with that email exists.
    pub async fn ensure_admin(&self, seed: &SeedAdmin) -> Result<()> {
        let pool = self.db.pool().await?;
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&seed.email)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            tracing::debug!("seed administrator {} already present", seed.email);
            return Ok(());
        }

        let password_hash = hash_password_async(seed.password.clone()).await?;
        match self
            .insert(&seed.email, &seed.name, Role::Admin, &password_hash)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = user.id, "seed administrator {} created", seed.email);
                Ok(())
            }
            Err(Error::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// A UNIQUE violation surfacing at write time means another request won
/// the race for the same email.
fn conflict_on_unique(err: sqlx::Error) -> Error {
    match Error::from(err) {
        Error::Conflict(_) => Error::Conflict(EMAIL_TAKEN.to_string()),
        other => other,
    }
}
