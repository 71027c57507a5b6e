use chrono::Utc;

use crate::database::Database;
use crate::dto::auth_dto::UpdateProfilePayload;
use crate::error::{Error, Result};
use crate::models::profile::Profile;

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
}

impl ProfileService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Profile>> {
        let pool = self.db.pool().await?;
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, phone, poste, created_at, updated_at FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(profile)
    }

    /// Renames the user and creates or updates its profile, atomically.
    pub async fn update_own_profile(&self, user_id: i64, payload: &UpdateProfilePayload) -> Result<Profile> {
        let pool = self.db.pool().await?;
        let mut tx = pool.begin().await?;
        let now = Utc::now();

        let renamed = sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(&payload.name)
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if renamed.rows_affected() == 0 {
            return Err(Error::NotFound("Utilisateur non trouvé".to_string()));
        }

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, phone, poste, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                phone = excluded.phone,
                poste = excluded.poste,
                updated_at = excluded.updated_at
            RETURNING id, user_id, phone, poste, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&payload.phone)
        .bind(&payload.poste)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }
}
