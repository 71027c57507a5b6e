use sqlx::{Sqlite, Transaction};

use crate::error::{Error, Result};

/// How rows of an entity disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Flip `is_active` to 0; the row stays referencable.
    Soft,
    /// Remove the row.
    Hard,
}

/// A table whose rows can be deleted by id.
pub trait Deletable {
    const TABLE: &'static str;
    const POLICY: DeletionPolicy;
    /// Message of the `NotFound` returned for a missing row.
    const NOT_FOUND: &'static str;
}

/// Deletes the row with `id` according to `T::POLICY`.
///
/// A row that is absent, or already soft-deleted, is `NotFound`.
pub async fn delete_by_id<T: Deletable>(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> Result<()> {
    let sql = match T::POLICY {
        DeletionPolicy::Soft => format!(
            "UPDATE {} SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
            T::TABLE
        ),
        DeletionPolicy::Hard => format!("DELETE FROM {} WHERE id = ?", T::TABLE),
    };

    let mut query = sqlx::query(&sql);
    if T::POLICY == DeletionPolicy::Soft {
        query = query.bind(chrono::Utc::now());
    }
    let result = query.bind(id).execute(&mut **tx).await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(T::NOT_FOUND.to_string()));
    }
    tracing::info!(table = T::TABLE, id, policy = ?T::POLICY, "row deleted");
    Ok(())
}
