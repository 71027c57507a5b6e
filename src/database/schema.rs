use sqlx::SqlitePool;

use crate::error::Result;

const SCHEMA: &str = include_str!("schema.sql");

/// Applies the schema one statement at a time. Statements that fail
/// because their table, index or column already exists are skipped, so
/// running this against an up-to-date database is a no-op.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in statements(SCHEMA) {
        if let Err(err) = sqlx::query(statement).execute(pool).await {
            if is_already_applied(&err) {
                tracing::debug!("schema statement already applied: {}", err);
                continue;
            }
            return Err(err.into());
        }
    }
    tracing::info!("database schema is up to date");
    Ok(())
}

fn statements(schema: &str) -> impl Iterator<Item = &str> {
    schema.split(';').map(str::trim).filter(|s| !s.is_empty())
}

fn is_already_applied(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message();
            message.contains("duplicate column name") || message.contains("already exists")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_splits_into_statements() {
        let parsed: Vec<&str> = statements(SCHEMA).collect();
        assert!(parsed.iter().any(|s| s.starts_with("CREATE TABLE IF NOT EXISTS users")));
        assert!(parsed.iter().any(|s| s.starts_with("ALTER TABLE users")));
        assert!(parsed.iter().all(|s| !s.is_empty()));
    }
}
