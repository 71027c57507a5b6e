use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::error::{Error, Result};

use super::schema::apply_schema;

/// Shared handle to the SQLite database.
///
/// The pool is opened and the schema applied on first use; every clone
/// shares the same one-time initialization.
#[derive(Clone)]
pub struct Database {
    url: Arc<str>,
    max_connections: u32,
    pool: Arc<OnceCell<SqlitePool>>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: Arc::from(url.into()),
            max_connections: max_connections.max(1),
            pool: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_url.clone(), config.database_max_connections)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    pub async fn pool(&self) -> Result<&SqlitePool> {
        self.pool.get_or_try_init(|| create_pool(&self.url, self.max_connections)).await
    }

    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("database connection closed");
        }
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

async fn create_pool(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let in_memory = is_in_memory(url);
    let mut options = SqliteConnectOptions::from_str(url)
        .map_err(|e| Error::Config(format!("Invalid DATABASE_URL '{}': {}", url, e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    if !in_memory {
        if let Some(dir) = options.clone().get_filename().parent() {
            ensure_dir(dir)?;
        }
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
    }

    // every connection to `:memory:` is its own database
    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { max_connections })
        .acquire_timeout(Duration::from_secs(30));
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    tracing::info!("connected to SQLite database at {}", url);

    apply_schema(&pool).await?;
    Ok(pool)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    tracing::info!("created database directory {}", dir.display());
    Ok(())
}
