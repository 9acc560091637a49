//! SQLite persistence layer for the calendar bot.
//!
//! This crate provides async database operations for per-chat conversation
//! context and the update-consumption record using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{chat_context, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:bot.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Store a chat context document
//!     chat_context::upsert_context(db.pool(), "12345", r#"{"previous_message":"hi"}"#).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod chat_context;
pub mod error;
pub mod models;
pub mod update_state;

pub use error::{DatabaseError, Result};
pub use models::{ChatContextRecord, UpdateState};

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const POOL_SIZE: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pooled SQLite handle holding chat contexts and the update record.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open `url`, e.g. `sqlite:bot.db?mode=rwc`. Missing files are created.
    ///
    /// Every pooled connection to an in-memory URL would see its own empty
    /// database, so those pools are capped at a single connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let size = if is_memory(url) { 1 } else { POOL_SIZE };
        Self::connect_with_pool_size(url, size).await
    }

    /// Private in-memory database, mostly for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        info!("Opened SQLite store {} ({} connections)", url, pool_size);
        Ok(Self { pool })
    }

    /// Bring the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("SQLite schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        assert_eq!(chat_context::count_contexts(db.pool()).await.unwrap(), 0);
    }

    #[test]
    fn test_memory_urls() {
        assert!(is_memory("sqlite::memory:"));
        assert!(is_memory("sqlite:file:bot?mode=memory&cache=shared"));
        assert!(!is_memory("sqlite:bot.db?mode=rwc"));
    }
}
