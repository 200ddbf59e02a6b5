use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A bot user as stored in the registry
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: u64,
    pub handle: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Everyone who has ever written to the bot
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Insert the user unless the id is already known. Existing rows are left untouched.
    async fn record_sighting(
        &self,
        id: u64,
        handle: Option<&str>,
        display_name: &str,
    ) -> Result<()>;

    async fn list_all(&self) -> Result<Vec<UserRecord>>;
}

/// SQLite-backed user registry
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        Self::run_migrations(&conn)?;

        info!("User registry initialized at: {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS bot_users (
                id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                created_at TEXT NOT NULL
            );
            ",
        )
        .context("Failed to create bot_users table")?;
        Ok(())
    }
}

#[async_trait]
impl UserRegistry for UserStore {
    async fn record_sighting(
        &self,
        id: u64,
        handle: Option<&str>,
        display_name: &str,
    ) -> Result<()> {
        let id = i64::try_from(id).with_context(|| format!("User id out of range: {}", id))?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO bot_users (id, username, first_name, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO NOTHING",
            rusqlite::params![id, handle, display_name, Utc::now()],
        )
        .context("Failed to insert user")?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, username, first_name, created_at
             FROM bot_users
             ORDER BY created_at ASC, id ASC",
        )?;

        let users = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let display_name: Option<String> = row.get(2)?;
                Ok(UserRecord {
                    id: id as u64,
                    handle: row.get(1)?,
                    display_name: display_name.unwrap_or_default(),
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load users")?;

        Ok(users)
    }
}
