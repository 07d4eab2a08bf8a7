/*!
 * Database connection management.
 *
 * This module handles SQLite database connection creation, initialization,
 * and provides async-safe access patterns using tokio's spawn_blocking.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::schema;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "translations.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "szlk-backend";

/// Path reported for in-memory databases
const IN_MEMORY_PATH: &str = ":memory:";

/// Database connection wrapper with thread-safe access
///
/// The connection is taken out of its slot on `close`; every later
/// operation fails.
#[derive(Clone, Debug)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection slot wrapped in Arc<Mutex>
    connection: Arc<Mutex<Option<Connection>>>,
}

impl DatabaseConnection {
    /// Create a new database connection at the default location
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Create a new database connection at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        // WAL only makes sense for file databases
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(IN_MEMORY_PATH),
            connection: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        // Try to use the system data directory
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether this is an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_PATH
    }

    /// Whether the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.connection
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true)
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let slot = self
            .connection
            .lock()
            .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))?;

        let conn = slot.as_ref().ok_or_else(|| anyhow!("Database connection is closed"))?;
        f(conn)
    }

    /// Execute a database operation asynchronously using spawn_blocking
    ///
    /// This is the preferred method for async contexts as it prevents
    /// blocking the async runtime.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let slot = conn
                .lock()
                .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))?;

            let conn = slot.as_ref().ok_or_else(|| anyhow!("Database connection is closed"))?;
            f(conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Begin an async transaction and execute operations within it
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut slot = conn
                .lock()
                .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))?;

            let conn = slot.as_mut().ok_or_else(|| anyhow!("Database connection is closed"))?;
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Checkpoint and close the connection
    ///
    /// Closing an already closed connection is a no-op.
    pub async fn close_async(&self) -> Result<()> {
        let conn = self.connection.clone();
        let in_memory = self.is_in_memory();

        tokio::task::spawn_blocking(move || {
            let mut slot = conn
                .lock()
                .map_err(|e| anyhow!("Failed to acquire database lock: {}", e))?;

            let Some(conn) = slot.take() else {
                debug!("Database connection already closed");
                return Ok(());
            };

            if !in_memory {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                    .context("Failed to checkpoint database")?;
            }
            conn.close()
                .map_err(|(_, e)| anyhow!("Failed to close database: {}", e))?;

            info!("Database connection closed");
            Ok(())
        })
        .await
        .context("Database close task panicked")?
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0)
        };

        self.execute(|conn| {
            let translation_count: i64 =
                conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;

            Ok(DatabaseStats {
                translation_count,
                file_size_bytes,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Number of stored translations
    pub translation_count: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Translations: {}, Size: {} KB",
            self.translation_count,
            self.file_size_bytes / 1024
        )
    }
}
