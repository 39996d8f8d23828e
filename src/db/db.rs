use crate::db::error::StoreResult;
use crate::db::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_debug;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// An open, configured SQLite connection.
///
/// Repositories borrow the connection (`Eras::new(&db)`), so one `Db`
/// serves every entity and foreign keys can be checked across tables.
#[derive(Debug)]
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the configured database and applies pending migrations.
    pub fn new() -> Result<Db> {
        let config = Config::read()?;
        let path = config.database_path()?;
        let mut db = Self::connect(&path, config.busy_timeout_ms())?;
        init_with_migrations(&mut db.conn)?;
        Ok(db)
    }

    /// Opens the database at `path` and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        let mut db = Self::open_without_migrations(path)?;
        init_with_migrations(&mut db.conn)?;
        Ok(db)
    }

    /// Opens the database at `path` as is, leaving the schema untouched.
    pub fn open_without_migrations(path: impl AsRef<Path>) -> Result<Db> {
        Self::connect(path.as_ref(), Config::default().busy_timeout_ms())
    }

    /// Fresh in-memory database with the full schema.
    pub fn in_memory() -> Result<Db> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self::configure(conn, Config::default().busy_timeout_ms())?;
        init_with_migrations(&mut db.conn)?;
        Ok(db)
    }

    fn connect(path: &Path, busy_timeout_ms: u64) -> Result<Db> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        msg_debug!(Message::DatabaseOpened(path.display().to_string()));
        Self::configure(conn, busy_timeout_ms)
    }

    fn configure(conn: Connection, busy_timeout_ms: u64) -> Result<Db> {
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        // Cascade and set-null policies depend on this.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Db { conn })
    }
}

impl std::ops::Deref for Db {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

/// Runs `f` inside a transaction, or inside the caller's transaction when
/// one is already open on `conn`.
pub fn atomically<T>(conn: &Connection, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
