//! Plain many-to-many join tables.
//!
//! Join tables without extra columns all look alike: two foreign keys and a
//! composite primary key. [`Link`] names one such table and provides the
//! usual operations. Through-models that carry extra fields (scenario
//! events, timeline events) have their own repositories instead.

use crate::db::db::atomically;
use crate::db::error::{StoreError, StoreResult};
use rusqlite::{params, Connection};

/// A join table `table(left, right)`.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub table: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

impl Link {
    pub const fn new(table: &'static str, left: &'static str, right: &'static str) -> Self {
        Self { table, left, right }
    }

    /// Adds a pair. Adding an existing pair is a no-op.
    pub fn add(&self, conn: &Connection, left_id: i64, right_id: i64) -> StoreResult<()> {
        let sql = format!("INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2)", self.table, self.left, self.right);
        conn.execute(&sql, params![left_id, right_id]).map_err(|err| self.map_err(err, right_id))?;
        Ok(())
    }

    pub fn remove(&self, conn: &Connection, left_id: i64, right_id: i64) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1 AND {} = ?2", self.table, self.left, self.right);
        conn.execute(&sql, params![left_id, right_id])?;
        Ok(())
    }

    pub fn clear(&self, conn: &Connection, left_id: i64) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1", self.table, self.left);
        conn.execute(&sql, params![left_id])?;
        Ok(())
    }

    /// Replaces every pair for `left_id` with `right_ids`, atomically.
    pub fn set(&self, conn: &Connection, left_id: i64, right_ids: &[i64]) -> StoreResult<()> {
        atomically(conn, |conn| {
            self.clear(conn, left_id)?;
            for &right_id in right_ids {
                self.add(conn, left_id, right_id)?;
            }
            Ok(())
        })
    }

    /// Right-hand ids linked to `left_id`, ascending.
    pub fn right_ids(&self, conn: &Connection, left_id: i64) -> StoreResult<Vec<i64>> {
        let sql = format!("SELECT {} FROM {} WHERE {} = ?1 ORDER BY {}", self.right, self.table, self.left, self.right);
        Self::collect_ids(conn, &sql, left_id)
    }

    /// Left-hand ids linked to `right_id`, ascending.
    pub fn left_ids(&self, conn: &Connection, right_id: i64) -> StoreResult<Vec<i64>> {
        let sql = format!("SELECT {} FROM {} WHERE {} = ?1 ORDER BY {}", self.left, self.table, self.right, self.left);
        Self::collect_ids(conn, &sql, right_id)
    }

    fn collect_ids(conn: &Connection, sql: &str, id: i64) -> StoreResult<Vec<i64>> {
        let mut stmt = conn.prepare(sql)?;
        let ids = stmt.query_map(params![id], |row| row.get(0))?.collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn map_err(&self, err: rusqlite::Error, right_id: i64) -> StoreError {
        if crate::db::error::is_foreign_key_violation(&err) {
            StoreError::not_found(self.right, right_id)
        } else {
            StoreError::Sqlite(err)
        }
    }
}
