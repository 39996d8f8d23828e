//! Statement helpers shared by the repositories.

use crate::db::error::{write_error, StoreError, StoreResult};
use crate::libs::messages::Message;
use crate::msg_debug;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Params, Row};

/// Inserts a new row when `id` is unset, otherwise updates the existing one.
///
/// `insert` binds `values` as `?1..?n`; `update` binds the same values and
/// the row id as `?n+1`. On insert the new id is written back into `id`.
pub(crate) fn save_row(
    conn: &Connection,
    entity: &'static str,
    id: &mut Option<i64>,
    insert: &str,
    update: &str,
    values: &[&dyn ToSql],
) -> StoreResult<i64> {
    match *id {
        None => {
            conn.execute(insert, values).map_err(write_error(entity))?;
            let new_id = conn.last_insert_rowid();
            *id = Some(new_id);
            msg_debug!(Message::RecordSaved(entity, new_id));
            Ok(new_id)
        }
        Some(existing) => {
            let mut bound = values.to_vec();
            bound.push(&existing);
            let affected = conn.execute(update, bound.as_slice()).map_err(write_error(entity))?;
            if affected == 0 {
                return Err(StoreError::not_found(entity, existing));
            }
            msg_debug!(Message::RecordUpdated(entity, existing));
            Ok(existing)
        }
    }
}

/// Inserts a row that is never updated afterwards. Returns the new id.
pub(crate) fn append_row(conn: &Connection, entity: &'static str, insert: &str, values: &[&dyn ToSql]) -> StoreResult<i64> {
    conn.execute(insert, values).map_err(write_error(entity))?;
    let id = conn.last_insert_rowid();
    msg_debug!(Message::RecordSaved(entity, id));
    Ok(id)
}

/// Deletes a row by id; the database applies cascade and set-null policies.
pub(crate) fn delete_row(conn: &Connection, table: &str, entity: &'static str, id: i64) -> StoreResult<()> {
    let affected = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])?;
    if affected == 0 {
        return Err(StoreError::not_found(entity, id));
    }
    msg_debug!(Message::RecordDeleted(entity, id));
    Ok(())
}

pub(crate) fn fetch_one<T, P: Params>(conn: &Connection, sql: &str, params: P, map: impl FnOnce(&Row) -> rusqlite::Result<T>) -> StoreResult<Option<T>> {
    conn.query_row(sql, params, map).optional().map_err(Into::into)
}

pub(crate) fn fetch_all<T, P: Params>(conn: &Connection, sql: &str, params: P, map: impl FnMut(&Row) -> rusqlite::Result<T>) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?.collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Fetches a row that must exist.
pub(crate) fn require<T, P: Params>(
    conn: &Connection,
    entity: &'static str,
    id: i64,
    sql: &str,
    params: P,
    map: impl FnOnce(&Row) -> rusqlite::Result<T>,
) -> StoreResult<T> {
    fetch_one(conn, sql, params, map)?.ok_or_else(|| StoreError::not_found(entity, id))
}

/// True when `table` has a row with `id`.
pub(crate) fn exists(conn: &Connection, table: &str, id: i64) -> StoreResult<bool> {
    let exists = conn.query_row(&format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table), [id], |row| row.get(0))?;
    Ok(exists)
}
