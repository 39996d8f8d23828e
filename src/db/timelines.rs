//! Curated, ordered timelines of events.
//!
//! A [`TimelineEvent`] places one event on a timeline at an explicit
//! integer position. Reads always return entries by ascending position,
//! ties broken by insertion order.

use crate::db::db::atomically;
use crate::db::error::{StoreError, StoreResult};
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::messages::Message;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use crate::msg_debug;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_TIMELINE: &str = "INSERT INTO timelines (title, description, is_public, created_at, created_by_id) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_TIMELINE: &str =
    "UPDATE timelines SET title = ?1, description = ?2, is_public = ?3, created_at = ?4, created_by_id = ?5 WHERE id = ?6";
const SELECT_TIMELINES: &str = "SELECT id, title, description, is_public, created_at, created_by_id FROM timelines";

const INSERT_ENTRY: &str = "INSERT INTO timeline_events (timeline_id, event_id, custom_note, sort_order) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_ENTRY: &str = "UPDATE timeline_events SET timeline_id = ?1, event_id = ?2, custom_note = ?3, sort_order = ?4 WHERE id = ?5";
const SELECT_ENTRIES: &str = "SELECT id, timeline_id, event_id, custom_note, sort_order FROM timeline_events";
const UPDATE_ENTRY_ORDER: &str = "UPDATE timeline_events SET sort_order = ?1 WHERE id = ?2 AND timeline_id = ?3";
const NEXT_ORDER: &str = "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM timeline_events WHERE timeline_id = ?1";

/// A user-curated, ordered list of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    /// Public timelines are listed for everyone.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    /// Author. Deleting the user deletes their timelines.
    pub created_by_id: i64,
}

impl Timeline {
    pub fn new(title: &str, description: &str, created_by_id: i64) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            description: description.to_string(),
            is_public: true,
            created_at: Utc::now(),
            created_by_id,
        }
    }
}

impl Validate for Timeline {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 200);
        v.required("description", &self.description);
        v.finish()
    }
}

fn timeline_from_row(row: &Row) -> rusqlite::Result<Timeline> {
    Ok(Timeline {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_public: row.get(3)?,
        created_at: row.get(4)?,
        created_by_id: row.get(5)?,
    })
}

/// One event placed on a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Option<i64>,
    pub timeline_id: i64,
    pub event_id: i64,
    /// Author note shown next to the event on this timeline only.
    pub custom_note: String,
    /// Position on the timeline. Entries list by ascending order, then by id.
    pub order: i64,
}

impl TimelineEvent {
    pub fn new(timeline_id: i64, event_id: i64, order: i64) -> Self {
        Self {
            id: None,
            timeline_id,
            event_id,
            custom_note: String::new(),
            order,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.custom_note = note.to_string();
        self
    }
}

fn entry_from_row(row: &Row) -> rusqlite::Result<TimelineEvent> {
    Ok(TimelineEvent {
        id: row.get(0)?,
        timeline_id: row.get(1)?,
        event_id: row.get(2)?,
        custom_note: row.get(3)?,
        order: row.get(4)?,
    })
}

pub struct Timelines<'a> {
    conn: &'a Connection,
}

impl<'a> Timelines<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, timeline: &mut Timeline) -> StoreResult<i64> {
        timeline.validate()?;
        save_row(
            self.conn,
            "timeline",
            &mut timeline.id,
            INSERT_TIMELINE,
            UPDATE_TIMELINE,
            params![timeline.title, timeline.description, timeline.is_public, timeline.created_at, timeline.created_by_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Timeline> {
        require(self.conn, "timeline", id, &format!("{} WHERE id = ?1", SELECT_TIMELINES), [id], timeline_from_row)
    }

    pub fn list_public(&self) -> StoreResult<Vec<Timeline>> {
        fetch_all(self.conn, &format!("{} WHERE is_public ORDER BY created_at DESC, id DESC", SELECT_TIMELINES), [], timeline_from_row)
    }

    pub fn list_by_creator(&self, user_id: i64) -> StoreResult<Vec<Timeline>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE created_by_id = ?1 ORDER BY created_at DESC, id DESC", SELECT_TIMELINES),
            [user_id],
            timeline_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "timelines", "timeline", id)
    }

    /// Inserts or updates a timeline entry.
    pub fn save_entry(&self, entry: &mut TimelineEvent) -> StoreResult<i64> {
        save_row(
            self.conn,
            "timeline event",
            &mut entry.id,
            INSERT_ENTRY,
            UPDATE_ENTRY,
            params![entry.timeline_id, entry.event_id, entry.custom_note, entry.order],
        )
    }

    /// Appends an event after the current last entry.
    pub fn append(&self, timeline_id: i64, event_id: i64, note: &str) -> StoreResult<TimelineEvent> {
        let order: i64 = self.conn.query_row(NEXT_ORDER, [timeline_id], |row| row.get(0))?;
        let mut entry = TimelineEvent::new(timeline_id, event_id, order).with_note(note);
        self.save_entry(&mut entry)?;
        Ok(entry)
    }

    /// Entries of a timeline by ascending order.
    pub fn entries(&self, timeline_id: i64) -> StoreResult<Vec<TimelineEvent>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE timeline_id = ?1 ORDER BY sort_order, id", SELECT_ENTRIES),
            [timeline_id],
            entry_from_row,
        )
    }

    /// Event ids of a timeline by ascending order.
    pub fn event_ids(&self, timeline_id: i64) -> StoreResult<Vec<i64>> {
        Ok(self.entries(timeline_id)?.into_iter().map(|e| e.event_id).collect())
    }

    /// Renumbers entries so they follow `entry_ids`, starting at 0.
    ///
    /// Every id must belong to the timeline; otherwise nothing changes.
    pub fn reorder(&self, timeline_id: i64, entry_ids: &[i64]) -> StoreResult<()> {
        atomically(self.conn, |conn| {
            for (position, &entry_id) in entry_ids.iter().enumerate() {
                let affected = conn.execute(UPDATE_ENTRY_ORDER, params![position as i64, entry_id, timeline_id])?;
                if affected == 0 {
                    return Err(StoreError::not_found("timeline event", entry_id));
                }
            }
            Ok(())
        })?;
        msg_debug!(Message::TimelineReordered(timeline_id, entry_ids.len()));
        Ok(())
    }

    pub fn remove_entry(&self, entry_id: i64) -> StoreResult<()> {
        delete_row(self.conn, "timeline_events", "timeline event", entry_id)
    }
}
