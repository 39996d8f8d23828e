//! Historical events, the center of the catalogue.
//!
//! An event belongs to an era and an event category (both cascade on
//! delete) and optionally to a location (cleared on delete). Saving checks
//! that `start_date` does not come after `end_date`; a failing check writes
//! nothing.

use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::choices::int_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_EVENT: &str = "INSERT INTO historical_events
    (name, title, date, start_date, end_date, description, impact_level, significance_rating, sources,
     created_at, updated_at, era_id, category_id, location_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";
const UPDATE_EVENT: &str = "UPDATE historical_events SET
    name = ?1, title = ?2, date = ?3, start_date = ?4, end_date = ?5, description = ?6, impact_level = ?7,
    significance_rating = ?8, sources = ?9, created_at = ?10, updated_at = ?11, era_id = ?12, category_id = ?13,
    location_id = ?14
    WHERE id = ?15";
const SELECT_EVENTS: &str = "SELECT id, name, title, date, start_date, end_date, description, impact_level, significance_rating,
    sources, created_at, updated_at, era_id, category_id, location_id FROM historical_events";

const RELATED_EVENTS: Link = Link::new("historical_event_related", "from_event_id", "to_event_id");
const CATEGORIES: Link = Link::new("historical_event_categories", "event_id", "category_id");
const KEY_FIGURES: Link = Link::new("historical_event_key_figures", "event_id", "figure_id");

int_choices! {
    /// How far an event's effects reached.
    pub enum ImpactLevel {
        Low = 1 => "Low",
        Medium = 2 => "Medium",
        High = 3 => "High",
    }
}

/// A dated event in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: Option<i64>,
    /// Short name, unique in practice but not enforced.
    pub name: String,
    /// Display title, at most 200 characters.
    pub title: String,
    /// Headline date shown in listings.
    pub date: NaiveDate,
    /// First day of the event.
    pub start_date: NaiveDate,
    /// Last day, or `None` for single-day and open-ended events.
    /// Never before `start_date`.
    pub end_date: Option<NaiveDate>,
    pub description: String,
    /// How far the effects reached.
    pub impact_level: ImpactLevel,
    /// Editorial weight, 1 to 10 inclusive.
    pub significance_rating: i64,
    /// Free-text citations.
    pub sources: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owning era; deleting it deletes the event.
    pub era_id: i64,
    /// Owning event category; deleting it deletes the event.
    pub category_id: i64,
    /// Where it happened. Cleared when the location is deleted.
    pub location_id: Option<i64>,
}

impl HistoricalEvent {
    /// New event starting and dated on `start_date`, with medium impact and
    /// a significance of 5.
    pub fn new(name: &str, start_date: NaiveDate, era_id: i64, category_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.to_string(),
            title: name.chars().take(200).collect(),
            date: start_date,
            start_date,
            end_date: None,
            description: name.to_string(),
            impact_level: ImpactLevel::Medium,
            significance_rating: 5,
            sources: String::new(),
            created_at: now,
            updated_at: now,
            era_id,
            category_id,
            location_id: None,
        }
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

impl Validate for HistoricalEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.text("title", &self.title, 200);
        v.required("description", &self.description);
        v.range("significance_rating", self.significance_rating, 1, 10);
        v.date_order("end_date", self.start_date, self.end_date);
        v.finish()
    }
}

fn event_from_row(row: &Row) -> rusqlite::Result<HistoricalEvent> {
    Ok(HistoricalEvent {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        date: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        description: row.get(6)?,
        impact_level: row.get(7)?,
        significance_rating: row.get(8)?,
        sources: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        era_id: row.get(12)?,
        category_id: row.get(13)?,
        location_id: row.get(14)?,
    })
}

pub struct HistoricalEvents<'a> {
    conn: &'a Connection,
}

impl<'a> HistoricalEvents<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Validates and writes an event, refreshing `updated_at`.
    pub fn save(&self, event: &mut HistoricalEvent) -> StoreResult<i64> {
        event.validate()?;
        event.updated_at = Utc::now();
        save_row(
            self.conn,
            "historical event",
            &mut event.id,
            INSERT_EVENT,
            UPDATE_EVENT,
            params![
                event.name,
                event.title,
                event.date,
                event.start_date,
                event.end_date,
                event.description,
                event.impact_level,
                event.significance_rating,
                event.sources,
                event.created_at,
                event.updated_at,
                event.era_id,
                event.category_id,
                event.location_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<HistoricalEvent> {
        require(self.conn, "historical event", id, &format!("{} WHERE id = ?1", SELECT_EVENTS), [id], event_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<HistoricalEvent>> {
        fetch_all(self.conn, &format!("{} ORDER BY start_date, id", SELECT_EVENTS), [], event_from_row)
    }

    pub fn list_by_era(&self, era_id: i64) -> StoreResult<Vec<HistoricalEvent>> {
        fetch_all(self.conn, &format!("{} WHERE era_id = ?1 ORDER BY start_date, id", SELECT_EVENTS), [era_id], event_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_events", "historical event", id)
    }

    /// Marks `to` as related to `from`. The relation is one-directional.
    pub fn add_related(&self, from: i64, to: i64) -> StoreResult<()> {
        RELATED_EVENTS.add(self.conn, from, to)
    }

    pub fn remove_related(&self, from: i64, to: i64) -> StoreResult<()> {
        RELATED_EVENTS.remove(self.conn, from, to)
    }

    pub fn related_events(&self, event_id: i64) -> StoreResult<Vec<i64>> {
        RELATED_EVENTS.right_ids(self.conn, event_id)
    }

    /// Events that list `event_id` as related.
    pub fn related_from(&self, event_id: i64) -> StoreResult<Vec<i64>> {
        RELATED_EVENTS.left_ids(self.conn, event_id)
    }

    pub fn set_categories(&self, event_id: i64, category_ids: &[i64]) -> StoreResult<()> {
        CATEGORIES.set(self.conn, event_id, category_ids)
    }

    pub fn categories(&self, event_id: i64) -> StoreResult<Vec<i64>> {
        CATEGORIES.right_ids(self.conn, event_id)
    }

    pub fn set_key_figures(&self, event_id: i64, figure_ids: &[i64]) -> StoreResult<()> {
        KEY_FIGURES.set(self.conn, event_id, figure_ids)
    }

    pub fn key_figures(&self, event_id: i64) -> StoreResult<Vec<i64>> {
        KEY_FIGURES.right_ids(self.conn, event_id)
    }
}
