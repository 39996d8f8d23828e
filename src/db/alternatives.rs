//! Alternative outcomes proposed for a real event.

use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_ALTERNATIVE: &str = "INSERT INTO alternative_scenarios
    (original_event_id, title, description, probability, created_by_id, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_ALTERNATIVE: &str = "UPDATE alternative_scenarios SET
    original_event_id = ?1, title = ?2, description = ?3, probability = ?4, created_by_id = ?5, created_at = ?6
    WHERE id = ?7";
const SELECT_ALTERNATIVES: &str =
    "SELECT id, original_event_id, title, description, probability, created_by_id, created_at FROM alternative_scenarios";

pub const PROBABILITY_MIN: i64 = 1;
pub const PROBABILITY_MAX: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeScenario {
    pub id: Option<i64>,
    pub original_event_id: i64,
    pub title: String,
    pub description: String,
    /// Estimated likelihood in percent, 1 to 100 inclusive.
    pub probability: i64,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
}

impl AlternativeScenario {
    pub fn new(original_event_id: i64, title: &str, description: &str, probability: i64, created_by_id: i64) -> Self {
        Self {
            id: None,
            original_event_id,
            title: title.to_string(),
            description: description.to_string(),
            probability,
            created_by_id,
            created_at: Utc::now(),
        }
    }
}

impl Validate for AlternativeScenario {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 200);
        v.required("description", &self.description);
        v.range("probability", self.probability, PROBABILITY_MIN, PROBABILITY_MAX);
        v.finish()
    }
}

fn alternative_from_row(row: &Row) -> rusqlite::Result<AlternativeScenario> {
    Ok(AlternativeScenario {
        id: row.get(0)?,
        original_event_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        probability: row.get(4)?,
        created_by_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub struct AlternativeScenarios<'a> {
    conn: &'a Connection,
}

impl<'a> AlternativeScenarios<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, alternative: &mut AlternativeScenario) -> StoreResult<i64> {
        alternative.validate()?;
        save_row(
            self.conn,
            "alternative scenario",
            &mut alternative.id,
            INSERT_ALTERNATIVE,
            UPDATE_ALTERNATIVE,
            params![
                alternative.original_event_id,
                alternative.title,
                alternative.description,
                alternative.probability,
                alternative.created_by_id,
                alternative.created_at
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<AlternativeScenario> {
        require(self.conn, "alternative scenario", id, &format!("{} WHERE id = ?1", SELECT_ALTERNATIVES), [id], alternative_from_row)
    }

    /// Alternatives of an event, most likely first.
    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<AlternativeScenario>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE original_event_id = ?1 ORDER BY probability DESC, id", SELECT_ALTERNATIVES),
            [event_id],
            alternative_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "alternative_scenarios", "alternative scenario", id)
    }
}
