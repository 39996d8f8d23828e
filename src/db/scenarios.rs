//! User scenarios and their per-event overrides.
//!
//! A [`Scenario`] reimagines a set of events. Each participating event is
//! attached through a [`ScenarioEvent`], which carries the altered dates,
//! the imagined outcome and its impact.

use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::choices::int_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_SCENARIO: &str = "INSERT INTO scenarios (title, description, creation_date, created_by_id) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_SCENARIO: &str = "UPDATE scenarios SET title = ?1, description = ?2, creation_date = ?3, created_by_id = ?4 WHERE id = ?5";
const SELECT_SCENARIOS: &str = "SELECT id, title, description, creation_date, created_by_id FROM scenarios";

const INSERT_SCENARIO_EVENT: &str = "INSERT INTO scenario_events
    (scenario_id, event_id, altered_start_date, altered_end_date, outcome, impact)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_SCENARIO_EVENT: &str = "UPDATE scenario_events SET
    scenario_id = ?1, event_id = ?2, altered_start_date = ?3, altered_end_date = ?4, outcome = ?5, impact = ?6
    WHERE id = ?7";
const SELECT_SCENARIO_EVENTS: &str =
    "SELECT id, scenario_id, event_id, altered_start_date, altered_end_date, outcome, impact FROM scenario_events";

int_choices! {
    /// Impact of an altered event on the scenario.
    pub enum ScenarioImpact {
        Minor = 1 => "Minor",
        Significant = 2 => "Significant",
        Major = 3 => "Major",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub creation_date: DateTime<Utc>,
    pub created_by_id: Option<i64>,
}

impl Scenario {
    pub fn new(title: &str, description: &str, created_by_id: Option<i64>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            description: description.to_string(),
            creation_date: Utc::now(),
            created_by_id,
        }
    }
}

impl Validate for Scenario {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 255);
        v.required("description", &self.description);
        v.finish()
    }
}

fn scenario_from_row(row: &Row) -> rusqlite::Result<Scenario> {
    Ok(Scenario {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        creation_date: row.get(3)?,
        created_by_id: row.get(4)?,
    })
}

/// One event as it plays out inside a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub id: Option<i64>,
    pub scenario_id: i64,
    pub event_id: i64,
    pub altered_start_date: Option<NaiveDate>,
    pub altered_end_date: Option<NaiveDate>,
    pub outcome: String,
    pub impact: ScenarioImpact,
}

impl ScenarioEvent {
    pub fn new(scenario_id: i64, event_id: i64, outcome: &str, impact: ScenarioImpact) -> Self {
        Self {
            id: None,
            scenario_id,
            event_id,
            altered_start_date: None,
            altered_end_date: None,
            outcome: outcome.to_string(),
            impact,
        }
    }
}

impl Validate for ScenarioEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("outcome", &self.outcome);
        if let Some(start) = self.altered_start_date {
            v.date_order("altered_end_date", start, self.altered_end_date);
        }
        v.finish()
    }
}

fn scenario_event_from_row(row: &Row) -> rusqlite::Result<ScenarioEvent> {
    Ok(ScenarioEvent {
        id: row.get(0)?,
        scenario_id: row.get(1)?,
        event_id: row.get(2)?,
        altered_start_date: row.get(3)?,
        altered_end_date: row.get(4)?,
        outcome: row.get(5)?,
        impact: row.get(6)?,
    })
}

pub struct Scenarios<'a> {
    conn: &'a Connection,
}

impl<'a> Scenarios<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, scenario: &mut Scenario) -> StoreResult<i64> {
        scenario.validate()?;
        save_row(
            self.conn,
            "scenario",
            &mut scenario.id,
            INSERT_SCENARIO,
            UPDATE_SCENARIO,
            params![scenario.title, scenario.description, scenario.creation_date, scenario.created_by_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Scenario> {
        require(self.conn, "scenario", id, &format!("{} WHERE id = ?1", SELECT_SCENARIOS), [id], scenario_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<Scenario>> {
        fetch_all(self.conn, &format!("{} ORDER BY creation_date DESC, id DESC", SELECT_SCENARIOS), [], scenario_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "scenarios", "scenario", id)
    }

    /// Attaches an event to a scenario, or updates an existing attachment.
    pub fn save_event(&self, entry: &mut ScenarioEvent) -> StoreResult<i64> {
        entry.validate()?;
        save_row(
            self.conn,
            "scenario event",
            &mut entry.id,
            INSERT_SCENARIO_EVENT,
            UPDATE_SCENARIO_EVENT,
            params![
                entry.scenario_id,
                entry.event_id,
                entry.altered_start_date,
                entry.altered_end_date,
                entry.outcome,
                entry.impact
            ],
        )
    }

    pub fn get_event(&self, id: i64) -> StoreResult<ScenarioEvent> {
        require(self.conn, "scenario event", id, &format!("{} WHERE id = ?1", SELECT_SCENARIO_EVENTS), [id], scenario_event_from_row)
    }

    /// Events of a scenario in the order they were attached.
    pub fn events(&self, scenario_id: i64) -> StoreResult<Vec<ScenarioEvent>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE scenario_id = ?1 ORDER BY id", SELECT_SCENARIO_EVENTS),
            [scenario_id],
            scenario_event_from_row,
        )
    }

    pub fn remove_event(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "scenario_events", "scenario event", id)
    }
}
