//! Simplified timelines and the what-if scenarios branching off them.
//!
//! Unlike [`crate::db::timelines`], a [`WhatIfTimeline`] holds a plain,
//! unordered set of events.

use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_TIMELINE: &str = "INSERT INTO what_if_timelines (name, description) VALUES (?1, ?2)";
const UPDATE_TIMELINE: &str = "UPDATE what_if_timelines SET name = ?1, description = ?2 WHERE id = ?3";
const SELECT_TIMELINES: &str = "SELECT id, name, description FROM what_if_timelines";

const INSERT_SCENARIO: &str = "INSERT INTO what_if_scenarios (name, description, original_timeline_id) VALUES (?1, ?2, ?3)";
const UPDATE_SCENARIO: &str = "UPDATE what_if_scenarios SET name = ?1, description = ?2, original_timeline_id = ?3 WHERE id = ?4";
const SELECT_SCENARIOS: &str = "SELECT id, name, description, original_timeline_id FROM what_if_scenarios";

const TIMELINE_EVENTS: Link = Link::new("what_if_timeline_events", "timeline_id", "event_id");
const MODIFIED_EVENTS: Link = Link::new("what_if_scenario_modified_events", "scenario_id", "event_id");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfTimeline {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
}

impl WhatIfTimeline {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl Validate for WhatIfTimeline {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.finish()
    }
}

fn timeline_from_row(row: &Row) -> rusqlite::Result<WhatIfTimeline> {
    Ok(WhatIfTimeline {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    /// Timeline the scenario branches from.
    pub original_timeline_id: i64,
}

impl WhatIfScenario {
    pub fn new(name: &str, description: &str, original_timeline_id: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            original_timeline_id,
        }
    }
}

impl Validate for WhatIfScenario {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.finish()
    }
}

fn scenario_from_row(row: &Row) -> rusqlite::Result<WhatIfScenario> {
    Ok(WhatIfScenario {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        original_timeline_id: row.get(3)?,
    })
}

pub struct WhatIfTimelines<'a> {
    conn: &'a Connection,
}

impl<'a> WhatIfTimelines<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, timeline: &mut WhatIfTimeline) -> StoreResult<i64> {
        timeline.validate()?;
        save_row(
            self.conn,
            "what-if timeline",
            &mut timeline.id,
            INSERT_TIMELINE,
            UPDATE_TIMELINE,
            params![timeline.name, timeline.description],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<WhatIfTimeline> {
        require(self.conn, "what-if timeline", id, &format!("{} WHERE id = ?1", SELECT_TIMELINES), [id], timeline_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<WhatIfTimeline>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_TIMELINES), [], timeline_from_row)
    }

    /// Deletes a timeline and every scenario branching off it.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "what_if_timelines", "what-if timeline", id)
    }

    pub fn add_event(&self, timeline_id: i64, event_id: i64) -> StoreResult<()> {
        TIMELINE_EVENTS.add(self.conn, timeline_id, event_id)
    }

    pub fn remove_event(&self, timeline_id: i64, event_id: i64) -> StoreResult<()> {
        TIMELINE_EVENTS.remove(self.conn, timeline_id, event_id)
    }

    pub fn set_events(&self, timeline_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        TIMELINE_EVENTS.set(self.conn, timeline_id, event_ids)
    }

    pub fn events(&self, timeline_id: i64) -> StoreResult<Vec<i64>> {
        TIMELINE_EVENTS.right_ids(self.conn, timeline_id)
    }
}

pub struct WhatIfScenarios<'a> {
    conn: &'a Connection,
}

impl<'a> WhatIfScenarios<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, scenario: &mut WhatIfScenario) -> StoreResult<i64> {
        scenario.validate()?;
        save_row(
            self.conn,
            "what-if scenario",
            &mut scenario.id,
            INSERT_SCENARIO,
            UPDATE_SCENARIO,
            params![scenario.name, scenario.description, scenario.original_timeline_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<WhatIfScenario> {
        require(self.conn, "what-if scenario", id, &format!("{} WHERE id = ?1", SELECT_SCENARIOS), [id], scenario_from_row)
    }

    pub fn list_for_timeline(&self, timeline_id: i64) -> StoreResult<Vec<WhatIfScenario>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE original_timeline_id = ?1 ORDER BY name", SELECT_SCENARIOS),
            [timeline_id],
            scenario_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "what_if_scenarios", "what-if scenario", id)
    }

    pub fn set_modified_events(&self, scenario_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        MODIFIED_EVENTS.set(self.conn, scenario_id, event_ids)
    }

    pub fn modified_events(&self, scenario_id: i64) -> StoreResult<Vec<i64>> {
        MODIFIED_EVENTS.right_ids(self.conn, scenario_id)
    }

    /// Scenarios that modify `event_id`.
    pub fn modifying(&self, event_id: i64) -> StoreResult<Vec<i64>> {
        MODIFIED_EVENTS.left_ids(self.conn, event_id)
    }
}
