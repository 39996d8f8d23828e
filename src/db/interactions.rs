//! Append-only log of user activity.
//!
//! Interactions are recorded once and never edited, so the repository has
//! no update operation. Deleting the user or the referenced event or
//! scenario removes the entries with it.

use crate::db::error::StoreResult;
use crate::db::query::{append_row, fetch_all, require};
use crate::libs::choices::text_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_INTERACTION: &str = "INSERT INTO interactions (interaction_type, timestamp, details, user_id, event_id, scenario_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_INTERACTIONS: &str = "SELECT id, interaction_type, timestamp, details, user_id, event_id, scenario_id FROM interactions";

text_choices! {
    pub enum InteractionType {
        View = "view" => "View",
        Edit = "edit" => "Edit",
        Create = "create" => "Create",
        Predict = "predict" => "Predict",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Option<i64>,
    pub interaction_type: InteractionType,
    pub timestamp: DateTime<Utc>,
    pub details: String,
    pub user_id: i64,
    pub event_id: Option<i64>,
    pub scenario_id: Option<i64>,
}

impl Interaction {
    pub fn new(user_id: i64, interaction_type: InteractionType) -> Self {
        Self {
            id: None,
            interaction_type,
            timestamp: Utc::now(),
            details: String::new(),
            user_id,
            event_id: None,
            scenario_id: None,
        }
    }

    pub fn on_event(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn on_scenario(mut self, scenario_id: i64) -> Self {
        self.scenario_id = Some(scenario_id);
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }
}

impl Validate for Interaction {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.id.is_some() {
            v.add("id", "Interactions cannot be modified once recorded.");
        }
        v.finish()
    }
}

fn interaction_from_row(row: &Row) -> rusqlite::Result<Interaction> {
    Ok(Interaction {
        id: row.get(0)?,
        interaction_type: row.get(1)?,
        timestamp: row.get(2)?,
        details: row.get(3)?,
        user_id: row.get(4)?,
        event_id: row.get(5)?,
        scenario_id: row.get(6)?,
    })
}

pub struct Interactions<'a> {
    conn: &'a Connection,
}

impl<'a> Interactions<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Appends an interaction and returns its id. Recording an interaction
    /// that already has an id fails validation.
    pub fn record(&self, interaction: &mut Interaction) -> StoreResult<i64> {
        interaction.validate()?;
        let id = append_row(
            self.conn,
            "interaction",
            INSERT_INTERACTION,
            params![
                interaction.interaction_type,
                interaction.timestamp,
                interaction.details,
                interaction.user_id,
                interaction.event_id,
                interaction.scenario_id
            ],
        )?;
        interaction.id = Some(id);
        Ok(id)
    }

    pub fn get(&self, id: i64) -> StoreResult<Interaction> {
        require(self.conn, "interaction", id, &format!("{} WHERE id = ?1", SELECT_INTERACTIONS), [id], interaction_from_row)
    }

    /// A user's interactions in the order they were recorded.
    pub fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Interaction>> {
        fetch_all(self.conn, &format!("{} WHERE user_id = ?1 ORDER BY id", SELECT_INTERACTIONS), [user_id], interaction_from_row)
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Interaction>> {
        fetch_all(self.conn, &format!("{} WHERE event_id = ?1 ORDER BY id", SELECT_INTERACTIONS), [event_id], interaction_from_row)
    }
}
