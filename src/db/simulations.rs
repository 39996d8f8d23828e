//! Interactive simulations of alternative scenarios and the decisions users
//! make while playing them.

use crate::db::error::StoreResult;
use crate::db::query::{append_row, delete_row, fetch_all, require, save_row};
use crate::libs::choices::int_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const INSERT_SIMULATION: &str = "INSERT INTO simulations (title, scenario_id, parameters, difficulty_level) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_SIMULATION: &str = "UPDATE simulations SET title = ?1, scenario_id = ?2, parameters = ?3, difficulty_level = ?4 WHERE id = ?5";
const SELECT_SIMULATIONS: &str = "SELECT id, title, scenario_id, parameters, difficulty_level FROM simulations";

const INSERT_DECISION: &str =
    "INSERT INTO user_decisions (decision_point, choice_made, outcome, user_id, simulation_id) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_DECISIONS: &str = "SELECT id, decision_point, choice_made, outcome, user_id, simulation_id FROM user_decisions";

int_choices! {
    pub enum Difficulty {
        Easy = 1 => "Easy",
        Medium = 2 => "Medium",
        Hard = 3 => "Hard",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: Option<i64>,
    pub title: String,
    /// The alternative scenario being simulated.
    pub scenario_id: i64,
    pub parameters: Value,
    pub difficulty_level: Difficulty,
}

impl Simulation {
    pub fn new(title: &str, scenario_id: i64, difficulty_level: Difficulty) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            scenario_id,
            parameters: Value::Object(Default::default()),
            difficulty_level,
        }
    }
}

impl Validate for Simulation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 200);
        if self.parameters.is_null() {
            v.add("parameters", "This field cannot be null.");
        }
        v.finish()
    }
}

fn simulation_from_row(row: &Row) -> rusqlite::Result<Simulation> {
    Ok(Simulation {
        id: row.get(0)?,
        title: row.get(1)?,
        scenario_id: row.get(2)?,
        parameters: row.get(3)?,
        difficulty_level: row.get(4)?,
    })
}

/// A choice a user made at one point of a simulation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecision {
    pub id: Option<i64>,
    pub decision_point: String,
    pub choice_made: String,
    pub outcome: String,
    pub user_id: i64,
    pub simulation_id: i64,
}

impl UserDecision {
    pub fn new(simulation_id: i64, user_id: i64, decision_point: &str, choice_made: &str, outcome: &str) -> Self {
        Self {
            id: None,
            decision_point: decision_point.to_string(),
            choice_made: choice_made.to_string(),
            outcome: outcome.to_string(),
            user_id,
            simulation_id,
        }
    }
}

impl Validate for UserDecision {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.id.is_some() {
            v.add("id", "Decisions cannot be modified once recorded.");
        }
        v.text("decision_point", &self.decision_point, 200);
        v.required("choice_made", &self.choice_made);
        v.required("outcome", &self.outcome);
        v.finish()
    }
}

fn decision_from_row(row: &Row) -> rusqlite::Result<UserDecision> {
    Ok(UserDecision {
        id: row.get(0)?,
        decision_point: row.get(1)?,
        choice_made: row.get(2)?,
        outcome: row.get(3)?,
        user_id: row.get(4)?,
        simulation_id: row.get(5)?,
    })
}

pub struct Simulations<'a> {
    conn: &'a Connection,
}

impl<'a> Simulations<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, simulation: &mut Simulation) -> StoreResult<i64> {
        simulation.validate()?;
        save_row(
            self.conn,
            "simulation",
            &mut simulation.id,
            INSERT_SIMULATION,
            UPDATE_SIMULATION,
            params![simulation.title, simulation.scenario_id, simulation.parameters, simulation.difficulty_level],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Simulation> {
        require(self.conn, "simulation", id, &format!("{} WHERE id = ?1", SELECT_SIMULATIONS), [id], simulation_from_row)
    }

    pub fn list_for_scenario(&self, scenario_id: i64) -> StoreResult<Vec<Simulation>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE scenario_id = ?1 ORDER BY difficulty_level, id", SELECT_SIMULATIONS),
            [scenario_id],
            simulation_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "simulations", "simulation", id)
    }

    /// Appends a decision. Decisions are never updated.
    pub fn record_decision(&self, decision: &mut UserDecision) -> StoreResult<i64> {
        decision.validate()?;
        let id = append_row(
            self.conn,
            "user decision",
            INSERT_DECISION,
            params![decision.decision_point, decision.choice_made, decision.outcome, decision.user_id, decision.simulation_id],
        )?;
        decision.id = Some(id);
        Ok(id)
    }

    /// Decisions made in a simulation, in the order they were recorded.
    pub fn decisions(&self, simulation_id: i64) -> StoreResult<Vec<UserDecision>> {
        fetch_all(self.conn, &format!("{} WHERE simulation_id = ?1 ORDER BY id", SELECT_DECISIONS), [simulation_id], decision_from_row)
    }
}
