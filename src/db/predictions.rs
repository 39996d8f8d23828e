use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_PREDICTION: &str = "INSERT INTO predictions
    (name, description, prediction_text, prediction_date, confidence_level, predicted_event_id, scenario_id, user_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const UPDATE_PREDICTION: &str = "UPDATE predictions SET
    name = ?1, description = ?2, prediction_text = ?3, prediction_date = ?4, confidence_level = ?5,
    predicted_event_id = ?6, scenario_id = ?7, user_id = ?8
    WHERE id = ?9";
const SELECT_PREDICTIONS: &str = "SELECT id, name, description, prediction_text, prediction_date, confidence_level,
    predicted_event_id, scenario_id, user_id FROM predictions";

const BASED_ON_EVENTS: Link = Link::new("prediction_based_on_events", "prediction_id", "event_id");
const PREDICTED_EVENTS: Link = Link::new("prediction_predicted_events", "prediction_id", "event_id");

/// A user's prediction made within a scenario.
///
/// `confidence_level` is stored as given; no range is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub prediction_text: String,
    pub prediction_date: NaiveDate,
    pub confidence_level: f64,
    pub predicted_event_id: Option<i64>,
    pub scenario_id: i64,
    pub user_id: i64,
}

impl Prediction {
    pub fn new(name: &str, prediction_text: &str, prediction_date: NaiveDate, scenario_id: i64, user_id: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: name.to_string(),
            prediction_text: prediction_text.to_string(),
            prediction_date,
            confidence_level: 0.5,
            predicted_event_id: None,
            scenario_id,
            user_id,
        }
    }
}

impl Validate for Prediction {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.required("prediction_text", &self.prediction_text);
        v.finite("confidence_level", self.confidence_level);
        v.finish()
    }
}

fn prediction_from_row(row: &Row) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        prediction_text: row.get(3)?,
        prediction_date: row.get(4)?,
        confidence_level: row.get(5)?,
        predicted_event_id: row.get(6)?,
        scenario_id: row.get(7)?,
        user_id: row.get(8)?,
    })
}

pub struct Predictions<'a> {
    conn: &'a Connection,
}

impl<'a> Predictions<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, prediction: &mut Prediction) -> StoreResult<i64> {
        prediction.validate()?;
        save_row(
            self.conn,
            "prediction",
            &mut prediction.id,
            INSERT_PREDICTION,
            UPDATE_PREDICTION,
            params![
                prediction.name,
                prediction.description,
                prediction.prediction_text,
                prediction.prediction_date,
                prediction.confidence_level,
                prediction.predicted_event_id,
                prediction.scenario_id,
                prediction.user_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Prediction> {
        require(self.conn, "prediction", id, &format!("{} WHERE id = ?1", SELECT_PREDICTIONS), [id], prediction_from_row)
    }

    pub fn list_for_scenario(&self, scenario_id: i64) -> StoreResult<Vec<Prediction>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE scenario_id = ?1 ORDER BY prediction_date, id", SELECT_PREDICTIONS),
            [scenario_id],
            prediction_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "predictions", "prediction", id)
    }

    pub fn set_based_on(&self, prediction_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        BASED_ON_EVENTS.set(self.conn, prediction_id, event_ids)
    }

    pub fn based_on(&self, prediction_id: i64) -> StoreResult<Vec<i64>> {
        BASED_ON_EVENTS.right_ids(self.conn, prediction_id)
    }

    pub fn set_predicted_events(&self, prediction_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        PREDICTED_EVENTS.set(self.conn, prediction_id, event_ids)
    }

    pub fn predicted_events(&self, prediction_id: i64) -> StoreResult<Vec<i64>> {
        PREDICTED_EVENTS.right_ids(self.conn, prediction_id)
    }
}
