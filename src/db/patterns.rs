//! Detected historical patterns and the predictive models built on them.
//!
//! Confidence and probability values are stored as given; no range is
//! imposed on either.

use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_PATTERN: &str =
    "INSERT INTO historical_patterns (name, description, pattern_type, confidence, detected_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_PATTERN: &str = "UPDATE historical_patterns SET
    name = ?1, description = ?2, pattern_type = ?3, confidence = ?4, detected_at = ?5
    WHERE id = ?6";
const SELECT_PATTERNS: &str = "SELECT id, name, description, pattern_type, confidence, detected_at FROM historical_patterns";

const INSERT_MODEL: &str =
    "INSERT INTO predictive_models (name, description, predicted_outcome, probability, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_MODEL: &str = "UPDATE predictive_models SET
    name = ?1, description = ?2, predicted_outcome = ?3, probability = ?4, created_at = ?5
    WHERE id = ?6";
const SELECT_MODELS: &str = "SELECT id, name, description, predicted_outcome, probability, created_at FROM predictive_models";

const PATTERN_EVENTS: Link = Link::new("historical_pattern_events", "pattern_id", "event_id");
const MODEL_PATTERNS: Link = Link::new("predictive_model_patterns", "model_id", "pattern_id");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPattern {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub pattern_type: String,
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}

impl HistoricalPattern {
    pub fn new(name: &str, description: &str, pattern_type: &str, confidence: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            pattern_type: pattern_type.to_string(),
            confidence,
            detected_at: Utc::now(),
        }
    }
}

impl Validate for HistoricalPattern {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.text("pattern_type", &self.pattern_type, 50);
        v.finite("confidence", self.confidence);
        v.finish()
    }
}

fn pattern_from_row(row: &Row) -> rusqlite::Result<HistoricalPattern> {
    Ok(HistoricalPattern {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        pattern_type: row.get(3)?,
        confidence: row.get(4)?,
        detected_at: row.get(5)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveModel {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub predicted_outcome: String,
    pub probability: f64,
    pub created_at: DateTime<Utc>,
}

impl PredictiveModel {
    pub fn new(name: &str, description: &str, predicted_outcome: &str, probability: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            predicted_outcome: predicted_outcome.to_string(),
            probability,
            created_at: Utc::now(),
        }
    }
}

impl Validate for PredictiveModel {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.required("predicted_outcome", &self.predicted_outcome);
        v.finite("probability", self.probability);
        v.finish()
    }
}

fn model_from_row(row: &Row) -> rusqlite::Result<PredictiveModel> {
    Ok(PredictiveModel {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        predicted_outcome: row.get(3)?,
        probability: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub struct HistoricalPatterns<'a> {
    conn: &'a Connection,
}

impl<'a> HistoricalPatterns<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, pattern: &mut HistoricalPattern) -> StoreResult<i64> {
        pattern.validate()?;
        save_row(
            self.conn,
            "historical pattern",
            &mut pattern.id,
            INSERT_PATTERN,
            UPDATE_PATTERN,
            params![pattern.name, pattern.description, pattern.pattern_type, pattern.confidence, pattern.detected_at],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<HistoricalPattern> {
        require(self.conn, "historical pattern", id, &format!("{} WHERE id = ?1", SELECT_PATTERNS), [id], pattern_from_row)
    }

    /// Patterns, most confident first.
    pub fn list(&self) -> StoreResult<Vec<HistoricalPattern>> {
        fetch_all(self.conn, &format!("{} ORDER BY confidence DESC, id", SELECT_PATTERNS), [], pattern_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_patterns", "historical pattern", id)
    }

    pub fn set_events(&self, pattern_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        PATTERN_EVENTS.set(self.conn, pattern_id, event_ids)
    }

    pub fn events(&self, pattern_id: i64) -> StoreResult<Vec<i64>> {
        PATTERN_EVENTS.right_ids(self.conn, pattern_id)
    }
}

pub struct PredictiveModels<'a> {
    conn: &'a Connection,
}

impl<'a> PredictiveModels<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, model: &mut PredictiveModel) -> StoreResult<i64> {
        model.validate()?;
        save_row(
            self.conn,
            "predictive model",
            &mut model.id,
            INSERT_MODEL,
            UPDATE_MODEL,
            params![model.name, model.description, model.predicted_outcome, model.probability, model.created_at],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<PredictiveModel> {
        require(self.conn, "predictive model", id, &format!("{} WHERE id = ?1", SELECT_MODELS), [id], model_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<PredictiveModel>> {
        fetch_all(self.conn, &format!("{} ORDER BY created_at DESC, id DESC", SELECT_MODELS), [], model_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "predictive_models", "predictive model", id)
    }

    pub fn set_patterns(&self, model_id: i64, pattern_ids: &[i64]) -> StoreResult<()> {
        MODEL_PATTERNS.set(self.conn, model_id, pattern_ids)
    }

    pub fn patterns(&self, model_id: i64) -> StoreResult<Vec<i64>> {
        MODEL_PATTERNS.right_ids(self.conn, model_id)
    }
}
