//! Polities, organisations and other long-lived historical entities, and the
//! weighted connections between them.

use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_ENTITY: &str = "INSERT INTO historical_entities (name, description, start_date, end_date, image, location_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_ENTITY: &str = "UPDATE historical_entities SET
    name = ?1, description = ?2, start_date = ?3, end_date = ?4, image = ?5, location_id = ?6
    WHERE id = ?7";
const SELECT_ENTITIES: &str = "SELECT id, name, description, start_date, end_date, image, location_id FROM historical_entities";

const INSERT_CONNECTION: &str = "INSERT INTO historical_connections (relationship_type, strength, evidence, source_id, target_id)
    VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_CONNECTION: &str = "UPDATE historical_connections SET
    relationship_type = ?1, strength = ?2, evidence = ?3, source_id = ?4, target_id = ?5
    WHERE id = ?6";
const SELECT_CONNECTIONS: &str = "SELECT id, relationship_type, strength, evidence, source_id, target_id FROM historical_connections";

const ENTITY_CATEGORIES: Link = Link::new("historical_entity_categories", "entity_id", "category_id");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEntity {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub image: Option<String>,
    pub location_id: i64,
}

impl HistoricalEntity {
    pub fn new(name: &str, description: &str, start_date: NaiveDate, end_date: NaiveDate, location_id: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            start_date,
            end_date,
            image: None,
            location_id,
        }
    }
}

impl Validate for HistoricalEntity {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        if let Some(image) = &self.image {
            v.max_length("image", image, 100);
        }
        v.finish()
    }
}

fn entity_from_row(row: &Row) -> rusqlite::Result<HistoricalEntity> {
    Ok(HistoricalEntity {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        image: row.get(5)?,
        location_id: row.get(6)?,
    })
}

/// A directed, weighted relation between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalConnection {
    pub id: Option<i64>,
    pub relationship_type: String,
    pub strength: f64,
    pub evidence: String,
    pub source_id: i64,
    pub target_id: i64,
}

impl HistoricalConnection {
    pub fn new(source_id: i64, target_id: i64, relationship_type: &str, strength: f64, evidence: &str) -> Self {
        Self {
            id: None,
            relationship_type: relationship_type.to_string(),
            strength,
            evidence: evidence.to_string(),
            source_id,
            target_id,
        }
    }
}

impl Validate for HistoricalConnection {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("relationship_type", &self.relationship_type, 50);
        v.finite("strength", self.strength);
        v.required("evidence", &self.evidence);
        v.finish()
    }
}

fn connection_from_row(row: &Row) -> rusqlite::Result<HistoricalConnection> {
    Ok(HistoricalConnection {
        id: row.get(0)?,
        relationship_type: row.get(1)?,
        strength: row.get(2)?,
        evidence: row.get(3)?,
        source_id: row.get(4)?,
        target_id: row.get(5)?,
    })
}

pub struct HistoricalEntities<'a> {
    conn: &'a Connection,
}

impl<'a> HistoricalEntities<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, entity: &mut HistoricalEntity) -> StoreResult<i64> {
        entity.validate()?;
        save_row(
            self.conn,
            "historical entity",
            &mut entity.id,
            INSERT_ENTITY,
            UPDATE_ENTITY,
            params![entity.name, entity.description, entity.start_date, entity.end_date, entity.image, entity.location_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<HistoricalEntity> {
        require(self.conn, "historical entity", id, &format!("{} WHERE id = ?1", SELECT_ENTITIES), [id], entity_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<HistoricalEntity>> {
        fetch_all(self.conn, &format!("{} ORDER BY start_date, name", SELECT_ENTITIES), [], entity_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_entities", "historical entity", id)
    }

    pub fn set_categories(&self, entity_id: i64, category_ids: &[i64]) -> StoreResult<()> {
        ENTITY_CATEGORIES.set(self.conn, entity_id, category_ids)
    }

    pub fn categories(&self, entity_id: i64) -> StoreResult<Vec<i64>> {
        ENTITY_CATEGORIES.right_ids(self.conn, entity_id)
    }

    pub fn save_connection(&self, connection: &mut HistoricalConnection) -> StoreResult<i64> {
        connection.validate()?;
        save_row(
            self.conn,
            "historical connection",
            &mut connection.id,
            INSERT_CONNECTION,
            UPDATE_CONNECTION,
            params![
                connection.relationship_type,
                connection.strength,
                connection.evidence,
                connection.source_id,
                connection.target_id
            ],
        )
    }

    /// Connections leaving `entity_id`, strongest first.
    pub fn outgoing(&self, entity_id: i64) -> StoreResult<Vec<HistoricalConnection>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE source_id = ?1 ORDER BY strength DESC, id", SELECT_CONNECTIONS),
            [entity_id],
            connection_from_row,
        )
    }

    /// Connections arriving at `entity_id`, strongest first.
    pub fn incoming(&self, entity_id: i64) -> StoreResult<Vec<HistoricalConnection>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE target_id = ?1 ORDER BY strength DESC, id", SELECT_CONNECTIONS),
            [entity_id],
            connection_from_row,
        )
    }

    pub fn delete_connection(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_connections", "historical connection", id)
    }
}
