use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_RELATIONSHIP: &str =
    "INSERT INTO cause_effect_relationships (description, cause_id, effect_id, historical_event_id) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_RELATIONSHIP: &str =
    "UPDATE cause_effect_relationships SET description = ?1, cause_id = ?2, effect_id = ?3, historical_event_id = ?4 WHERE id = ?5";
const SELECT_RELATIONSHIPS: &str = "SELECT id, description, cause_id, effect_id, historical_event_id FROM cause_effect_relationships";

/// Links a cause to an effect in the context of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseEffectRelationship {
    pub id: Option<i64>,
    pub description: String,
    pub cause_id: i64,
    pub effect_id: i64,
    pub historical_event_id: i64,
}

impl CauseEffectRelationship {
    pub fn new(cause_id: i64, effect_id: i64, historical_event_id: i64, description: &str) -> Self {
        Self {
            id: None,
            description: description.to_string(),
            cause_id,
            effect_id,
            historical_event_id,
        }
    }
}

impl Validate for CauseEffectRelationship {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("description", &self.description);
        v.finish()
    }
}

fn relationship_from_row(row: &Row) -> rusqlite::Result<CauseEffectRelationship> {
    Ok(CauseEffectRelationship {
        id: row.get(0)?,
        description: row.get(1)?,
        cause_id: row.get(2)?,
        effect_id: row.get(3)?,
        historical_event_id: row.get(4)?,
    })
}

pub struct CauseEffectRelationships<'a> {
    conn: &'a Connection,
}

impl<'a> CauseEffectRelationships<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, relationship: &mut CauseEffectRelationship) -> StoreResult<i64> {
        relationship.validate()?;
        save_row(
            self.conn,
            "cause-effect relationship",
            &mut relationship.id,
            INSERT_RELATIONSHIP,
            UPDATE_RELATIONSHIP,
            params![relationship.description, relationship.cause_id, relationship.effect_id, relationship.historical_event_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<CauseEffectRelationship> {
        require(
            self.conn,
            "cause-effect relationship",
            id,
            &format!("{} WHERE id = ?1", SELECT_RELATIONSHIPS),
            [id],
            relationship_from_row,
        )
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<CauseEffectRelationship>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE historical_event_id = ?1 ORDER BY id", SELECT_RELATIONSHIPS),
            [event_id],
            relationship_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "cause_effect_relationships", "cause-effect relationship", id)
    }
}
