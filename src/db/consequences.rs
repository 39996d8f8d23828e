use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_CONSEQUENCE: &str = "INSERT INTO consequences (event_id, description, impact_level, timeframe) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_CONSEQUENCE: &str = "UPDATE consequences SET event_id = ?1, description = ?2, impact_level = ?3, timeframe = ?4 WHERE id = ?5";
const SELECT_CONSEQUENCES: &str = "SELECT id, event_id, description, impact_level, timeframe FROM consequences";

pub const IMPACT_MIN: i64 = 1;
pub const IMPACT_MAX: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    pub id: Option<i64>,
    pub event_id: i64,
    pub description: String,
    /// 1 (negligible) to 10 (world-changing).
    pub impact_level: i64,
    pub timeframe: String,
}

impl Consequence {
    pub fn new(event_id: i64, description: &str, impact_level: i64, timeframe: &str) -> Self {
        Self {
            id: None,
            event_id,
            description: description.to_string(),
            impact_level,
            timeframe: timeframe.to_string(),
        }
    }
}

impl Validate for Consequence {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("description", &self.description);
        v.range("impact_level", self.impact_level, IMPACT_MIN, IMPACT_MAX);
        v.text("timeframe", &self.timeframe, 100);
        v.finish()
    }
}

fn consequence_from_row(row: &Row) -> rusqlite::Result<Consequence> {
    Ok(Consequence {
        id: row.get(0)?,
        event_id: row.get(1)?,
        description: row.get(2)?,
        impact_level: row.get(3)?,
        timeframe: row.get(4)?,
    })
}

pub struct Consequences<'a> {
    conn: &'a Connection,
}

impl<'a> Consequences<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, consequence: &mut Consequence) -> StoreResult<i64> {
        consequence.validate()?;
        save_row(
            self.conn,
            "consequence",
            &mut consequence.id,
            INSERT_CONSEQUENCE,
            UPDATE_CONSEQUENCE,
            params![consequence.event_id, consequence.description, consequence.impact_level, consequence.timeframe],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Consequence> {
        require(self.conn, "consequence", id, &format!("{} WHERE id = ?1", SELECT_CONSEQUENCES), [id], consequence_from_row)
    }

    /// Consequences of an event, most severe first.
    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Consequence>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE event_id = ?1 ORDER BY impact_level DESC, id", SELECT_CONSEQUENCES),
            [event_id],
            consequence_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "consequences", "consequence", id)
    }
}
