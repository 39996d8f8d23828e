//! Scholarly debates about an event and the arguments made in them.

use crate::db::error::{StoreError, StoreResult};
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::choices::text_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_DEBATE: &str = "INSERT INTO historical_debates (title, status, topic_id) VALUES (?1, ?2, ?3)";
const UPDATE_DEBATE: &str = "UPDATE historical_debates SET title = ?1, status = ?2, topic_id = ?3 WHERE id = ?4";
const UPDATE_DEBATE_STATUS: &str = "UPDATE historical_debates SET status = ?1 WHERE id = ?2";
const SELECT_DEBATES: &str = "SELECT id, title, status, topic_id FROM historical_debates";

const INSERT_ARGUMENT: &str = "INSERT INTO arguments (content, sources, credibility_score, debate_id, user_id) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_ARGUMENT: &str = "UPDATE arguments SET content = ?1, sources = ?2, credibility_score = ?3, debate_id = ?4, user_id = ?5 WHERE id = ?6";
const SELECT_ARGUMENTS: &str = "SELECT id, content, sources, credibility_score, debate_id, user_id FROM arguments";

text_choices! {
    pub enum DebateStatus {
        Active = "ACTIVE" => "Active",
        Concluded = "CONCLUDED" => "Concluded",
        Archived = "ARCHIVED" => "Archived",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalDebate {
    pub id: Option<i64>,
    pub title: String,
    pub status: DebateStatus,
    /// The event under debate.
    pub topic_id: i64,
}

impl HistoricalDebate {
    /// New debate, open for arguments.
    pub fn new(title: &str, topic_id: i64) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            status: DebateStatus::Active,
            topic_id,
        }
    }
}

impl Validate for HistoricalDebate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 200);
        v.finish()
    }
}

fn debate_from_row(row: &Row) -> rusqlite::Result<HistoricalDebate> {
    Ok(HistoricalDebate {
        id: row.get(0)?,
        title: row.get(1)?,
        status: row.get(2)?,
        topic_id: row.get(3)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub id: Option<i64>,
    pub content: String,
    pub sources: String,
    pub credibility_score: f64,
    pub debate_id: i64,
    pub user_id: i64,
}

impl Argument {
    pub fn new(debate_id: i64, user_id: i64, content: &str, sources: &str) -> Self {
        Self {
            id: None,
            content: content.to_string(),
            sources: sources.to_string(),
            credibility_score: 0.0,
            debate_id,
            user_id,
        }
    }
}

impl Validate for Argument {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("content", &self.content);
        v.required("sources", &self.sources);
        v.finite("credibility_score", self.credibility_score);
        v.finish()
    }
}

fn argument_from_row(row: &Row) -> rusqlite::Result<Argument> {
    Ok(Argument {
        id: row.get(0)?,
        content: row.get(1)?,
        sources: row.get(2)?,
        credibility_score: row.get(3)?,
        debate_id: row.get(4)?,
        user_id: row.get(5)?,
    })
}

pub struct HistoricalDebates<'a> {
    conn: &'a Connection,
}

impl<'a> HistoricalDebates<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, debate: &mut HistoricalDebate) -> StoreResult<i64> {
        debate.validate()?;
        save_row(
            self.conn,
            "historical debate",
            &mut debate.id,
            INSERT_DEBATE,
            UPDATE_DEBATE,
            params![debate.title, debate.status, debate.topic_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<HistoricalDebate> {
        require(self.conn, "historical debate", id, &format!("{} WHERE id = ?1", SELECT_DEBATES), [id], debate_from_row)
    }

    pub fn list_by_status(&self, status: DebateStatus) -> StoreResult<Vec<HistoricalDebate>> {
        fetch_all(self.conn, &format!("{} WHERE status = ?1 ORDER BY id", SELECT_DEBATES), [status], debate_from_row)
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<HistoricalDebate>> {
        fetch_all(self.conn, &format!("{} WHERE topic_id = ?1 ORDER BY id", SELECT_DEBATES), [event_id], debate_from_row)
    }

    /// Moves a debate to `status`. Any status may follow any other.
    pub fn set_status(&self, id: i64, status: DebateStatus) -> StoreResult<()> {
        let affected = self.conn.execute(UPDATE_DEBATE_STATUS, params![status, id])?;
        if affected == 0 {
            return Err(StoreError::not_found("historical debate", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_debates", "historical debate", id)
    }

    pub fn save_argument(&self, argument: &mut Argument) -> StoreResult<i64> {
        argument.validate()?;
        save_row(
            self.conn,
            "argument",
            &mut argument.id,
            INSERT_ARGUMENT,
            UPDATE_ARGUMENT,
            params![argument.content, argument.sources, argument.credibility_score, argument.debate_id, argument.user_id],
        )
    }

    pub fn get_argument(&self, id: i64) -> StoreResult<Argument> {
        require(self.conn, "argument", id, &format!("{} WHERE id = ?1", SELECT_ARGUMENTS), [id], argument_from_row)
    }

    /// Arguments of a debate, most credible first.
    pub fn arguments(&self, debate_id: i64) -> StoreResult<Vec<Argument>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE debate_id = ?1 ORDER BY credibility_score DESC, id", SELECT_ARGUMENTS),
            [debate_id],
            argument_from_row,
        )
    }

    pub fn delete_argument(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "arguments", "argument", id)
    }
}
