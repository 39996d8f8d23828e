//! Simple name-and-description labels.
//!
//! Four label tables share one shape: [`Category`], [`EventCategory`],
//! [`Cause`] and [`Effect`]. They differ only in table name and the maximum
//! length of the name, so a single [`Label`] record and [`Labels`]
//! repository serve all of them, selected by [`LabelKind`].

use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
    /// Topic categories used by events, entities and learning progress.
    Category,
    /// The primary category every event belongs to.
    EventCategory,
    Cause,
    Effect,
}

impl LabelKind {
    pub fn table(self) -> &'static str {
        match self {
            LabelKind::Category => "categories",
            LabelKind::EventCategory => "event_categories",
            LabelKind::Cause => "causes",
            LabelKind::Effect => "effects",
        }
    }

    pub fn entity(self) -> &'static str {
        match self {
            LabelKind::Category => "category",
            LabelKind::EventCategory => "event category",
            LabelKind::Cause => "cause",
            LabelKind::Effect => "effect",
        }
    }

    pub fn name_max_length(self) -> usize {
        match self {
            LabelKind::Category => 100,
            _ => 255,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: Option<i64>,
    pub kind: LabelKind,
    pub name: String,
    pub description: String,
}

pub type Category = Label;
pub type EventCategory = Label;
pub type Cause = Label;
pub type Effect = Label;

impl Label {
    pub fn new(kind: LabelKind, name: &str, description: &str) -> Self {
        Self {
            id: None,
            kind,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    pub fn category(name: &str, description: &str) -> Self {
        Self::new(LabelKind::Category, name, description)
    }

    pub fn event_category(name: &str, description: &str) -> Self {
        Self::new(LabelKind::EventCategory, name, description)
    }

    pub fn cause(name: &str, description: &str) -> Self {
        Self::new(LabelKind::Cause, name, description)
    }

    pub fn effect(name: &str, description: &str) -> Self {
        Self::new(LabelKind::Effect, name, description)
    }
}

impl Validate for Label {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, self.kind.name_max_length());
        v.required("description", &self.description);
        v.finish()
    }
}

pub struct Labels<'a> {
    conn: &'a Connection,
    kind: LabelKind,
}

impl<'a> Labels<'a> {
    pub fn new(conn: &'a Connection, kind: LabelKind) -> Self {
        Self { conn, kind }
    }

    pub fn categories(conn: &'a Connection) -> Self {
        Self::new(conn, LabelKind::Category)
    }

    pub fn event_categories(conn: &'a Connection) -> Self {
        Self::new(conn, LabelKind::EventCategory)
    }

    pub fn causes(conn: &'a Connection) -> Self {
        Self::new(conn, LabelKind::Cause)
    }

    pub fn effects(conn: &'a Connection) -> Self {
        Self::new(conn, LabelKind::Effect)
    }

    pub fn save(&self, label: &mut Label) -> StoreResult<i64> {
        // A label always lands in the table of its own kind.
        label.kind = self.kind;
        label.validate()?;
        let table = self.kind.table();
        let insert = format!("INSERT INTO {} (name, description) VALUES (?1, ?2)", table);
        let update = format!("UPDATE {} SET name = ?1, description = ?2 WHERE id = ?3", table);
        save_row(self.conn, self.kind.entity(), &mut label.id, &insert, &update, params![label.name, label.description])
    }

    pub fn get(&self, id: i64) -> StoreResult<Label> {
        let sql = format!("SELECT id, name, description FROM {} WHERE id = ?1", self.kind.table());
        require(self.conn, self.kind.entity(), id, &sql, [id], |row| self.label_from_row(row))
    }

    pub fn list(&self) -> StoreResult<Vec<Label>> {
        let sql = format!("SELECT id, name, description FROM {} ORDER BY name", self.kind.table());
        fetch_all(self.conn, &sql, [], |row| self.label_from_row(row))
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, self.kind.table(), self.kind.entity(), id)
    }

    fn label_from_row(&self, row: &Row) -> rusqlite::Result<Label> {
        Ok(Label {
            id: row.get(0)?,
            kind: self.kind,
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }
}
