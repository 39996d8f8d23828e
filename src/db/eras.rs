//! Eras with derived, unique slugs.
//!
//! When an era is saved without a slug, the slug is derived from the name
//! with [`slugify`]. Slugs are unique: a second era named "Renaissance"
//! fails with [`StoreError::Conflict`](crate::db::error::StoreError::Conflict)
//! and no row is written.

use crate::db::error::{StoreError, StoreResult};
use crate::db::query::{delete_row, fetch_all, fetch_one, require, save_row};
use crate::libs::messages::Message;
use crate::libs::slug::{is_valid_slug, slugify, SLUG_MAX_LENGTH};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use crate::msg_debug;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_ERA: &str = "INSERT INTO eras (name, start_year, end_year, description, slug) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_ERA: &str = "UPDATE eras SET name = ?1, start_year = ?2, end_year = ?3, description = ?4, slug = ?5 WHERE id = ?6";
const SELECT_ERAS: &str = "SELECT id, name, start_year, end_year, description, slug FROM eras";

/// A named span of years, e.g. the Bronze Age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    pub id: Option<i64>,
    pub name: String,
    /// Negative years are BC.
    pub start_year: i32,
    pub end_year: i32,
    pub description: String,
    /// Unique URL slug, derived from the name when left empty.
    pub slug: String,
}

impl Era {
    /// New era with an empty slug, to be derived on save.
    pub fn new(name: &str, start_year: i32, end_year: i32, description: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            start_year,
            end_year,
            description: description.to_string(),
            slug: String::new(),
        }
    }
}

impl Validate for Era {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 100);
        v.required("description", &self.description);
        if !is_valid_slug(&self.slug) {
            v.add("slug", "Enter a valid slug consisting of letters, numbers, underscores or hyphens.");
        }
        v.max_length("slug", &self.slug, SLUG_MAX_LENGTH);
        v.finish()
    }
}

fn era_from_row(row: &Row) -> rusqlite::Result<Era> {
    Ok(Era {
        id: row.get(0)?,
        name: row.get(1)?,
        start_year: row.get(2)?,
        end_year: row.get(3)?,
        description: row.get(4)?,
        slug: row.get(5)?,
    })
}

pub struct Eras<'a> {
    conn: &'a Connection,
}

impl<'a> Eras<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts or updates an era, deriving its slug from the name when empty.
    ///
    /// On a validation failure or slug conflict, `era.slug` is left as it
    /// was passed in.
    pub fn save(&self, era: &mut Era) -> StoreResult<i64> {
        let derived = era.slug.is_empty();
        if derived {
            era.slug = slugify(&era.name);
            msg_debug!(Message::SlugDerived(era.name.clone(), era.slug.clone()));
        }

        let result = era
            .validate()
            .map_err(StoreError::from)
            .and_then(|_| {
                save_row(
                    self.conn,
                    "era",
                    &mut era.id,
                    INSERT_ERA,
                    UPDATE_ERA,
                    params![era.name, era.start_year, era.end_year, era.description, era.slug],
                )
            })
            .map_err(|e| e.or_conflict("era", "slug", era.slug.as_str()));

        if result.is_err() && derived {
            era.slug.clear();
        }
        result
    }

    pub fn get(&self, id: i64) -> StoreResult<Era> {
        require(self.conn, "era", id, &format!("{} WHERE id = ?1", SELECT_ERAS), [id], era_from_row)
    }

    pub fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Era>> {
        fetch_one(self.conn, &format!("{} WHERE slug = ?1", SELECT_ERAS), [slug], era_from_row)
    }

    /// All eras in chronological order.
    pub fn list(&self) -> StoreResult<Vec<Era>> {
        fetch_all(self.conn, &format!("{} ORDER BY start_year, name", SELECT_ERAS), [], era_from_row)
    }

    /// Deletes an era together with its events.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "eras", "era", id)
    }
}
