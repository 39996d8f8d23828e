use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_FIGURE: &str = "INSERT INTO historical_figures (name, birth_date, death_date, biography, bio, image, birthplace_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const UPDATE_FIGURE: &str = "UPDATE historical_figures
    SET name = ?1, birth_date = ?2, death_date = ?3, biography = ?4, bio = ?5, image = ?6, birthplace_id = ?7
    WHERE id = ?8";
const SELECT_FIGURES: &str = "SELECT id, name, birth_date, death_date, biography, bio, image, birthplace_id FROM historical_figures";

const ASSOCIATED_EVENTS: Link = Link::new("historical_figure_events", "figure_id", "event_id");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalFigure {
    pub id: Option<i64>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub biography: String,
    pub bio: String,
    pub image: Option<String>,
    pub birthplace_id: Option<i64>,
}

impl HistoricalFigure {
    pub fn new(name: &str, biography: &str, bio: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            birth_date: None,
            death_date: None,
            biography: biography.to_string(),
            bio: bio.to_string(),
            image: None,
            birthplace_id: None,
        }
    }
}

impl Validate for HistoricalFigure {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 200);
        v.required("biography", &self.biography);
        v.required("bio", &self.bio);
        if let Some(image) = &self.image {
            v.max_length("image", image, 100);
        }
        v.finish()
    }
}

fn figure_from_row(row: &Row) -> rusqlite::Result<HistoricalFigure> {
    Ok(HistoricalFigure {
        id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        death_date: row.get(3)?,
        biography: row.get(4)?,
        bio: row.get(5)?,
        image: row.get(6)?,
        birthplace_id: row.get(7)?,
    })
}

pub struct HistoricalFigures<'a> {
    conn: &'a Connection,
}

impl<'a> HistoricalFigures<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, figure: &mut HistoricalFigure) -> StoreResult<i64> {
        figure.validate()?;
        save_row(
            self.conn,
            "historical figure",
            &mut figure.id,
            INSERT_FIGURE,
            UPDATE_FIGURE,
            params![
                figure.name,
                figure.birth_date,
                figure.death_date,
                figure.biography,
                figure.bio,
                figure.image,
                figure.birthplace_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<HistoricalFigure> {
        require(self.conn, "historical figure", id, &format!("{} WHERE id = ?1", SELECT_FIGURES), [id], figure_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<HistoricalFigure>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_FIGURES), [], figure_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "historical_figures", "historical figure", id)
    }

    pub fn set_associated_events(&self, figure_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        ASSOCIATED_EVENTS.set(self.conn, figure_id, event_ids)
    }

    pub fn associated_events(&self, figure_id: i64) -> StoreResult<Vec<i64>> {
        ASSOCIATED_EVENTS.right_ids(self.conn, figure_id)
    }
}
