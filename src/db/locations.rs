use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_LOCATION: &str = "INSERT INTO locations (name, latitude, longitude, modern_name, country) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_LOCATION: &str = "UPDATE locations SET name = ?1, latitude = ?2, longitude = ?3, modern_name = ?4, country = ?5 WHERE id = ?6";
const SELECT_LOCATIONS: &str = "SELECT id, name, latitude, longitude, modern_name, country FROM locations";

/// Coordinates are decimals with 9 digits, 6 of them after the point.
const COORD_DIGITS: u32 = 9;
const COORD_PLACES: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Option<i64>,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub modern_name: String,
    pub country: String,
}

impl Location {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            latitude: None,
            longitude: None,
            modern_name: String::new(),
            country: String::new(),
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

impl Validate for Location {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 200);
        v.max_length("modern_name", &self.modern_name, 200);
        v.max_length("country", &self.country, 100);
        if let Some(latitude) = self.latitude {
            v.decimal("latitude", latitude, COORD_DIGITS, COORD_PLACES);
        }
        if let Some(longitude) = self.longitude {
            v.decimal("longitude", longitude, COORD_DIGITS, COORD_PLACES);
        }
        v.finish()
    }
}

fn round_coordinate(value: Option<f64>) -> Option<f64> {
    let scale = 10f64.powi(COORD_PLACES as i32);
    value.map(|v| (v * scale).round() / scale)
}

fn location_from_row(row: &Row) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        modern_name: row.get(4)?,
        country: row.get(5)?,
    })
}

pub struct Locations<'a> {
    conn: &'a Connection,
}

impl<'a> Locations<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Saves a location; coordinates are rounded to six decimal places.
    pub fn save(&self, location: &mut Location) -> StoreResult<i64> {
        location.validate()?;
        location.latitude = round_coordinate(location.latitude);
        location.longitude = round_coordinate(location.longitude);
        save_row(
            self.conn,
            "location",
            &mut location.id,
            INSERT_LOCATION,
            UPDATE_LOCATION,
            params![location.name, location.latitude, location.longitude, location.modern_name, location.country],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Location> {
        require(self.conn, "location", id, &format!("{} WHERE id = ?1", SELECT_LOCATIONS), [id], location_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<Location>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_LOCATIONS), [], location_from_row)
    }

    /// Deletes a location. Events and figures keep their rows with the
    /// location cleared; entities and impacts located here are deleted.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "locations", "location", id)
    }
}
