//! Geopolitical reach of an event over a region.
//!
//! The affected area is kept as a GeoJSON geometry object in a JSON
//! column; only its shape is checked, not its coordinates.

use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const INSERT_IMPACT: &str = "INSERT INTO geopolitical_impacts
    (impact_type, impact_radius, affected_population, geometry, event_id, region_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_IMPACT: &str = "UPDATE geopolitical_impacts SET
    impact_type = ?1, impact_radius = ?2, affected_population = ?3, geometry = ?4, event_id = ?5, region_id = ?6
    WHERE id = ?7";
const SELECT_IMPACTS: &str =
    "SELECT id, impact_type, impact_radius, affected_population, geometry, event_id, region_id FROM geopolitical_impacts";

const GEOMETRY_TYPES: &[&str] = &["Point", "MultiPoint", "LineString", "MultiLineString", "Polygon", "MultiPolygon"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeopoliticalImpact {
    pub id: Option<i64>,
    pub impact_type: String,
    /// Radius in kilometres.
    pub impact_radius: f64,
    pub affected_population: i64,
    pub geometry: Value,
    pub event_id: i64,
    pub region_id: i64,
}

impl GeopoliticalImpact {
    pub fn new(impact_type: &str, geometry: Value, event_id: i64, region_id: i64) -> Self {
        Self {
            id: None,
            impact_type: impact_type.to_string(),
            impact_radius: 0.0,
            affected_population: 0,
            geometry,
            event_id,
            region_id,
        }
    }
}

/// True for a GeoJSON geometry object: a known `type` with `coordinates`,
/// or a `GeometryCollection` of such objects.
pub fn is_geometry(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    match object.get("type").and_then(Value::as_str) {
        Some("GeometryCollection") => object
            .get("geometries")
            .and_then(Value::as_array)
            .is_some_and(|geometries| geometries.iter().all(is_geometry)),
        Some(kind) if GEOMETRY_TYPES.contains(&kind) => object.get("coordinates").is_some_and(Value::is_array),
        _ => false,
    }
}

impl Validate for GeopoliticalImpact {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("impact_type", &self.impact_type, 50);
        v.finite("impact_radius", self.impact_radius);
        if !is_geometry(&self.geometry) {
            v.add("geometry", "Enter a GeoJSON geometry object.");
        }
        v.finish()
    }
}

fn impact_from_row(row: &Row) -> rusqlite::Result<GeopoliticalImpact> {
    Ok(GeopoliticalImpact {
        id: row.get(0)?,
        impact_type: row.get(1)?,
        impact_radius: row.get(2)?,
        affected_population: row.get(3)?,
        geometry: row.get(4)?,
        event_id: row.get(5)?,
        region_id: row.get(6)?,
    })
}

pub struct GeopoliticalImpacts<'a> {
    conn: &'a Connection,
}

impl<'a> GeopoliticalImpacts<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, impact: &mut GeopoliticalImpact) -> StoreResult<i64> {
        impact.validate()?;
        save_row(
            self.conn,
            "geopolitical impact",
            &mut impact.id,
            INSERT_IMPACT,
            UPDATE_IMPACT,
            params![
                impact.impact_type,
                impact.impact_radius,
                impact.affected_population,
                impact.geometry,
                impact.event_id,
                impact.region_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<GeopoliticalImpact> {
        require(self.conn, "geopolitical impact", id, &format!("{} WHERE id = ?1", SELECT_IMPACTS), [id], impact_from_row)
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<GeopoliticalImpact>> {
        fetch_all(self.conn, &format!("{} WHERE event_id = ?1 ORDER BY id", SELECT_IMPACTS), [event_id], impact_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "geopolitical_impacts", "geopolitical impact", id)
    }
}
