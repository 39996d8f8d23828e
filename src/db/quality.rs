//! Quality scores attached to any catalogue record.
//!
//! The scored record is a [`ContentRef`]; it is stored as a content type
//! id plus an object id and must exist when the metrics are saved.
//! Deleting the record removes its metrics.

use crate::db::content_types::{ContentRef, ContentTypes};
use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_METRICS: &str = "INSERT INTO quality_metrics
    (content_type_id, object_id, accuracy_score, completeness_score, source_reliability, peer_review_status)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_METRICS: &str = "UPDATE quality_metrics SET
    content_type_id = ?1, object_id = ?2, accuracy_score = ?3, completeness_score = ?4, source_reliability = ?5,
    peer_review_status = ?6
    WHERE id = ?7";
const SELECT_METRICS: &str = "SELECT id, content_type_id, object_id, accuracy_score, completeness_score, source_reliability,
    peer_review_status FROM quality_metrics";

/// Review scores attached to any catalogue record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub id: Option<i64>,
    /// Record being scored.
    pub target: ContentRef,
    /// Scores are free-scale but must be finite.
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub source_reliability: f64,
    pub peer_review_status: String,
}

impl QualityMetrics {
    pub fn new(target: ContentRef, peer_review_status: &str) -> Self {
        Self {
            id: None,
            target,
            accuracy_score: 0.0,
            completeness_score: 0.0,
            source_reliability: 0.0,
            peer_review_status: peer_review_status.to_string(),
        }
    }

    pub fn scores(mut self, accuracy: f64, completeness: f64, reliability: f64) -> Self {
        self.accuracy_score = accuracy;
        self.completeness_score = completeness;
        self.source_reliability = reliability;
        self
    }
}

impl Validate for QualityMetrics {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.target.object_id() < 0 {
            v.add("object_id", "Ensure this value is greater than or equal to 0.");
        }
        v.finite("accuracy_score", self.accuracy_score);
        v.finite("completeness_score", self.completeness_score);
        v.finite("source_reliability", self.source_reliability);
        v.text("peer_review_status", &self.peer_review_status, 20);
        v.finish()
    }
}

pub struct QualityMetricsStore<'a> {
    conn: &'a Connection,
}

impl<'a> QualityMetricsStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Saves metrics after checking that the scored record exists.
    pub fn save(&self, metrics: &mut QualityMetrics) -> StoreResult<i64> {
        metrics.validate()?;
        let content_types = ContentTypes::new(self.conn);
        content_types.ensure_exists(&metrics.target)?;
        let content_type_id = content_types.get_or_create(metrics.target.kind())?;
        save_row(
            self.conn,
            "quality metrics",
            &mut metrics.id,
            INSERT_METRICS,
            UPDATE_METRICS,
            params![
                content_type_id,
                metrics.target.object_id(),
                metrics.accuracy_score,
                metrics.completeness_score,
                metrics.source_reliability,
                metrics.peer_review_status
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<QualityMetrics> {
        let (raw, content_type_id, object_id) =
            require(self.conn, "quality metrics", id, &format!("{} WHERE id = ?1", SELECT_METRICS), [id], raw_metrics_from_row)?;
        self.resolve(raw, content_type_id, object_id)
    }

    /// Every metrics row for `target`, oldest first.
    pub fn for_target(&self, target: &ContentRef) -> StoreResult<Vec<QualityMetrics>> {
        let content_type_id = ContentTypes::new(self.conn).get_or_create(target.kind())?;
        let rows = fetch_all(
            self.conn,
            &format!("{} WHERE content_type_id = ?1 AND object_id = ?2 ORDER BY id", SELECT_METRICS),
            params![content_type_id, target.object_id()],
            raw_metrics_from_row,
        )?;
        rows.into_iter()
            .map(|(raw, content_type_id, object_id)| self.resolve(raw, content_type_id, object_id))
            .collect()
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "quality_metrics", "quality metrics", id)
    }

    fn resolve(&self, mut metrics: QualityMetrics, content_type_id: i64, object_id: i64) -> StoreResult<QualityMetrics> {
        metrics.target = ContentTypes::new(self.conn).resolve(content_type_id, object_id)?;
        Ok(metrics)
    }
}

/// Reads a row with a placeholder target; the caller resolves the real one.
fn raw_metrics_from_row(row: &Row) -> rusqlite::Result<(QualityMetrics, i64, i64)> {
    let content_type_id: i64 = row.get(1)?;
    let object_id: i64 = row.get(2)?;
    let metrics = QualityMetrics {
        id: row.get(0)?,
        target: ContentRef::Event(object_id),
        accuracy_score: row.get(3)?,
        completeness_score: row.get(4)?,
        source_reliability: row.get(5)?,
        peer_review_status: row.get(6)?,
    };
    Ok((metrics, content_type_id, object_id))
}
