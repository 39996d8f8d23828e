//! Typed generic references.
//!
//! Some records (quality metrics, free-form tags) may point at *any*
//! catalogue record. The reference is modelled as [`ContentRef`], a tagged
//! union over every referenceable entity, and persisted as a row in
//! `content_types` (app label + model name) plus the object id.
//!
//! ```rust
//! use dejavue::db::content_types::{ContentKind, ContentRef};
//!
//! let target = ContentRef::Event(42);
//! assert_eq!(target.kind(), ContentKind::HistoricalEvent);
//! assert_eq!(target.kind().natural_key(), ("events", "historicalevent"));
//! assert_eq!(target.object_id(), 42);
//! ```

use crate::db::error::{StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

const INSERT_CONTENT_TYPE: &str = "INSERT OR IGNORE INTO content_types (app_label, model) VALUES (?1, ?2)";
const SELECT_CONTENT_TYPE_ID: &str = "SELECT id FROM content_types WHERE app_label = ?1 AND model = ?2";
const SELECT_CONTENT_TYPE_BY_ID: &str = "SELECT app_label, model FROM content_types WHERE id = ?1";

/// Every entity a generic reference may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Era,
    Location,
    HistoricalFigure,
    HistoricalEvent,
    Document,
    Scenario,
    Prediction,
    Consequence,
    AlternativeScenario,
    Timeline,
    Resource,
    HistoricalEntity,
    WhatIfScenario,
    Simulation,
    HistoricalDebate,
    Argument,
}

impl ContentKind {
    pub const ALL: &'static [ContentKind] = &[
        ContentKind::Era,
        ContentKind::Location,
        ContentKind::HistoricalFigure,
        ContentKind::HistoricalEvent,
        ContentKind::Document,
        ContentKind::Scenario,
        ContentKind::Prediction,
        ContentKind::Consequence,
        ContentKind::AlternativeScenario,
        ContentKind::Timeline,
        ContentKind::Resource,
        ContentKind::HistoricalEntity,
        ContentKind::WhatIfScenario,
        ContentKind::Simulation,
        ContentKind::HistoricalDebate,
        ContentKind::Argument,
    ];

    /// `(app_label, model)` pair identifying the kind in `content_types`.
    pub fn natural_key(self) -> (&'static str, &'static str) {
        match self {
            ContentKind::Era => ("events", "era"),
            ContentKind::Location => ("events", "location"),
            ContentKind::HistoricalFigure => ("events", "historicalfigure"),
            ContentKind::HistoricalEvent => ("events", "historicalevent"),
            ContentKind::Document => ("events", "document"),
            ContentKind::Scenario => ("events", "scenario"),
            ContentKind::Prediction => ("events", "prediction"),
            ContentKind::Consequence => ("events", "consequence"),
            ContentKind::AlternativeScenario => ("events", "alternativescenario"),
            ContentKind::Timeline => ("events", "timeline"),
            ContentKind::Resource => ("events", "resource"),
            ContentKind::HistoricalEntity => ("events", "historicalentity"),
            ContentKind::WhatIfScenario => ("timeline", "whatifscenario"),
            ContentKind::Simulation => ("interactions", "simulation"),
            ContentKind::HistoricalDebate => ("interactions", "historicaldebate"),
            ContentKind::Argument => ("interactions", "argument"),
        }
    }

    /// Table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::Era => "eras",
            ContentKind::Location => "locations",
            ContentKind::HistoricalFigure => "historical_figures",
            ContentKind::HistoricalEvent => "historical_events",
            ContentKind::Document => "documents",
            ContentKind::Scenario => "scenarios",
            ContentKind::Prediction => "predictions",
            ContentKind::Consequence => "consequences",
            ContentKind::AlternativeScenario => "alternative_scenarios",
            ContentKind::Timeline => "timelines",
            ContentKind::Resource => "resources",
            ContentKind::HistoricalEntity => "historical_entities",
            ContentKind::WhatIfScenario => "what_if_scenarios",
            ContentKind::Simulation => "simulations",
            ContentKind::HistoricalDebate => "historical_debates",
            ContentKind::Argument => "arguments",
        }
    }

    pub fn from_natural_key(app_label: &str, model: &str) -> Option<Self> {
        ContentKind::ALL.iter().copied().find(|kind| kind.natural_key() == (app_label, model))
    }

    pub fn with_id(self, id: i64) -> ContentRef {
        match self {
            ContentKind::Era => ContentRef::Era(id),
            ContentKind::Location => ContentRef::Location(id),
            ContentKind::HistoricalFigure => ContentRef::Figure(id),
            ContentKind::HistoricalEvent => ContentRef::Event(id),
            ContentKind::Document => ContentRef::Document(id),
            ContentKind::Scenario => ContentRef::Scenario(id),
            ContentKind::Prediction => ContentRef::Prediction(id),
            ContentKind::Consequence => ContentRef::Consequence(id),
            ContentKind::AlternativeScenario => ContentRef::AlternativeScenario(id),
            ContentKind::Timeline => ContentRef::Timeline(id),
            ContentKind::Resource => ContentRef::Resource(id),
            ContentKind::HistoricalEntity => ContentRef::Entity(id),
            ContentKind::WhatIfScenario => ContentRef::WhatIfScenario(id),
            ContentKind::Simulation => ContentRef::Simulation(id),
            ContentKind::HistoricalDebate => ContentRef::Debate(id),
            ContentKind::Argument => ContentRef::Argument(id),
        }
    }
}

/// A reference to one catalogue record of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum ContentRef {
    Era(i64),
    Location(i64),
    Figure(i64),
    Event(i64),
    Document(i64),
    Scenario(i64),
    Prediction(i64),
    Consequence(i64),
    AlternativeScenario(i64),
    Timeline(i64),
    Resource(i64),
    Entity(i64),
    WhatIfScenario(i64),
    Simulation(i64),
    Debate(i64),
    Argument(i64),
}

impl ContentRef {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRef::Era(_) => ContentKind::Era,
            ContentRef::Location(_) => ContentKind::Location,
            ContentRef::Figure(_) => ContentKind::HistoricalFigure,
            ContentRef::Event(_) => ContentKind::HistoricalEvent,
            ContentRef::Document(_) => ContentKind::Document,
            ContentRef::Scenario(_) => ContentKind::Scenario,
            ContentRef::Prediction(_) => ContentKind::Prediction,
            ContentRef::Consequence(_) => ContentKind::Consequence,
            ContentRef::AlternativeScenario(_) => ContentKind::AlternativeScenario,
            ContentRef::Timeline(_) => ContentKind::Timeline,
            ContentRef::Resource(_) => ContentKind::Resource,
            ContentRef::Entity(_) => ContentKind::HistoricalEntity,
            ContentRef::WhatIfScenario(_) => ContentKind::WhatIfScenario,
            ContentRef::Simulation(_) => ContentKind::Simulation,
            ContentRef::Debate(_) => ContentKind::HistoricalDebate,
            ContentRef::Argument(_) => ContentKind::Argument,
        }
    }

    pub fn object_id(&self) -> i64 {
        match *self {
            ContentRef::Era(id)
            | ContentRef::Location(id)
            | ContentRef::Figure(id)
            | ContentRef::Event(id)
            | ContentRef::Document(id)
            | ContentRef::Scenario(id)
            | ContentRef::Prediction(id)
            | ContentRef::Consequence(id)
            | ContentRef::AlternativeScenario(id)
            | ContentRef::Timeline(id)
            | ContentRef::Resource(id)
            | ContentRef::Entity(id)
            | ContentRef::WhatIfScenario(id)
            | ContentRef::Simulation(id)
            | ContentRef::Debate(id)
            | ContentRef::Argument(id) => id,
        }
    }
}

/// Registry of `(app_label, model)` pairs.
pub struct ContentTypes<'a> {
    conn: &'a Connection,
}

impl<'a> ContentTypes<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the id for `kind`, registering it on first use.
    pub fn get_or_create(&self, kind: ContentKind) -> StoreResult<i64> {
        let (app_label, model) = kind.natural_key();
        self.conn.execute(INSERT_CONTENT_TYPE, params![app_label, model])?;
        let id = self.conn.query_row(SELECT_CONTENT_TYPE_ID, params![app_label, model], |row| row.get(0))?;
        Ok(id)
    }

    pub fn get_id(&self, kind: ContentKind) -> StoreResult<Option<i64>> {
        let (app_label, model) = kind.natural_key();
        self.conn
            .query_row(SELECT_CONTENT_TYPE_ID, params![app_label, model], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    pub fn kind_of(&self, content_type_id: i64) -> StoreResult<ContentKind> {
        let key: Option<(String, String)> = self
            .conn
            .query_row(SELECT_CONTENT_TYPE_BY_ID, params![content_type_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        key.and_then(|(app_label, model)| ContentKind::from_natural_key(&app_label, &model))
            .ok_or_else(|| StoreError::not_found("content type", content_type_id))
    }

    /// Resolves a stored `(content_type_id, object_id)` pair back into a reference.
    pub fn resolve(&self, content_type_id: i64, object_id: i64) -> StoreResult<ContentRef> {
        Ok(self.kind_of(content_type_id)?.with_id(object_id))
    }

    /// True when the referenced row exists.
    pub fn exists(&self, target: &ContentRef) -> StoreResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", target.kind().table());
        let exists = self.conn.query_row(&sql, params![target.object_id()], |row| row.get(0))?;
        Ok(exists)
    }

    /// Fails with [`StoreError::NotFound`] unless the referenced row exists.
    pub fn ensure_exists(&self, target: &ContentRef) -> StoreResult<()> {
        if self.exists(target)? {
            Ok(())
        } else {
            Err(StoreError::not_found(target.kind().natural_key().1, target.object_id()))
        }
    }
}
