use crate::libs::validation::ValidationErrors;
use rusqlite::ffi;
use thiserror::Error;

/// Errors raised by repositories.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{entity} references a record that does not exist")]
    BrokenReference { entity: &'static str },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Invalid(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Turns a unique violation into [`StoreError::Conflict`] on `field`.
    pub fn or_conflict(self, entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        match self {
            StoreError::Sqlite(err) if is_unique_violation(&err) => StoreError::Conflict {
                entity,
                field,
                value: value.into(),
            },
            other => other,
        }
    }
}

/// True when the statement failed on a UNIQUE or PRIMARY KEY constraint.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// True when the statement referenced a row that does not exist.
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Maps a failed write of `entity`: dangling foreign keys become
/// [`StoreError::BrokenReference`], everything else stays a SQLite error.
pub fn write_error(entity: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |err| {
        if is_foreign_key_violation(&err) {
            StoreError::BrokenReference { entity }
        } else {
            StoreError::Sqlite(err)
        }
    }
}
