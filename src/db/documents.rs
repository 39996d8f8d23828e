use crate::db::error::StoreResult;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_DOCUMENT: &str = "INSERT INTO documents (title, content, upload_date, author_id, related_event_id) VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_DOCUMENT: &str =
    "UPDATE documents SET title = ?1, content = ?2, upload_date = ?3, author_id = ?4, related_event_id = ?5 WHERE id = ?6";
const SELECT_DOCUMENTS: &str = "SELECT id, title, content, upload_date, author_id, related_event_id FROM documents";

/// A primary source text. Its author is cleared when the user is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub upload_date: DateTime<Utc>,
    pub author_id: Option<i64>,
    pub related_event_id: Option<i64>,
}

impl Document {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            upload_date: Utc::now(),
            author_id: None,
            related_event_id: None,
        }
    }
}

impl Validate for Document {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 255);
        v.required("content", &self.content);
        v.finish()
    }
}

fn document_from_row(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        upload_date: row.get(3)?,
        author_id: row.get(4)?,
        related_event_id: row.get(5)?,
    })
}

pub struct Documents<'a> {
    conn: &'a Connection,
}

impl<'a> Documents<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, document: &mut Document) -> StoreResult<i64> {
        document.validate()?;
        save_row(
            self.conn,
            "document",
            &mut document.id,
            INSERT_DOCUMENT,
            UPDATE_DOCUMENT,
            params![document.title, document.content, document.upload_date, document.author_id, document.related_event_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Document> {
        require(self.conn, "document", id, &format!("{} WHERE id = ?1", SELECT_DOCUMENTS), [id], document_from_row)
    }

    pub fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Document>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE related_event_id = ?1 ORDER BY upload_date, id", SELECT_DOCUMENTS),
            [event_id],
            document_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "documents", "document", id)
    }
}
