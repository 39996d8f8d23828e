use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, require, save_row};
use crate::libs::choices::text_choices;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_RESOURCE: &str = "INSERT INTO resources
    (title, resource_type, content, url, description, upload_date, related_event_id, uploaded_by_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const UPDATE_RESOURCE: &str = "UPDATE resources SET
    title = ?1, resource_type = ?2, content = ?3, url = ?4, description = ?5, upload_date = ?6,
    related_event_id = ?7, uploaded_by_id = ?8
    WHERE id = ?9";
const SELECT_RESOURCES: &str = "SELECT id, title, resource_type, content, url, description, upload_date, related_event_id,
    uploaded_by_id FROM resources";

const RESOURCE_EVENTS: Link = Link::new("resource_events", "resource_id", "event_id");

text_choices! {
    pub enum ResourceType {
        Document = "DOCUMENT" => "Document",
        Image = "IMAGE" => "Image",
        Video = "VIDEO" => "Video",
        Audio = "AUDIO" => "Audio",
        Link = "LINK" => "External Link",
    }
}

/// A file or link attached to events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Option<i64>,
    pub title: String,
    pub resource_type: ResourceType,
    /// Path of an uploaded file, if any.
    pub content: Option<String>,
    /// Blank, or an absolute http(s) URL.
    pub url: String,
    pub description: String,
    pub upload_date: DateTime<Utc>,
    pub related_event_id: Option<i64>,
    pub uploaded_by_id: i64,
}

impl Resource {
    pub fn new(title: &str, resource_type: ResourceType, description: &str, uploaded_by_id: i64) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            resource_type,
            content: None,
            url: String::new(),
            description: description.to_string(),
            upload_date: Utc::now(),
            related_event_id: None,
            uploaded_by_id,
        }
    }
}

impl Validate for Resource {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("title", &self.title, 200);
        v.required("description", &self.description);
        v.max_length("url", &self.url, 200);
        v.url("url", &self.url);
        if let Some(content) = &self.content {
            v.max_length("content", content, 100);
        }
        v.finish()
    }
}

fn resource_from_row(row: &Row) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        title: row.get(1)?,
        resource_type: row.get(2)?,
        content: row.get(3)?,
        url: row.get(4)?,
        description: row.get(5)?,
        upload_date: row.get(6)?,
        related_event_id: row.get(7)?,
        uploaded_by_id: row.get(8)?,
    })
}

pub struct Resources<'a> {
    conn: &'a Connection,
}

impl<'a> Resources<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, resource: &mut Resource) -> StoreResult<i64> {
        resource.validate()?;
        save_row(
            self.conn,
            "resource",
            &mut resource.id,
            INSERT_RESOURCE,
            UPDATE_RESOURCE,
            params![
                resource.title,
                resource.resource_type,
                resource.content,
                resource.url,
                resource.description,
                resource.upload_date,
                resource.related_event_id,
                resource.uploaded_by_id
            ],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Resource> {
        require(self.conn, "resource", id, &format!("{} WHERE id = ?1", SELECT_RESOURCES), [id], resource_from_row)
    }

    pub fn list_by_type(&self, resource_type: ResourceType) -> StoreResult<Vec<Resource>> {
        fetch_all(
            self.conn,
            &format!("{} WHERE resource_type = ?1 ORDER BY upload_date DESC, id DESC", SELECT_RESOURCES),
            [resource_type],
            resource_from_row,
        )
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "resources", "resource", id)
    }

    pub fn set_events(&self, resource_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        RESOURCE_EVENTS.set(self.conn, resource_id, event_ids)
    }

    pub fn events(&self, resource_id: i64) -> StoreResult<Vec<i64>> {
        RESOURCE_EVENTS.right_ids(self.conn, resource_id)
    }
}
