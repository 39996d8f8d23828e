//! Free-form tags on events and entities, plus the fixed event tag list.
//!
//! A [`Tag`] has a unique name and a unique slug derived from it. When the
//! derived slug is taken, `_1`, `_2`, ... is appended until it is free.
//! Tags are attached to records through a generic `(content type, object
//! id)` reference, so one tag can label both events and entities.

use crate::db::content_types::{ContentKind, ContentRef, ContentTypes};
use crate::db::db::atomically;
use crate::db::error::{StoreError, StoreResult};
use crate::db::query::{delete_row, exists, fetch_all, fetch_one, require, save_row};
use crate::libs::messages::Message;
use crate::libs::slug::slugify;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use crate::msg_debug;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_TAG: &str = "INSERT INTO tags (name, slug) VALUES (?1, ?2)";
const UPDATE_TAG: &str = "UPDATE tags SET name = ?1, slug = ?2 WHERE id = ?3";
const SELECT_TAGS: &str = "SELECT id, name, slug FROM tags";
const SELECT_TAGS_FOR_OBJECT: &str = "
    SELECT t.id, t.name, t.slug FROM tags t
    JOIN tagged_items ti ON ti.tag_id = t.id
    WHERE ti.content_type_id = ?1 AND ti.object_id = ?2
    ORDER BY t.name";
const SELECT_TAGGED_OBJECTS: &str = "SELECT content_type_id, object_id FROM tagged_items WHERE tag_id = ?1 ORDER BY id";
const INSERT_TAGGED_ITEM: &str = "INSERT OR IGNORE INTO tagged_items (tag_id, content_type_id, object_id) VALUES (?1, ?2, ?3)";
const DELETE_TAGGED_ITEM: &str = "DELETE FROM tagged_items WHERE tag_id = ?1 AND content_type_id = ?2 AND object_id = ?3";
const DELETE_TAGGED_ITEMS: &str = "DELETE FROM tagged_items WHERE content_type_id = ?1 AND object_id = ?2";

const INSERT_EVENT_TAG: &str = "INSERT INTO event_tags (name) VALUES (?1)";
const UPDATE_EVENT_TAG: &str = "UPDATE event_tags SET name = ?1 WHERE id = ?2";
const SELECT_EVENT_TAGS: &str = "SELECT id, name FROM event_tags";

pub const TAG_NAME_MAX_LENGTH: usize = 100;

/// Kinds of records that accept free-form tags.
pub const TAGGABLE: &[ContentKind] = &[ContentKind::HistoricalEvent, ContentKind::HistoricalEntity];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            slug: String::new(),
        }
    }
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, TAG_NAME_MAX_LENGTH);
        v.max_length("slug", &self.slug, TAG_NAME_MAX_LENGTH);
        v.finish()
    }
}

fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
    })
}

pub struct Tags<'a> {
    conn: &'a Connection,
}

impl<'a> Tags<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Saves a tag, deriving a free slug when it has none.
    pub fn save(&self, tag: &mut Tag) -> StoreResult<i64> {
        tag.validate()?;
        if tag.slug.is_empty() {
            tag.slug = self.unique_slug(&tag.name)?;
        }
        save_row(self.conn, "tag", &mut tag.id, INSERT_TAG, UPDATE_TAG, params![tag.name, tag.slug])
            .map_err(|e| e.or_conflict("tag", "name", tag.name.as_str()))
    }

    /// First free slug among `base`, `base_1`, `base_2`, ...
    ///
    /// The base is cut short so the suffixed slug still fits
    /// [`TAG_NAME_MAX_LENGTH`].
    fn unique_slug(&self, name: &str) -> StoreResult<String> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = "tag".to_string();
        }
        let mut candidate: String = base.chars().take(TAG_NAME_MAX_LENGTH).collect();
        let mut suffix = 1;
        while self.get_by_slug(&candidate)?.is_some() {
            let tail = format!("_{}", suffix);
            let head: String = base.chars().take(TAG_NAME_MAX_LENGTH - tail.len()).collect();
            candidate = head + &tail;
            suffix += 1;
        }
        Ok(candidate)
    }

    pub fn get(&self, id: i64) -> StoreResult<Tag> {
        require(self.conn, "tag", id, &format!("{} WHERE id = ?1", SELECT_TAGS), [id], tag_from_row)
    }

    pub fn get_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        fetch_one(self.conn, &format!("{} WHERE name = ?1", SELECT_TAGS), [name], tag_from_row)
    }

    pub fn get_by_slug(&self, slug: &str) -> StoreResult<Option<Tag>> {
        fetch_one(self.conn, &format!("{} WHERE slug = ?1", SELECT_TAGS), [slug], tag_from_row)
    }

    /// Returns the tag named `name`, creating it when missing.
    pub fn get_or_create(&self, name: &str) -> StoreResult<Tag> {
        if let Some(tag) = self.get_by_name(name)? {
            return Ok(tag);
        }
        let mut tag = Tag::new(name);
        self.save(&mut tag)?;
        msg_debug!(Message::TagCreated(tag.name.clone()));
        Ok(tag)
    }

    pub fn list(&self) -> StoreResult<Vec<Tag>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_TAGS), [], tag_from_row)
    }

    /// Deletes a tag and detaches it from every record.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "tags", "tag", id)
    }

    /// Attaches tags by name to `target`, creating missing tags.
    pub fn add(&self, target: &ContentRef, names: &[&str]) -> StoreResult<()> {
        let content_type_id = self.taggable(target)?;
        atomically(self.conn, |conn| {
            let tags = Tags::new(conn);
            for name in names {
                let tag = tags.get_or_create(name)?;
                conn.execute(INSERT_TAGGED_ITEM, params![tag.id, content_type_id, target.object_id()])?;
            }
            Ok(())
        })
    }

    pub fn remove(&self, target: &ContentRef, name: &str) -> StoreResult<()> {
        let content_type_id = self.taggable(target)?;
        if let Some(tag) = self.get_by_name(name)? {
            self.conn.execute(DELETE_TAGGED_ITEM, params![tag.id, content_type_id, target.object_id()])?;
        }
        Ok(())
    }

    pub fn clear(&self, target: &ContentRef) -> StoreResult<()> {
        let content_type_id = self.taggable(target)?;
        self.conn.execute(DELETE_TAGGED_ITEMS, params![content_type_id, target.object_id()])?;
        Ok(())
    }

    /// Replaces the tags of `target` with `names`.
    pub fn set(&self, target: &ContentRef, names: &[&str]) -> StoreResult<()> {
        atomically(self.conn, |conn| {
            let tags = Tags::new(conn);
            tags.clear(target)?;
            tags.add(target, names)
        })
    }

    /// Tags on `target`, by name.
    pub fn tags_for(&self, target: &ContentRef) -> StoreResult<Vec<Tag>> {
        let content_type_id = ContentTypes::new(self.conn).get_or_create(target.kind())?;
        fetch_all(self.conn, SELECT_TAGS_FOR_OBJECT, params![content_type_id, target.object_id()], tag_from_row)
    }

    /// Records carrying the tag, in tagging order.
    pub fn tagged_with(&self, tag_id: i64) -> StoreResult<Vec<ContentRef>> {
        let content_types = ContentTypes::new(self.conn);
        let pairs: Vec<(i64, i64)> = fetch_all(self.conn, SELECT_TAGGED_OBJECTS, [tag_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        pairs
            .into_iter()
            .map(|(content_type_id, object_id)| content_types.resolve(content_type_id, object_id))
            .collect()
    }

    /// Content type id of `target`, after checking it may carry tags and exists.
    fn taggable(&self, target: &ContentRef) -> StoreResult<i64> {
        if !TAGGABLE.contains(&target.kind()) {
            return Err(ValidationErrors::single("content_object", format!("{} records cannot be tagged.", target.kind().natural_key().1)).into());
        }
        if !exists(self.conn, target.kind().table(), target.object_id())? {
            return Err(StoreError::not_found(target.kind().natural_key().1, target.object_id()));
        }
        ContentTypes::new(self.conn).get_or_create(target.kind())
    }
}

/// Entry of the fixed list of event tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTag {
    pub id: Option<i64>,
    pub name: String,
}

impl EventTag {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
        }
    }
}

impl Validate for EventTag {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.finish()
    }
}

fn event_tag_from_row(row: &Row) -> rusqlite::Result<EventTag> {
    Ok(EventTag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub struct EventTags<'a> {
    conn: &'a Connection,
}

impl<'a> EventTags<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, tag: &mut EventTag) -> StoreResult<i64> {
        tag.validate()?;
        save_row(self.conn, "event tag", &mut tag.id, INSERT_EVENT_TAG, UPDATE_EVENT_TAG, params![tag.name])
    }

    pub fn get(&self, id: i64) -> StoreResult<EventTag> {
        require(self.conn, "event tag", id, &format!("{} WHERE id = ?1", SELECT_EVENT_TAGS), [id], event_tag_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<EventTag>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_EVENT_TAGS), [], event_tag_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "event_tags", "event tag", id)
    }
}
