//! Accounts and learning progress.

use crate::db::error::StoreResult;
use crate::db::links::Link;
use crate::db::query::{delete_row, fetch_all, fetch_one, require, save_row};
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const INSERT_USER: &str = "INSERT INTO users (email, name, is_staff, is_superuser, is_active, date_joined) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_USER: &str = "UPDATE users SET email = ?1, name = ?2, is_staff = ?3, is_superuser = ?4, is_active = ?5, date_joined = ?6 WHERE id = ?7";
const SELECT_USERS: &str = "SELECT id, email, name, is_staff, is_superuser, is_active, date_joined FROM users";

const INSERT_PROFILE: &str = "INSERT INTO user_profiles (user_id) VALUES (?1)";
const UPDATE_PROFILE: &str = "UPDATE user_profiles SET user_id = ?1 WHERE id = ?2";
const SELECT_PROFILES: &str = "SELECT id, user_id FROM user_profiles";

const INSERT_ACHIEVEMENT: &str = "INSERT INTO achievements (name, description, image) VALUES (?1, ?2, ?3)";
const UPDATE_ACHIEVEMENT: &str = "UPDATE achievements SET name = ?1, description = ?2, image = ?3 WHERE id = ?4";
const SELECT_ACHIEVEMENTS: &str = "SELECT id, name, description, image FROM achievements";

const INSERT_PROGRESS: &str = "INSERT INTO user_progress (knowledge_score, learning_path, user_id) VALUES (?1, ?2, ?3)";
const UPDATE_PROGRESS: &str = "UPDATE user_progress SET knowledge_score = ?1, learning_path = ?2, user_id = ?3 WHERE id = ?4";
const SELECT_PROGRESS: &str = "SELECT id, knowledge_score, learning_path, user_id FROM user_progress";

const INTEREST_AREAS: Link = Link::new("user_profile_interest_areas", "profile_id", "event_id");
const CREATED_SCENARIOS: Link = Link::new("user_profile_created_scenarios", "profile_id", "scenario_id");
const VIEWED_EVENTS: Link = Link::new("user_profile_viewed_events", "profile_id", "event_id");
const TOPICS_MASTERED: Link = Link::new("user_progress_topics", "progress_id", "category_id");
const PROGRESS_ACHIEVEMENTS: Link = Link::new("user_progress_achievements", "progress_id", "achievement_id");

/// An account. Identified by e-mail address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    /// Unique login key.
    pub email: String,
    pub name: String,
    /// Only staff may verify fact checks.
    pub is_staff: bool,
    /// Holds every permission while active.
    pub is_superuser: bool,
    /// Inactive users hold no permissions at all.
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            name: name.to_string(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("email", &self.email);
        v.max_length("email", &self.email, 254);
        if !self.email.trim().is_empty() {
            v.email("email", &self.email);
        }
        v.max_length("name", &self.name, 255);
        v.finish()
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        is_staff: row.get(3)?,
        is_superuser: row.get(4)?,
        is_active: row.get(5)?,
        date_joined: row.get(6)?,
    })
}

pub struct Users<'a> {
    conn: &'a Connection,
}

impl<'a> Users<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Inserts or updates a user. E-mail addresses are unique.
    pub fn save(&self, user: &mut User) -> StoreResult<i64> {
        user.validate()?;
        save_row(
            self.conn,
            "user",
            &mut user.id,
            INSERT_USER,
            UPDATE_USER,
            params![user.email, user.name, user.is_staff, user.is_superuser, user.is_active, user.date_joined],
        )
        .map_err(|e| e.or_conflict("user", "email", user.email.as_str()))
    }

    pub fn get(&self, id: i64) -> StoreResult<User> {
        require(self.conn, "user", id, &format!("{} WHERE id = ?1", SELECT_USERS), [id], user_from_row)
    }

    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        fetch_one(self.conn, &format!("{} WHERE email = ?1", SELECT_USERS), [email], user_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<User>> {
        fetch_all(self.conn, &format!("{} ORDER BY email", SELECT_USERS), [], user_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "users", "user", id)
    }
}

/// One-to-one extension of a user with their interests and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub user_id: i64,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self { id: None, user_id }
    }
}

fn profile_from_row(row: &Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
    })
}

pub struct UserProfiles<'a> {
    conn: &'a Connection,
}

impl<'a> UserProfiles<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Saves a profile. A user has at most one.
    pub fn save(&self, profile: &mut UserProfile) -> StoreResult<i64> {
        save_row(self.conn, "user profile", &mut profile.id, INSERT_PROFILE, UPDATE_PROFILE, params![profile.user_id])
            .map_err(|e| e.or_conflict("user profile", "user", profile.user_id.to_string()))
    }

    pub fn get(&self, id: i64) -> StoreResult<UserProfile> {
        require(self.conn, "user profile", id, &format!("{} WHERE id = ?1", SELECT_PROFILES), [id], profile_from_row)
    }

    pub fn for_user(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        fetch_one(self.conn, &format!("{} WHERE user_id = ?1", SELECT_PROFILES), [user_id], profile_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "user_profiles", "user profile", id)
    }

    pub fn set_interest_areas(&self, profile_id: i64, event_ids: &[i64]) -> StoreResult<()> {
        INTEREST_AREAS.set(self.conn, profile_id, event_ids)
    }

    pub fn interest_areas(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        INTEREST_AREAS.right_ids(self.conn, profile_id)
    }

    pub fn set_created_scenarios(&self, profile_id: i64, scenario_ids: &[i64]) -> StoreResult<()> {
        CREATED_SCENARIOS.set(self.conn, profile_id, scenario_ids)
    }

    pub fn created_scenarios(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        CREATED_SCENARIOS.right_ids(self.conn, profile_id)
    }

    /// Records that the profile's owner viewed an event.
    pub fn mark_viewed(&self, profile_id: i64, event_id: i64) -> StoreResult<()> {
        VIEWED_EVENTS.add(self.conn, profile_id, event_id)
    }

    pub fn viewed_events(&self, profile_id: i64) -> StoreResult<Vec<i64>> {
        VIEWED_EVENTS.right_ids(self.conn, profile_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    /// Path of the badge image.
    pub image: String,
}

impl Achievement {
    pub fn new(name: &str, description: &str, image: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            image: image.to_string(),
        }
    }
}

impl Validate for Achievement {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.required("description", &self.description);
        v.text("image", &self.image, 100);
        v.finish()
    }
}

fn achievement_from_row(row: &Row) -> rusqlite::Result<Achievement> {
    Ok(Achievement {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        image: row.get(3)?,
    })
}

pub struct Achievements<'a> {
    conn: &'a Connection,
}

impl<'a> Achievements<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, achievement: &mut Achievement) -> StoreResult<i64> {
        achievement.validate()?;
        save_row(
            self.conn,
            "achievement",
            &mut achievement.id,
            INSERT_ACHIEVEMENT,
            UPDATE_ACHIEVEMENT,
            params![achievement.name, achievement.description, achievement.image],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<Achievement> {
        require(self.conn, "achievement", id, &format!("{} WHERE id = ?1", SELECT_ACHIEVEMENTS), [id], achievement_from_row)
    }

    pub fn list(&self) -> StoreResult<Vec<Achievement>> {
        fetch_all(self.conn, &format!("{} ORDER BY name", SELECT_ACHIEVEMENTS), [], achievement_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "achievements", "achievement", id)
    }
}

/// Learning state of a user. The learning path is free-form JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: Option<i64>,
    pub user_id: i64,
    pub knowledge_score: f64,
    pub learning_path: serde_json::Value,
}

impl UserProgress {
    pub fn new(user_id: i64) -> Self {
        Self {
            id: None,
            user_id,
            knowledge_score: 0.0,
            learning_path: serde_json::json!([]),
        }
    }
}

impl Validate for UserProgress {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.finite("knowledge_score", self.knowledge_score);
        v.finish()
    }
}

fn progress_from_row(row: &Row) -> rusqlite::Result<UserProgress> {
    Ok(UserProgress {
        id: row.get(0)?,
        knowledge_score: row.get(1)?,
        learning_path: row.get(2)?,
        user_id: row.get(3)?,
    })
}

pub struct UserProgresses<'a> {
    conn: &'a Connection,
}

impl<'a> UserProgresses<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn save(&self, progress: &mut UserProgress) -> StoreResult<i64> {
        progress.validate()?;
        save_row(
            self.conn,
            "user progress",
            &mut progress.id,
            INSERT_PROGRESS,
            UPDATE_PROGRESS,
            params![progress.knowledge_score, progress.learning_path, progress.user_id],
        )
    }

    pub fn get(&self, id: i64) -> StoreResult<UserProgress> {
        require(self.conn, "user progress", id, &format!("{} WHERE id = ?1", SELECT_PROGRESS), [id], progress_from_row)
    }

    pub fn for_user(&self, user_id: i64) -> StoreResult<Vec<UserProgress>> {
        fetch_all(self.conn, &format!("{} WHERE user_id = ?1 ORDER BY id", SELECT_PROGRESS), [user_id], progress_from_row)
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        delete_row(self.conn, "user_progress", "user progress", id)
    }

    pub fn set_topics_mastered(&self, progress_id: i64, category_ids: &[i64]) -> StoreResult<()> {
        TOPICS_MASTERED.set(self.conn, progress_id, category_ids)
    }

    pub fn topics_mastered(&self, progress_id: i64) -> StoreResult<Vec<i64>> {
        TOPICS_MASTERED.right_ids(self.conn, progress_id)
    }

    pub fn award(&self, progress_id: i64, achievement_id: i64) -> StoreResult<()> {
        PROGRESS_ACHIEVEMENTS.add(self.conn, progress_id, achievement_id)
    }

    pub fn achievements(&self, progress_id: i64) -> StoreResult<Vec<i64>> {
        PROGRESS_ACHIEVEMENTS.right_ids(self.conn, progress_id)
    }
}
