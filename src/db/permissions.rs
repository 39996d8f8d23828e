//! Permissions, user grants and the post-migrate permission bootstrap.
//!
//! A permission is a `(content type, codename)` pair with a display name.
//! Users receive permissions through explicit grants; an active superuser
//! implicitly holds every permission.

use crate::db::content_types::{ContentKind, ContentTypes};
use crate::db::error::{StoreError, StoreResult};
use crate::libs::messages::Message;
use crate::libs::validation::{Validate, ValidationErrors, Validator};
use crate::msg_debug;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::{Deserialize, Serialize};

const INSERT_PERMISSION: &str = "INSERT INTO permissions (name, codename, content_type_id) VALUES (?1, ?2, ?3)";
const SELECT_PERMISSIONS: &str = "
    SELECT p.id, p.name, p.codename, c.app_label, c.model
    FROM permissions p
    JOIN content_types c ON c.id = p.content_type_id";
const GRANT_PERMISSION: &str = "INSERT OR IGNORE INTO user_permissions (user_id, permission_id) VALUES (?1, ?2)";
const REVOKE_PERMISSION: &str = "DELETE FROM user_permissions WHERE user_id = ?1 AND permission_id = ?2";
const SELECT_USER_FLAGS: &str = "SELECT is_active, is_superuser FROM users WHERE id = ?1";

/// Codename of the permission ensured by [`create_permissions`].
pub const CAN_CREATE_SCENARIOS: &str = "can_create_scenarios";

/// Custom permissions declared by the what-if scenario model.
pub const WHAT_IF_SCENARIO_PERMISSIONS: &[(&str, &str)] = &[
    ("can_create_scenario", "Can create scenario"),
    ("can_edit_scenario", "Can edit scenario"),
    ("can_delete_scenario", "Can delete scenario"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Option<i64>,
    pub name: String,
    pub codename: String,
    pub kind: ContentKind,
}

impl Permission {
    pub fn new(kind: ContentKind, codename: &str, name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            codename: codename.to_string(),
            kind,
        }
    }

    /// `app_label.codename`, the form used in permission checks and listings.
    pub fn full_codename(&self) -> String {
        format!("{}.{}", self.kind.natural_key().0, self.codename)
    }
}

impl Validate for Permission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.text("name", &self.name, 255);
        v.text("codename", &self.codename, 100);
        v.finish()
    }
}

fn permission_from_row(row: &Row) -> rusqlite::Result<Permission> {
    let app_label: String = row.get(3)?;
    let model: String = row.get(4)?;
    let kind = ContentKind::from_natural_key(&app_label, &model).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, format!("unknown content type {}.{}", app_label, model).into())
    })?;
    Ok(Permission {
        id: row.get(0)?,
        name: row.get(1)?,
        codename: row.get(2)?,
        kind,
    })
}

pub struct Permissions<'a> {
    conn: &'a Connection,
}

impl<'a> Permissions<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Looks up a permission by content type and codename.
    pub fn get(&self, kind: ContentKind, codename: &str) -> StoreResult<Option<Permission>> {
        let (app_label, model) = kind.natural_key();
        let sql = format!("{} WHERE c.app_label = ?1 AND c.model = ?2 AND p.codename = ?3", SELECT_PERMISSIONS);
        self.conn
            .query_row(&sql, params![app_label, model, codename], permission_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Returns the permission, creating it (and its content type) when missing.
    ///
    /// The boolean is `true` when a new row was inserted.
    pub fn get_or_create(&self, kind: ContentKind, codename: &str, name: &str) -> StoreResult<(Permission, bool)> {
        if let Some(existing) = self.get(kind, codename)? {
            return Ok((existing, false));
        }

        let mut permission = Permission::new(kind, codename, name);
        permission.validate()?;
        let content_type_id = ContentTypes::new(self.conn).get_or_create(kind)?;
        self.conn.execute(INSERT_PERMISSION, params![permission.name, permission.codename, content_type_id])?;
        permission.id = Some(self.conn.last_insert_rowid());
        Ok((permission, true))
    }

    /// All permissions ordered by app label, model and codename.
    pub fn list(&self) -> StoreResult<Vec<Permission>> {
        let sql = format!("{} ORDER BY c.app_label, c.model, p.codename", SELECT_PERMISSIONS);
        let mut stmt = self.conn.prepare(&sql)?;
        let permissions = stmt.query_map([], permission_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(permissions)
    }

    /// Permissions explicitly granted to `user_id`.
    pub fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Permission>> {
        let sql = format!(
            "{} JOIN user_permissions up ON up.permission_id = p.id WHERE up.user_id = ?1 ORDER BY c.app_label, c.model, p.codename",
            SELECT_PERMISSIONS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let permissions = stmt.query_map(params![user_id], permission_from_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(permissions)
    }

    /// Grants a permission to a user. Granting twice is a no-op.
    pub fn grant(&self, user_id: i64, permission_id: i64) -> StoreResult<()> {
        self.ensure_user(user_id)?;
        self.conn.execute(GRANT_PERMISSION, params![user_id, permission_id]).map_err(|err| {
            if crate::db::error::is_foreign_key_violation(&err) {
                StoreError::not_found("permission", permission_id)
            } else {
                StoreError::Sqlite(err)
            }
        })?;
        msg_debug!(Message::PermissionGranted(permission_id, user_id));
        Ok(())
    }

    pub fn revoke(&self, user_id: i64, permission_id: i64) -> StoreResult<()> {
        self.conn.execute(REVOKE_PERMISSION, params![user_id, permission_id])?;
        Ok(())
    }

    /// Every permission the user currently holds.
    ///
    /// Inactive users hold none. Active superusers hold all of them.
    pub fn effective_for_user(&self, user_id: i64) -> StoreResult<Vec<Permission>> {
        let (is_active, is_superuser) = self.user_flags(user_id)?;
        if !is_active {
            return Ok(Vec::new());
        }
        if is_superuser {
            return self.list();
        }
        self.list_for_user(user_id)
    }

    /// True when the user may act under `codename` on `kind`.
    pub fn has_perm(&self, user_id: i64, kind: ContentKind, codename: &str) -> StoreResult<bool> {
        Ok(self
            .effective_for_user(user_id)?
            .iter()
            .any(|p| p.kind == kind && p.codename == codename))
    }

    fn user_flags(&self, user_id: i64) -> StoreResult<(bool, bool)> {
        self.conn
            .query_row(SELECT_USER_FLAGS, params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?
            .ok_or_else(|| StoreError::not_found("user", user_id))
    }

    fn ensure_user(&self, user_id: i64) -> StoreResult<()> {
        self.user_flags(user_id).map(|_| ())
    }
}

/// Post-migrate hook: ensures the `can_create_scenarios` permission exists
/// on the what-if scenario content type.
pub fn create_permissions(tx: &Transaction) -> anyhow::Result<()> {
    let (permission, created) =
        Permissions::new(tx).get_or_create(ContentKind::WhatIfScenario, CAN_CREATE_SCENARIOS, "Can create What-If scenarios")?;
    if created {
        msg_debug!(Message::PermissionCreated(permission.full_codename()));
    } else {
        msg_debug!(Message::PermissionExists(permission.full_codename()));
    }
    Ok(())
}

/// Registers the default and custom permissions of the what-if scenario model.
pub(crate) fn declare_model_permissions(tx: &Transaction) -> anyhow::Result<()> {
    let permissions = Permissions::new(tx);
    let kind = ContentKind::WhatIfScenario;
    for action in ["add", "change", "delete", "view"] {
        let codename = format!("{}_whatifscenario", action);
        let name = format!("Can {} what if scenario", action);
        permissions.get_or_create(kind, &codename, &name)?;
    }
    for (codename, name) in WHAT_IF_SCENARIO_PERMISSIONS {
        permissions.get_or_create(kind, codename, name)?;
    }
    Ok(())
}
