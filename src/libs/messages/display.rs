//! Display text for dejavue messages.
//!
//! All message wording is defined here so that the rest of the crate only
//! deals with typed `Message` variants.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === DATABASE MESSAGES ===
            Message::DatabaseOpened(path) => format!("Opened database at {}", path),
            Message::DatabaseVersion(version) => format!("Database schema version: {}", version),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::DatabaseNeedsUpdate => "Database needs migration".to_string(),
            Message::DatabaseReady(version) => format!("Database is ready at schema version {}", version),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed successfully".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::NoMigrationsApplied => "No migrations have been applied yet".to_string(),
            Message::RunningPostMigrateHook(name) => format!("Running post-migrate hook: {}", name),
            Message::PostMigrateHookFailed(name, error) => format!("Post-migrate hook '{}' failed: {}", name, error),

            // === PERMISSION MESSAGES ===
            Message::PermissionCreated(codename) => format!("Permission '{}' created", codename),
            Message::PermissionExists(codename) => format!("Permission '{}' already exists", codename),
            Message::PermissionGranted(permission_id, user_id) => format!("Permission #{} granted to user #{}", permission_id, user_id),
            Message::PermissionsHeader => "Permissions:".to_string(),
            Message::PermissionsForUser(email) => format!("Permissions for {}:", email),
            Message::NoPermissionsFound => "No permissions found.".to_string(),
            Message::UserNotFound(email) => format!("User '{}' not found.", email),

            // === RECORD MESSAGES ===
            Message::RecordSaved(entity, id) => format!("Saved {} #{}", entity, id),
            Message::RecordUpdated(entity, id) => format!("Updated {} #{}", entity, id),
            Message::RecordDeleted(entity, id) => format!("Deleted {} #{}", entity, id),
            Message::SlugDerived(name, slug) => format!("Derived slug '{}' from '{}'", slug, name),
            Message::TagCreated(name) => format!("Tag '{}' created", name),
            Message::TimelineReordered(id, count) => format!("Timeline #{} reordered ({} events)", id, count),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigFileNotFound => "Configuration file not found".to_string(),
            Message::ConfigParseError => "Failed to parse configuration".to_string(),
            Message::DatabasePathOverride(path) => format!("Using database path from environment: {}", path),
            Message::PromptDatabasePath => "Database file path".to_string(),

            // === GENERAL MESSAGES ===
            Message::OperationCancelled => "Operation cancelled.".to_string(),
        };
        write!(f, "{}", text)
    }
}
