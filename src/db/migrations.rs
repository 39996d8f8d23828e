//! Database schema migrations and post-migrate hooks.
//!
//! The schema is built by numbered migrations that are applied in order and
//! recorded in the `migrations` table. A run applies every pending migration
//! and then every post-migrate hook inside one transaction: either the
//! whole run commits, or nothing does.
//!
//! ## Migrations
//!
//! 1. `create_accounts`: users and the content-type registry
//! 2. `create_events_schema`: eras, events, figures, scenarios, timelines, resources, tags
//! 3. `create_user_learning`: profiles, achievements and learning progress
//! 4. `create_what_if_timelines`: the simplified timeline / what-if scenario pairing
//! 5. `create_interactions`: activity log, simulations, decisions and debates
//! 6. `create_core_analytics`: quality metrics, patterns, predictive models and fact checks
//! 7. `create_permissions`: permissions, user grants and the what-if scenario's declared permissions
//!
//! ## Post-migrate Hooks
//!
//! Hooks run after every migration run, including runs with nothing
//! pending, so they must be idempotent. A failing hook aborts the run.
//!
//! ## Usage
//!
//! ```rust
//! use dejavue::db::migrations::{get_db_version, init_with_migrations, needs_migration};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! conn.execute_batch("PRAGMA foreign_keys = ON;")?;
//! init_with_migrations(&mut conn)?;
//! assert!(get_db_version(&conn)? > 0);
//! assert!(!needs_migration(&conn)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::db::content_types::ContentKind;
use crate::db::permissions;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error, msg_info, msg_success};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

/// Tracks which migrations have been applied.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// A single schema migration.
#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// A callback run after every migration run.
#[derive(Debug, Clone)]
pub struct PostMigrateHook {
    pub name: &'static str,
    pub run: fn(&Transaction) -> Result<()>,
}

/// Registry of migrations and post-migrate hooks.
///
/// Intended for single-threaded use at startup; concurrent runs against the
/// same file are serialized by SQLite's write lock.
pub struct MigrationManager {
    migrations: Vec<Migration>,
    hooks: Vec<PostMigrateHook>,
}

impl MigrationManager {
    /// Creates a manager with every migration and the core permission hook registered.
    pub fn new() -> Self {
        let mut manager = Self {
            migrations: Vec::new(),
            hooks: Vec::new(),
        };
        manager.register_migrations();
        manager.on_post_migrate("core.create_permissions", permissions::create_permissions);
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: accounts and the content-type registry used by generic references
        self.add_migration(1, "create_accounts", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL DEFAULT '',
                    is_staff BOOLEAN NOT NULL DEFAULT FALSE,
                    is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    date_joined TIMESTAMP NOT NULL
                );
                CREATE TABLE IF NOT EXISTS content_types (
                    id INTEGER PRIMARY KEY,
                    app_label TEXT NOT NULL,
                    model TEXT NOT NULL,
                    UNIQUE (app_label, model)
                );",
            )?;
            Ok(())
        });

        // Version 2: the events domain
        self.add_migration(2, "create_events_schema", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS eras (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    start_year INTEGER NOT NULL,
                    end_year INTEGER NOT NULL,
                    description TEXT NOT NULL,
                    slug TEXT NOT NULL UNIQUE
                );
                CREATE TABLE IF NOT EXISTS locations (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    latitude REAL,
                    longitude REAL,
                    modern_name TEXT NOT NULL DEFAULT '',
                    country TEXT NOT NULL DEFAULT ''
                );
                CREATE TABLE IF NOT EXISTS categories (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS event_categories (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS causes (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS effects (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS event_tags (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS historical_events (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    title TEXT NOT NULL,
                    date DATE NOT NULL,
                    start_date DATE NOT NULL,
                    end_date DATE,
                    description TEXT NOT NULL,
                    impact_level INTEGER NOT NULL CHECK (impact_level IN (1, 2, 3)),
                    significance_rating INTEGER NOT NULL CHECK (significance_rating BETWEEN 1 AND 10),
                    sources TEXT NOT NULL DEFAULT '',
                    created_at TIMESTAMP NOT NULL,
                    updated_at TIMESTAMP NOT NULL,
                    era_id INTEGER NOT NULL REFERENCES eras(id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES event_categories(id) ON DELETE CASCADE,
                    location_id INTEGER REFERENCES locations(id) ON DELETE SET NULL
                );
                CREATE INDEX IF NOT EXISTS idx_historical_events_era ON historical_events(era_id);
                CREATE INDEX IF NOT EXISTS idx_historical_events_start_date ON historical_events(start_date);
                CREATE TABLE IF NOT EXISTS historical_event_related (
                    from_event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    to_event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (from_event_id, to_event_id)
                );
                CREATE TABLE IF NOT EXISTS historical_event_categories (
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                    PRIMARY KEY (event_id, category_id)
                );
                CREATE TABLE IF NOT EXISTS historical_figures (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    birth_date DATE,
                    death_date DATE,
                    biography TEXT NOT NULL,
                    bio TEXT NOT NULL,
                    image TEXT,
                    birthplace_id INTEGER REFERENCES locations(id) ON DELETE SET NULL
                );
                CREATE TABLE IF NOT EXISTS historical_event_key_figures (
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    figure_id INTEGER NOT NULL REFERENCES historical_figures(id) ON DELETE CASCADE,
                    PRIMARY KEY (event_id, figure_id)
                );
                CREATE TABLE IF NOT EXISTS historical_figure_events (
                    figure_id INTEGER NOT NULL REFERENCES historical_figures(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (figure_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS documents (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    upload_date TIMESTAMP NOT NULL,
                    author_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
                    related_event_id INTEGER REFERENCES historical_events(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS scenarios (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    creation_date TIMESTAMP NOT NULL,
                    created_by_id INTEGER REFERENCES users(id) ON DELETE SET NULL
                );
                CREATE TABLE IF NOT EXISTS scenario_events (
                    id INTEGER PRIMARY KEY,
                    scenario_id INTEGER NOT NULL REFERENCES scenarios(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    altered_start_date DATE,
                    altered_end_date DATE,
                    outcome TEXT NOT NULL,
                    impact INTEGER NOT NULL CHECK (impact IN (1, 2, 3))
                );
                CREATE INDEX IF NOT EXISTS idx_scenario_events_scenario ON scenario_events(scenario_id);
                CREATE TABLE IF NOT EXISTS predictions (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    prediction_text TEXT NOT NULL,
                    prediction_date DATE NOT NULL,
                    confidence_level REAL NOT NULL,
                    predicted_event_id INTEGER REFERENCES historical_events(id) ON DELETE CASCADE,
                    scenario_id INTEGER NOT NULL REFERENCES scenarios(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS prediction_based_on_events (
                    prediction_id INTEGER NOT NULL REFERENCES predictions(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (prediction_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS prediction_predicted_events (
                    prediction_id INTEGER NOT NULL REFERENCES predictions(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (prediction_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS consequences (
                    id INTEGER PRIMARY KEY,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    description TEXT NOT NULL,
                    impact_level INTEGER NOT NULL CHECK (impact_level BETWEEN 1 AND 10),
                    timeframe TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS alternative_scenarios (
                    id INTEGER PRIMARY KEY,
                    original_event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    probability INTEGER NOT NULL CHECK (probability BETWEEN 1 AND 100),
                    created_by_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TIMESTAMP NOT NULL
                );
                CREATE TABLE IF NOT EXISTS timelines (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL,
                    is_public BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMP NOT NULL,
                    created_by_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS timeline_events (
                    id INTEGER PRIMARY KEY,
                    timeline_id INTEGER NOT NULL REFERENCES timelines(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    custom_note TEXT NOT NULL DEFAULT '',
                    sort_order INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_timeline_events_order ON timeline_events(timeline_id, sort_order);
                CREATE TABLE IF NOT EXISTS resources (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    resource_type TEXT NOT NULL CHECK (resource_type IN ('DOCUMENT', 'IMAGE', 'VIDEO', 'AUDIO', 'LINK')),
                    content TEXT,
                    url TEXT NOT NULL DEFAULT '',
                    description TEXT NOT NULL,
                    upload_date TIMESTAMP NOT NULL,
                    related_event_id INTEGER REFERENCES historical_events(id) ON DELETE SET NULL,
                    uploaded_by_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS resource_events (
                    resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (resource_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS geopolitical_impacts (
                    id INTEGER PRIMARY KEY,
                    impact_type TEXT NOT NULL,
                    impact_radius REAL NOT NULL,
                    affected_population INTEGER NOT NULL,
                    geometry TEXT NOT NULL,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    region_id INTEGER NOT NULL REFERENCES locations(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS historical_entities (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    start_date DATE NOT NULL,
                    end_date DATE NOT NULL,
                    image TEXT,
                    location_id INTEGER NOT NULL REFERENCES locations(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS historical_entity_categories (
                    entity_id INTEGER NOT NULL REFERENCES historical_entities(id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                    PRIMARY KEY (entity_id, category_id)
                );
                CREATE TABLE IF NOT EXISTS historical_connections (
                    id INTEGER PRIMARY KEY,
                    relationship_type TEXT NOT NULL,
                    strength REAL NOT NULL,
                    evidence TEXT NOT NULL,
                    source_id INTEGER NOT NULL REFERENCES historical_entities(id) ON DELETE CASCADE,
                    target_id INTEGER NOT NULL REFERENCES historical_entities(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS cause_effect_relationships (
                    id INTEGER PRIMARY KEY,
                    description TEXT NOT NULL,
                    cause_id INTEGER NOT NULL REFERENCES causes(id) ON DELETE CASCADE,
                    effect_id INTEGER NOT NULL REFERENCES effects(id) ON DELETE CASCADE,
                    historical_event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS tags (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    slug TEXT NOT NULL UNIQUE
                );
                CREATE TABLE IF NOT EXISTS tagged_items (
                    id INTEGER PRIMARY KEY,
                    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                    content_type_id INTEGER NOT NULL REFERENCES content_types(id) ON DELETE CASCADE,
                    object_id INTEGER NOT NULL,
                    UNIQUE (tag_id, content_type_id, object_id)
                );
                CREATE INDEX IF NOT EXISTS idx_tagged_items_object ON tagged_items(content_type_id, object_id);",
            )?;
            Ok(())
        });

        // Version 3: learning progress, which links users to events and categories
        self.add_migration(3, "create_user_learning", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS user_profiles (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS user_profile_interest_areas (
                    profile_id INTEGER NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (profile_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS user_profile_created_scenarios (
                    profile_id INTEGER NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
                    scenario_id INTEGER NOT NULL REFERENCES scenarios(id) ON DELETE CASCADE,
                    PRIMARY KEY (profile_id, scenario_id)
                );
                CREATE TABLE IF NOT EXISTS user_profile_viewed_events (
                    profile_id INTEGER NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (profile_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS achievements (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    image TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS user_progress (
                    id INTEGER PRIMARY KEY,
                    knowledge_score REAL NOT NULL,
                    learning_path TEXT NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS user_progress_topics (
                    progress_id INTEGER NOT NULL REFERENCES user_progress(id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                    PRIMARY KEY (progress_id, category_id)
                );
                CREATE TABLE IF NOT EXISTS user_progress_achievements (
                    progress_id INTEGER NOT NULL REFERENCES user_progress(id) ON DELETE CASCADE,
                    achievement_id INTEGER NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
                    PRIMARY KEY (progress_id, achievement_id)
                );",
            )?;
            Ok(())
        });

        // Version 4: simplified timelines and what-if scenarios
        self.add_migration(4, "create_what_if_timelines", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS what_if_timelines (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS what_if_timeline_events (
                    timeline_id INTEGER NOT NULL REFERENCES what_if_timelines(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (timeline_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS what_if_scenarios (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    original_timeline_id INTEGER NOT NULL REFERENCES what_if_timelines(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS what_if_scenario_modified_events (
                    scenario_id INTEGER NOT NULL REFERENCES what_if_scenarios(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (scenario_id, event_id)
                );",
            )?;
            Ok(())
        });

        // Version 5: user activity, simulations and debates
        self.add_migration(5, "create_interactions", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS interactions (
                    id INTEGER PRIMARY KEY,
                    interaction_type TEXT NOT NULL CHECK (interaction_type IN ('view', 'edit', 'create', 'predict')),
                    timestamp TIMESTAMP NOT NULL,
                    details TEXT NOT NULL DEFAULT '',
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    event_id INTEGER REFERENCES historical_events(id) ON DELETE CASCADE,
                    scenario_id INTEGER REFERENCES scenarios(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_interactions_user ON interactions(user_id);
                CREATE TABLE IF NOT EXISTS simulations (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    scenario_id INTEGER NOT NULL REFERENCES alternative_scenarios(id) ON DELETE CASCADE,
                    parameters TEXT NOT NULL,
                    difficulty_level INTEGER NOT NULL CHECK (difficulty_level IN (1, 2, 3))
                );
                CREATE TABLE IF NOT EXISTS user_decisions (
                    id INTEGER PRIMARY KEY,
                    decision_point TEXT NOT NULL,
                    choice_made TEXT NOT NULL,
                    outcome TEXT NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    simulation_id INTEGER NOT NULL REFERENCES simulations(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS historical_debates (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('ACTIVE', 'CONCLUDED', 'ARCHIVED')),
                    topic_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS arguments (
                    id INTEGER PRIMARY KEY,
                    content TEXT NOT NULL,
                    sources TEXT NOT NULL,
                    credibility_score REAL NOT NULL,
                    debate_id INTEGER NOT NULL REFERENCES historical_debates(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
                );",
            )?;
            Ok(())
        });

        // Version 6: quality metrics, patterns, predictive models and fact checks
        self.add_migration(6, "create_core_analytics", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS quality_metrics (
                    id INTEGER PRIMARY KEY,
                    content_type_id INTEGER NOT NULL REFERENCES content_types(id) ON DELETE CASCADE,
                    object_id INTEGER NOT NULL CHECK (object_id >= 0),
                    accuracy_score REAL NOT NULL,
                    completeness_score REAL NOT NULL,
                    source_reliability REAL NOT NULL,
                    peer_review_status TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_quality_metrics_object ON quality_metrics(content_type_id, object_id);
                CREATE TABLE IF NOT EXISTS historical_patterns (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    pattern_type TEXT NOT NULL,
                    confidence REAL NOT NULL,
                    detected_at TIMESTAMP NOT NULL
                );
                CREATE TABLE IF NOT EXISTS historical_pattern_events (
                    pattern_id INTEGER NOT NULL REFERENCES historical_patterns(id) ON DELETE CASCADE,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE,
                    PRIMARY KEY (pattern_id, event_id)
                );
                CREATE TABLE IF NOT EXISTS predictive_models (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    predicted_outcome TEXT NOT NULL,
                    probability REAL NOT NULL,
                    created_at TIMESTAMP NOT NULL
                );
                CREATE TABLE IF NOT EXISTS predictive_model_patterns (
                    model_id INTEGER NOT NULL REFERENCES predictive_models(id) ON DELETE CASCADE,
                    pattern_id INTEGER NOT NULL REFERENCES historical_patterns(id) ON DELETE CASCADE,
                    PRIMARY KEY (model_id, pattern_id)
                );
                CREATE TABLE IF NOT EXISTS fact_checks (
                    id INTEGER PRIMARY KEY,
                    claim TEXT NOT NULL,
                    verification_status TEXT NOT NULL CHECK (verification_status IN ('PENDING', 'VERIFIED', 'DISPUTED', 'REFUTED')),
                    notes TEXT NOT NULL DEFAULT '',
                    checked_at TIMESTAMP NOT NULL,
                    event_id INTEGER NOT NULL REFERENCES historical_events(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS fact_check_verifiers (
                    fact_check_id INTEGER NOT NULL REFERENCES fact_checks(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    PRIMARY KEY (fact_check_id, user_id)
                );",
            )?;

            // Generic references cannot carry foreign keys, so every
            // referenceable table cleans up its tags and metrics on delete.
            for kind in ContentKind::ALL {
                let (app_label, model) = kind.natural_key();
                tx.execute("INSERT OR IGNORE INTO content_types (app_label, model) VALUES (?1, ?2)", params![app_label, model])?;
                tx.execute_batch(&generic_cleanup_trigger(*kind))?;
            }
            Ok(())
        });

        // Version 7: permissions, grants and the scenario model's declared permissions
        self.add_migration(7, "create_permissions", |tx| {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS permissions (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    codename TEXT NOT NULL,
                    content_type_id INTEGER NOT NULL REFERENCES content_types(id) ON DELETE CASCADE,
                    UNIQUE (content_type_id, codename)
                );
                CREATE TABLE IF NOT EXISTS user_permissions (
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    permission_id INTEGER NOT NULL REFERENCES permissions(id) ON DELETE CASCADE,
                    PRIMARY KEY (user_id, permission_id)
                );",
            )?;
            permissions::declare_model_permissions(tx)?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Registers a hook that runs after every migration run.
    pub fn on_post_migrate(&mut self, name: &'static str, run: fn(&Transaction) -> Result<()>) {
        self.hooks.push(PostMigrateHook { name, run });
    }

    /// Applies pending migrations, then runs every post-migrate hook.
    ///
    /// Everything happens in one transaction; a failing migration or hook
    /// rolls the whole run back and is returned to the caller.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        let tx = conn.transaction()?;

        if pending.is_empty() {
            msg_debug!(Message::DatabaseUpToDate);
        } else {
            msg_info!(Message::MigrationsFound(pending.len()));
        }

        for migration in pending {
            msg_info!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_success!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        for hook in &self.hooks {
            msg_debug!(Message::RunningPostMigrateHook(hook.name.to_string()));
            if let Err(e) = (hook.run)(&tx) {
                msg_error!(Message::PostMigrateHookFailed(hook.name.to_string(), e.to_string()));
                return Err(e);
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    /// Highest applied version, or 0 for an empty database.
    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        if !migrations_table_exists(conn)? {
            return Ok(0);
        }
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;
        Ok(version.unwrap_or(0))
    }

    /// Latest version known to this build.
    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        if !migrations_table_exists(conn)? {
            return Ok(false);
        }
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Applied migrations as `(version, name, applied_at)`, ordered by version.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        if !migrations_table_exists(conn)? {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

fn migrations_table_exists(conn: &Connection) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'migrations')",
        [],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Trigger removing tagged items and quality metrics that point at a deleted row.
fn generic_cleanup_trigger(kind: ContentKind) -> String {
    let (app_label, model) = kind.natural_key();
    let table = kind.table();
    format!(
        "CREATE TRIGGER IF NOT EXISTS trg_{table}_generic_cleanup AFTER DELETE ON {table}
         BEGIN
             DELETE FROM tagged_items
              WHERE object_id = OLD.id
                AND content_type_id = (SELECT id FROM content_types WHERE app_label = '{app_label}' AND model = '{model}');
             DELETE FROM quality_metrics
              WHERE object_id = OLD.id
                AND content_type_id = (SELECT id FROM content_types WHERE app_label = '{app_label}' AND model = '{model}');
         END;"
    )
}

/// Applies every pending migration and post-migrate hook to `conn`.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    let manager = MigrationManager::new();
    manager.run_migrations(conn)?;
    Ok(())
}

/// Current schema version of `conn`.
pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let manager = MigrationManager::new();
    manager.get_current_version(conn)
}

/// True when `conn` is behind the latest known migration.
pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    Ok(current < manager.latest_version())
}
