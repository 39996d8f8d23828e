/// Every user-facing message in dejavue.
///
/// Text lives in `display.rs`; this enum only carries the parameters.
#[derive(Debug, Clone)]
pub enum Message {
    // === DATABASE MESSAGES ===
    DatabaseOpened(String), // path
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    DatabaseReady(u32), // version

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),        // count
    RunningMigration(u32, String), // version, name
    MigrationCompleted(u32),       // version
    MigrationFailed(u32, String),  // version, error
    AllMigrationsCompleted,
    MigrationHistory,
    NoMigrationsApplied,
    RunningPostMigrateHook(String),        // hook name
    PostMigrateHookFailed(String, String), // hook name, error

    // === PERMISSION MESSAGES ===
    PermissionCreated(String), // codename
    PermissionExists(String),  // codename
    PermissionGranted(i64, i64),       // permission id, user id
    PermissionsHeader,
    PermissionsForUser(String), // email
    NoPermissionsFound,
    UserNotFound(String), // email

    // === RECORD MESSAGES ===
    RecordSaved(&'static str, i64),   // entity, id
    RecordUpdated(&'static str, i64), // entity, id
    RecordDeleted(&'static str, i64), // entity, id
    SlugDerived(String, String),      // name, slug
    TagCreated(String),               // tag name
    TimelineReordered(i64, usize),    // timeline id, event count

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigFileNotFound,
    ConfigParseError,
    DatabasePathOverride(String), // path
    PromptDatabasePath,

    // === GENERAL MESSAGES ===
    OperationCancelled,
}
