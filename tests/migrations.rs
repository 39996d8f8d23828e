#[cfg(test)]
mod tests {
    use dejavue::db::content_types::ContentKind;
    use dejavue::db::db::Db;
    use dejavue::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use dejavue::db::permissions::{Permissions, CAN_CREATE_SCENARIOS};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("test.db");
            MigrationTestContext {
                _temp_dir: temp_dir,
                db_path,
            }
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_on_open(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();

        let version = get_db_version(&db).unwrap();
        assert_eq!(version, MigrationManager::new().latest_version());
        assert!(!needs_migration(&db).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_database_needs_migration(ctx: &mut MigrationTestContext) {
        let db = Db::open_without_migrations(&ctx.db_path).unwrap();

        assert_eq!(get_db_version(&db).unwrap(), 0);
        assert!(needs_migration(&db).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history_in_order(ctx: &mut MigrationTestContext) {
        let mut db = Db::open_without_migrations(&ctx.db_path).unwrap();
        let manager = MigrationManager::new();
        manager.run_migrations(&mut db.conn).unwrap();

        let history = manager.get_migration_history(&db).unwrap();
        assert_eq!(history.len() as u32, manager.latest_version());
        for (i, (version, name, _applied_at)) in history.iter().enumerate() {
            assert_eq!(*version as usize, i + 1);
            assert!(!name.is_empty());
        }
        assert!(manager.is_migration_applied(&db, 1).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_are_idempotent(ctx: &mut MigrationTestContext) {
        let mut db = Db::open_without_migrations(&ctx.db_path).unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut db.conn).unwrap();
        let first = manager.get_migration_history(&db).unwrap();
        manager.run_migrations(&mut db.conn).unwrap();
        let second = manager.get_migration_history(&db).unwrap();

        assert_eq!(first, second);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_post_migrate_hook_creates_permission_once(ctx: &mut MigrationTestContext) {
        // Opening twice runs the hook twice.
        drop(Db::open(&ctx.db_path).unwrap());
        let db = Db::open(&ctx.db_path).unwrap();

        let count: i64 = db
            .query_row(
                "SELECT COUNT(*) FROM permissions WHERE codename = ?1",
                [CAN_CREATE_SCENARIOS],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        let permission = Permissions::new(&db)
            .get(ContentKind::WhatIfScenario, CAN_CREATE_SCENARIOS)
            .unwrap()
            .unwrap();
        assert_eq!(permission.name, "Can create What-If scenarios");
        assert_eq!(permission.full_codename(), "timeline.can_create_scenarios");
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_what_if_scenario_permissions_declared(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();
        let permissions = Permissions::new(&db);

        for codename in [
            "add_whatifscenario",
            "change_whatifscenario",
            "delete_whatifscenario",
            "view_whatifscenario",
            "can_create_scenario",
            "can_edit_scenario",
            "can_delete_scenario",
        ] {
            assert!(
                permissions.get(ContentKind::WhatIfScenario, codename).unwrap().is_some(),
                "missing {}",
                codename
            );
        }
    }

    #[test]
    fn test_in_memory_database_is_migrated() {
        let db = Db::in_memory().unwrap();
        assert!(!needs_migration(&db).unwrap());
    }
}
