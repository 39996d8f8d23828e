#[cfg(test)]
mod tests {
    use dejavue::libs::config::{Config, DatabaseConfig};
    use dejavue::libs::data_storage::DataStorage;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            ConfigTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_gives_default(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.busy_timeout_ms(), 5_000);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_back(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        let config = Config {
            database: Some(DatabaseConfig {
                path: Some(PathBuf::from("/srv/dejavue/catalogue.db")),
                busy_timeout_ms: Some(250),
            }),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.busy_timeout_ms(), 250);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_unset_sections_are_not_written(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        Config::default().save_to(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_json_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Config::read_from(&path).is_err());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_data_storage_creates_directory(ctx: &mut ConfigTestContext) {
        let base = ctx.temp_dir.path().join("nested").join("data");
        let path = DataStorage::at(&base).get_path("dejavue.db").unwrap();

        assert!(base.is_dir());
        assert_eq!(path, base.join("dejavue.db"));
    }
}
