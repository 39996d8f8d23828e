use crate::{
    db::{
        db::Db,
        migrations::{get_db_version, needs_migration, MigrationManager},
    },
    libs::{config::Config, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    /// Show current database version
    Status,
    /// Show migration history
    History,
}

/// Reports on the schema without migrating it.
pub fn cmd(args: MigrationsArgs) -> Result<()> {
    let config = Config::read()?;
    let db = Db::open_without_migrations(config.database_path()?)?;

    match args.command {
        MigrationsCommand::Status => {
            let version = get_db_version(&db)?;

            msg_print!(Message::DatabaseVersion(version));
            if needs_migration(&db)? {
                msg_info!(Message::DatabaseNeedsUpdate);
            } else {
                msg_info!(Message::DatabaseUpToDate);
            }
        }
        MigrationsCommand::History => {
            let history = MigrationManager::new().get_migration_history(&db)?;

            if history.is_empty() {
                msg_info!(Message::NoMigrationsApplied);
            } else {
                msg_print!(Message::MigrationHistory, true);
                View::migrations(&history)?;
            }
        }
    }

    Ok(())
}
