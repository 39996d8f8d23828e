//! Command-line interface for dejavue.
//!
//! The binary is deployment tooling: it points dejavue at a database file,
//! applies migrations (which also runs the permission bootstrap), and
//! reports schema and permission state.
//!
//! ## Commands
//!
//! - **`init`**: write or remove the configuration file
//! - **`migrate`**: apply pending migrations and post-migrate hooks
//! - **`migrations status|history`**: inspect the schema version
//! - **`permissions`**: list permissions, optionally for one user

pub mod init;
pub mod migrate;
pub mod migrations;
pub mod permissions;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configure the database location")]
    Init(init::InitArgs),
    #[command(about = "Apply pending migrations and post-migrate hooks")]
    Migrate,
    #[command(about = "Inspect the database schema version")]
    Migrations(migrations::MigrationsArgs),
    #[command(about = "List permissions")]
    Permissions(permissions::PermissionsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Migrate => migrate::cmd(),
            Commands::Migrations(args) => migrations::cmd(args),
            Commands::Permissions(args) => permissions::cmd(args),
        }
    }
}
