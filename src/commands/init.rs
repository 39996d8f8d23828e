use crate::{
    libs::{
        config::{Config, DatabaseConfig},
        messages::Message,
    },
    msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// SQLite file to use; prompted for when omitted
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Remove the existing configuration instead of writing one
    #[arg(short, long)]
    delete: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        Config::delete()?;
        msg_success!(Message::ConfigDeleted);
        return Ok(());
    }

    let mut config = Config::read()?;
    let path = match init_args.db_path {
        Some(path) => path,
        None => prompt_database_path(&config)?,
    };

    let database = config.database.take().unwrap_or_default();
    config.database = Some(DatabaseConfig {
        path: Some(path),
        ..database
    });
    config.save()?;

    msg_success!(Message::ConfigSaved);
    Ok(())
}

fn prompt_database_path(config: &Config) -> Result<PathBuf> {
    let current = config.database_path()?;
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptDatabasePath.to_string())
        .default(current.display().to_string())
        .interact_text()?;
    Ok(PathBuf::from(answer.trim()))
}
