use crate::{
    db::{db::Db, migrations::get_db_version},
    libs::messages::Message,
    msg_success,
};
use anyhow::Result;

/// Opens the configured database, which applies pending migrations and runs
/// the post-migrate hooks.
pub fn cmd() -> Result<()> {
    let db = Db::new()?;
    let version = get_db_version(&db)?;
    msg_success!(Message::DatabaseReady(version));
    Ok(())
}
