use crate::{
    db::{db::Db, permissions::Permissions, users::Users},
    libs::{messages::Message, view::View},
    msg_bail_anyhow, msg_error_anyhow, msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct PermissionsArgs {
    /// Only show permissions granted to this user
    #[arg(short, long)]
    user: Option<String>,
}

pub fn cmd(args: PermissionsArgs) -> Result<()> {
    let db = Db::new()?;
    let permissions = Permissions::new(&db);

    let list = match args.user {
        Some(email) => {
            let Some(user) = Users::new(&db).find_by_email(&email)? else {
                msg_bail_anyhow!(Message::UserNotFound(email));
            };
            let user_id = user.id.ok_or_else(|| msg_error_anyhow!(Message::UserNotFound(email.clone())))?;
            msg_print!(Message::PermissionsForUser(email), true);
            permissions.effective_for_user(user_id)?
        }
        None => {
            msg_print!(Message::PermissionsHeader, true);
            permissions.list()?
        }
    };

    if list.is_empty() {
        msg_info!(Message::NoPermissionsFound);
    } else {
        View::permissions(&list)?;
    }
    Ok(())
}
