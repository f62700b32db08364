//! Users command - Account administration from the shell.

use crate::cli::args::{UsersAction, UsersArgs};
use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::{AppResult, OptionExt};
use crate::infra::{Database, UserRepository, UserStore};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config.database_url).await?;
    let users = UserStore::new(db.get_connection());

    match args.action {
        UsersAction::Promote { email } => {
            let user = users
                .find_by_email(email.trim())
                .await?
                .ok_or_not_found("User")?;

            if user.role.is_admin() {
                println!("{} is already an admin", user.email);
                return Ok(());
            }

            users.set_role(user.id, UserRole::Admin).await?;
            tracing::info!(user_id = %user.id, "User promoted to admin");
            println!("{} is now an admin", user.email);
        }
    }

    Ok(())
}
