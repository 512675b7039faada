use super::{open, print_json, require};
use crate::config::ClientConfig;
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    Users,
}

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub command: Command,
}

/// Execute an admin action.
/// # Errors
/// Returns an error if the session cannot be opened or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let app = open(args.config)?;

    match args.command {
        Command::Users => print_json(&require(app.admin().get_all_users().await, "get all users")?),
    }
}
