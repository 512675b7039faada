pub mod admin;
pub mod comments;
pub mod posts;
pub mod session;

// The match over every action lives in `run` so this file only declares them.
mod run;

use crate::{app::App, config::ClientConfig};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Session(session::Args),
    Posts(posts::Args),
    Comments(comments::Args),
    Admin(admin::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the client cannot start or the operation fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

fn open(config: ClientConfig) -> Result<App> {
    App::new(config).context("failed to open client session")
}

/// Prints the value as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Turns a store sentinel into a CLI error; details were already logged.
fn require<T>(value: Option<T>, operation: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("{operation} failed, rerun with -v for details"))
}
