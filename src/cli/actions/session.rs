use super::{open, print_json, require};
use crate::{
    api::types::{Credentials, User},
    config::ClientConfig,
    router::{Navigation, Resolution},
};
use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug)]
pub enum Command {
    Login(Credentials),
    Register(Credentials),
    Logout,
    Refresh,
    Profile,
    Status,
    Navigate { path: String },
}

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub command: Command,
}

#[derive(Serialize)]
struct Status {
    authenticated: bool,
    admin: bool,
    user: Option<User>,
}

#[derive(Serialize)]
struct NavigateOutcome<'a> {
    path: &'a str,
    #[serde(flatten)]
    resolution: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a str>,
}

/// Execute a session action.
/// # Errors
/// Returns an error if the session cannot be opened or the operation fails.
pub async fn execute(args: Args) -> Result<()> {
    let app = open(args.config)?;
    let session = app.session();

    match args.command {
        Command::Login(credentials) => {
            if !session.login(&credentials).await {
                bail!("login failed, rerun with -v for details");
            }
            print_json(&session.user().await)?;
        }
        Command::Register(credentials) => {
            if !session.register(&credentials).await {
                bail!("register failed, rerun with -v for details");
            }
            println!("registered {}, you can log in now", credentials.email);
        }
        Command::Logout => {
            session.logout().await;
            debug!("session cleared");
            println!("logged out");
        }
        Command::Refresh => {
            if !session.refresh().await {
                bail!("refresh failed, the session was logged out");
            }
            println!("access token refreshed");
        }
        Command::Profile => {
            let user = require(session.fetch_profile().await, "fetch profile")?;
            print_json(&user)?;
        }
        Command::Status => {
            print_json(&Status {
                authenticated: session.is_authenticated().await,
                admin: session.is_admin().await,
                user: session.user().await,
            })?;
        }
        Command::Navigate { path } => {
            let resolution = app.navigate(&path).await;
            let destination = match resolution {
                Resolution::Navigate {
                    navigation: navigation @ (Navigation::RedirectToLogin | Navigation::RedirectToHome),
                    ..
                } => Some(navigation.destination(&path)),
                _ => None,
            };

            print_json(&NavigateOutcome {
                path: &path,
                resolution,
                destination,
            })?;

            if resolution == Resolution::NotFound {
                bail!("no page at {path}");
            }
        }
    }

    Ok(())
}
