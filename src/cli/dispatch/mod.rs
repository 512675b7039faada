//! Maps parsed CLI arguments to an [`Action`].
//!
//! Connection options are global, so they are read from the innermost
//! subcommand where clap propagates them.

use crate::api::types::Credentials;
use crate::cli::actions::{admin, comments, posts, session, Action};
use crate::cli::commands::{
    client, ARG_CONTENT, ARG_EMAIL, ARG_ID, ARG_PASSWORD, ARG_PATH, ARG_POST_ID, ARG_USER_ID,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

/// Innermost subcommand matches.
#[must_use]
pub fn leaf(matches: &ArgMatches) -> &ArgMatches {
    let mut current = matches;
    while let Some((_, sub)) = current.subcommand() {
        current = sub;
    }
    current
}

fn string(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: <{name}>"))
}

fn id(matches: &ArgMatches, name: &str) -> Result<i64> {
    matches
        .get_one::<i64>(name)
        .copied()
        .with_context(|| format!("missing required argument: <{name}>"))
}

fn credentials(matches: &ArgMatches) -> Result<Credentials> {
    let email = string(matches, ARG_EMAIL)?;
    let password = string(matches, ARG_PASSWORD)?;

    Ok(Credentials::new(email.trim(), SecretString::from(password)))
}

fn unknown(name: &str) -> anyhow::Error {
    anyhow!("unknown subcommand: {name}")
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the client
/// configuration is invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let config = client::parse(leaf(matches))?;

    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    let action = match name {
        "login" => Action::Session(session::Args {
            config,
            command: session::Command::Login(credentials(sub)?),
        }),
        "register" => Action::Session(session::Args {
            config,
            command: session::Command::Register(credentials(sub)?),
        }),
        "logout" | "refresh" | "profile" | "status" => {
            let command = match name {
                "logout" => session::Command::Logout,
                "refresh" => session::Command::Refresh,
                "profile" => session::Command::Profile,
                _ => session::Command::Status,
            };
            Action::Session(session::Args { config, command })
        }
        "navigate" => Action::Session(session::Args {
            config,
            command: session::Command::Navigate {
                path: string(sub, ARG_PATH)?,
            },
        }),
        "posts" => {
            let (op, m) = sub.subcommand().context("missing posts subcommand")?;
            let command = match op {
                "list" => posts::Command::List,
                "get" => posts::Command::Get { id: id(m, ARG_ID)? },
                "by-user" => posts::Command::ByUser {
                    user_id: id(m, ARG_USER_ID)?,
                },
                "create" => posts::Command::Create {
                    content: string(m, ARG_CONTENT)?,
                },
                "update" => posts::Command::Update {
                    id: id(m, ARG_ID)?,
                    content: string(m, ARG_CONTENT)?,
                },
                "delete" => posts::Command::Delete { id: id(m, ARG_ID)? },
                other => return Err(unknown(other)),
            };
            Action::Posts(posts::Args { config, command })
        }
        "comments" => {
            let (op, m) = sub.subcommand().context("missing comments subcommand")?;
            let command = match op {
                "list" => comments::Command::List {
                    post_id: id(m, ARG_POST_ID)?,
                },
                "create" => comments::Command::Create {
                    post_id: id(m, ARG_POST_ID)?,
                    content: string(m, ARG_CONTENT)?,
                },
                "update" => comments::Command::Update {
                    id: id(m, ARG_ID)?,
                    content: string(m, ARG_CONTENT)?,
                },
                "delete" => comments::Command::Delete { id: id(m, ARG_ID)? },
                other => return Err(unknown(other)),
            };
            Action::Comments(comments::Args { config, command })
        }
        "admin" => match sub.subcommand_name() {
            Some("users") => Action::Admin(admin::Args {
                config,
                command: admin::Command::Users,
            }),
            other => return Err(unknown(other.unwrap_or_default())),
        },
        other => return Err(unknown(other)),
    };

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn login_builds_credentials() {
        temp_env::with_vars([("TWITTER_CLIENT_PASSWORD", Some("pw"))], || {
            let action = dispatch(&["twitter-client", "login", "-e", " jane@example.com "]);
            match action {
                Ok(Action::Session(session::Args {
                    command: session::Command::Login(creds),
                    ..
                })) => {
                    assert_eq!(creds.email, "jane@example.com");
                    assert_eq!(creds.password.expose_secret(), "pw");
                }
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }

    #[test]
    fn global_options_after_subcommand_are_honored() {
        temp_env::with_vars([("TWITTER_CLIENT_API_URL", None::<&str>)], || {
            let action = dispatch(&[
                "twitter-client",
                "posts",
                "update",
                "5",
                "edited",
                "--api-url",
                "https://api.example.com/api/v1",
            ]);
            match action {
                Ok(Action::Posts(posts::Args {
                    config,
                    command: posts::Command::Update { id, content },
                })) => {
                    assert_eq!(config.api_base_url.as_str(), "https://api.example.com/api/v1");
                    assert_eq!(id, 5);
                    assert_eq!(content, "edited");
                }
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }

    #[test]
    fn admin_users_and_navigate_dispatch() {
        assert!(matches!(
            dispatch(&["twitter-client", "admin", "users"]),
            Ok(Action::Admin(admin::Args {
                command: admin::Command::Users,
                ..
            }))
        ));

        match dispatch(&["twitter-client", "navigate", "/admin/users"]) {
            Ok(Action::Session(session::Args {
                command: session::Command::Navigate { path },
                ..
            })) => assert_eq!(path, "/admin/users"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn invalid_api_url_fails_dispatch() {
        temp_env::with_vars([("TWITTER_CLIENT_API_URL", Some("not a url"))], || {
            let result = dispatch(&["twitter-client", "status"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn leaf_returns_innermost_matches() -> Result<()> {
        let matches =
            commands::new().try_get_matches_from(["twitter-client", "comments", "delete", "3"])?;
        assert_eq!(leaf(&matches).get_one::<i64>(ARG_ID).copied(), Some(3));
        Ok(())
    }
}
