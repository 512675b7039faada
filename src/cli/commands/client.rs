use crate::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_STATE_FILE, DEFAULT_TIMEOUT_SECONDS};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the twitter-api, example: http://localhost:9999/api/v1")
                .env("TWITTER_CLIENT_API_URL")
                .global(true)
                .default_value(DEFAULT_API_URL),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long(ARG_STATE_FILE)
                .help("File holding the persisted session (tokens and user)")
                .env("TWITTER_CLIENT_STATE_FILE")
                .global(true)
                .default_value(DEFAULT_STATE_FILE),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("HTTP request timeout in seconds")
                .env("TWITTER_CLIENT_TIMEOUT_SECONDS")
                .global(true)
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

/// Builds the client configuration from the parsed arguments.
///
/// # Errors
/// Returns an error if the API URL is missing or invalid.
pub fn parse(matches: &ArgMatches) -> Result<ClientConfig> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .context("missing required argument: --api-url")?;
    let state_file = matches
        .get_one::<String>(ARG_STATE_FILE)
        .context("missing required argument: --state-file")?;
    let timeout = matches
        .get_one::<u64>(ARG_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    ClientConfig::new(api_url, state_file, timeout).context("invalid client configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{path::PathBuf, time::Duration};

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        temp_env::with_vars(
            [
                ("TWITTER_CLIENT_API_URL", None::<&str>),
                ("TWITTER_CLIENT_STATE_FILE", None::<&str>),
                ("TWITTER_CLIENT_TIMEOUT_SECONDS", None::<&str>),
            ],
            || {
                let matches = command().get_matches_from(vec!["test"]);
                let config = parse(&matches);
                assert!(config.is_ok());
                if let Ok(config) = config {
                    assert_eq!(config.api_base_url.as_str(), DEFAULT_API_URL);
                    assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_FILE));
                    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
                }
            },
        );
    }

    #[test]
    fn env_overrides_defaults() {
        temp_env::with_vars(
            [
                ("TWITTER_CLIENT_API_URL", Some("https://api.example.com/api/v1/")),
                ("TWITTER_CLIENT_STATE_FILE", Some("/tmp/session.json")),
                ("TWITTER_CLIENT_TIMEOUT_SECONDS", Some("3")),
            ],
            || {
                let matches = command().get_matches_from(vec!["test"]);
                let config = parse(&matches);
                assert!(config.is_ok());
                if let Ok(config) = config {
                    assert_eq!(config.api_base_url.as_str(), "https://api.example.com/api/v1");
                    assert_eq!(config.state_path, PathBuf::from("/tmp/session.json"));
                    assert_eq!(config.timeout, Duration::from_secs(3));
                }
            },
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        temp_env::with_vars([("TWITTER_CLIENT_API_URL", None::<&str>)], || {
            let matches =
                command().get_matches_from(vec!["test", "--api-url", "ftp://example.com"]);
            let result = parse(&matches);
            assert!(result.is_err());
        });
    }
}
