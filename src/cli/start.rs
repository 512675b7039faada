use crate::cli::{
    actions::Action,
    commands::{
        self,
        logging::{LogFormat, ARG_LOG_FORMAT, ARG_OTLP_ENDPOINT, ARG_VERBOSITY},
    },
    dispatch, telemetry,
};
use anyhow::Result;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if telemetry initialization or action dispatch fails
pub fn start() -> Result<Action> {
    // 1. Parse command-line arguments
    let matches = commands::new().get_matches();
    let leaf = dispatch::leaf(&matches);

    // 2. Extract logging options
    let verbosity_level =
        get_verbosity_level(leaf.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0));
    let log_format = leaf
        .get_one::<LogFormat>(ARG_LOG_FORMAT)
        .copied()
        .unwrap_or_default();
    let otlp_endpoint = leaf.get_one::<String>(ARG_OTLP_ENDPOINT).map(String::as_str);

    // 3. Initialize telemetry
    telemetry::init(verbosity_level, log_format, otlp_endpoint)?;

    // 4. Dispatch to appropriate action
    let action = dispatch::handler(&matches)?;

    Ok(action)
}
