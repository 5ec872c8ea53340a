use crate::cli::commands::{self, logging};
use crate::cli::{actions::Action, dispatch, telemetry};
use anyhow::Result;

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let level = logging::level_for(
        matches
            .get_one::<u8>(logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    );
    let format = matches
        .get_one::<logging::LogFormat>(logging::ARG_LOG_FORMAT)
        .copied()
        .unwrap_or_default();

    telemetry::init(level, format)?;

    dispatch::handler(&matches)
}
