use clap::{Arg, Command, builder::ValueParser};
use std::str::FromStr;
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";

/// How diagnostics are rendered on stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("invalid log format '{other}', expected pretty, compact or json")),
        }
    }
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts either a level name or its index in `LEVELS`.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        let level = level.trim().to_lowercase();
        LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .or_else(|| level.parse::<u8>().ok().filter(|n| *n <= 5))
            .ok_or_else(|| format!("invalid log level '{level}', expected one of {LEVELS:?}"))
    })
}

/// Maps the verbosity count to a level; `None` keeps the error-only default.
#[must_use]
pub const fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CAREPORT_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .arg(
            Arg::new(ARG_LOG_FORMAT)
                .long("log-format")
                .help("Diagnostics format on stderr: pretty, compact, json")
                .env("CAREPORT_LOG_FORMAT")
                .global(true)
                .value_parser(ValueParser::from(|raw: &str| raw.parse::<LogFormat>()))
                .default_value("pretty"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_and_numbers_parse() {
        let command = with_args(Command::new("t"));
        for (raw, expected) in [("ERROR", 0), ("info", 2), (" trace ", 4), ("5", 5)] {
            let matches = temp_env::with_var("CAREPORT_LOG_LEVEL", Some(raw), || {
                command.clone().get_matches_from(vec!["t"])
            });
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(expected));
        }
    }

    #[test]
    fn unknown_level_is_rejected() {
        let result = temp_env::with_var("CAREPORT_LOG_LEVEL", Some("loud"), || {
            with_args(Command::new("t")).try_get_matches_from(vec!["t"])
        });
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), None);
        assert_eq!(level_for(1), Some(Level::WARN));
        assert_eq!(level_for(2), Some(Level::INFO));
        assert_eq!(level_for(3), Some(Level::DEBUG));
        assert_eq!(level_for(9), Some(Level::TRACE));
    }

    #[test]
    fn log_format_defaults_to_pretty() {
        temp_env::with_var("CAREPORT_LOG_FORMAT", None::<&str>, || {
            let matches = with_args(Command::new("t")).get_matches_from(vec!["t"]);
            assert_eq!(
                matches.get_one::<LogFormat>(ARG_LOG_FORMAT).copied(),
                Some(LogFormat::Pretty)
            );
        });
        temp_env::with_var("CAREPORT_LOG_FORMAT", Some("json"), || {
            let matches = with_args(Command::new("t")).get_matches_from(vec!["t"]);
            assert_eq!(
                matches.get_one::<LogFormat>(ARG_LOG_FORMAT).copied(),
                Some(LogFormat::Json)
            );
        });
    }
}
