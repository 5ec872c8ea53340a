//! Backend and storage location arguments shared by every subcommand.

use crate::api::config::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Duration;

pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_DATA_DIR: &str = "data-dir";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let default_timeout: &'static str =
        Box::leak(DEFAULT_TIMEOUT.as_secs().to_string().into_boxed_str());

    command
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .long(ARG_API_BASE_URL)
                .help("Base URL of the backend API")
                .env("CAREPORT_API_BASE_URL")
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_DATA_DIR)
                .long(ARG_DATA_DIR)
                .help("Directory holding stored sessions (default: platform data dir)")
                .env("CAREPORT_DATA_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long(ARG_TIMEOUT_SECONDS)
                .help("Request and startup profile check timeout in seconds")
                .env("CAREPORT_TIMEOUT_SECONDS")
                .default_value(default_timeout)
                .value_parser(clap::value_parser!(u64).range(1..=300))
                .global(true),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if no data directory is given and the platform has none.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_base_url = matches
            .get_one::<String>(ARG_API_BASE_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let data_dir = match matches.get_one::<PathBuf>(ARG_DATA_DIR) {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|dir| dir.join(env!("CARGO_PKG_NAME")))
                .context("no platform data directory, pass --data-dir")?,
        };

        let timeout = matches
            .get_one::<u64>(ARG_TIMEOUT_SECONDS)
            .copied()
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Ok(Self {
            api_base_url,
            data_dir,
            timeout,
        })
    }
}
