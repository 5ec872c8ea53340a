pub mod account;
pub mod client;
pub mod logging;

use clap::{
    ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("careport")
        .about("Patient and provider session client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = client::with_args(command);
    let command = account::with_subcommands(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::account::*;
    use super::client::{ARG_API_BASE_URL, ARG_DATA_DIR, ARG_TIMEOUT_SECONDS};
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "careport");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Patient and provider session client".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars([("CAREPORT_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "careport",
                "login",
                "--email",
                "a@b.com",
                "--password",
                "password1",
            ]);
            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, CMD_LOGIN);
            assert_eq!(
                sub.get_one::<String>(ARG_EMAIL).cloned(),
                Some("a@b.com".to_string())
            );
            assert_eq!(
                sub.get_one::<String>(ARG_PASSWORD).cloned(),
                Some("password1".to_string())
            );
        });
    }

    #[test]
    fn test_password_from_env() {
        temp_env::with_vars([("CAREPORT_PASSWORD", Some("from-env-1"))], || {
            let matches = new().get_matches_from(vec!["careport", "login", "--email", "a@b.com"]);
            let (_, sub) = matches.subcommand().unwrap();
            assert_eq!(
                sub.get_one::<String>(ARG_PASSWORD).cloned(),
                Some("from-env-1".to_string())
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CAREPORT_API_BASE_URL", Some("https://api.careport.test/api")),
                ("CAREPORT_DATA_DIR", Some("/tmp/careport-test")),
                ("CAREPORT_TIMEOUT_SECONDS", Some("5")),
                ("CAREPORT_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["careport", "sessions"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_BASE_URL).cloned(),
                    Some("https://api.careport.test/api".to_string())
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(ARG_DATA_DIR).cloned(),
                    Some(PathBuf::from("/tmp/careport-test"))
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_SECONDS).copied(), Some(5));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("CAREPORT_API_BASE_URL", None::<&str>),
                ("CAREPORT_TIMEOUT_SECONDS", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec!["careport", "whoami"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_API_BASE_URL).cloned(),
                    Some("http://localhost:5000/api".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_SECONDS).copied(), Some(12));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("CAREPORT_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["careport", "sessions"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 1..5_usize {
            temp_env::with_vars([("CAREPORT_LOG_LEVEL", None::<String>)], || {
                let verbose = format!("-{}", "v".repeat(index));
                let matches = new().get_matches_from(vec!["careport", verbose.as_str(), "sessions"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_verify_codes_come_in_pairs() {
        let result = new().try_get_matches_from(vec!["careport", "verify", "--email-otp", "1234"]);
        assert!(result.is_err());

        let matches = new().get_matches_from(vec!["careport", "verify"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_one::<String>(ARG_EMAIL_OTP).is_none());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(new().try_get_matches_from(vec!["careport"]).is_err());
    }
}
