//! Maps validated CLI matches to an `Action`.

use crate::api::ApiConfig;
use crate::cli::actions::{Action, session, verify};
use crate::cli::commands::{account::*, client};
use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the API URL is invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("no subcommand given"))?;

    // global arguments are propagated down to the subcommand
    let options = client::Options::parse(sub)?;
    let api = ApiConfig::new(&options.api_base_url, options.timeout)
        .context("invalid CAREPORT_API_BASE_URL")?;
    let globals = GlobalArgs::new(api, options.data_dir);

    let session_action = |command: session::Command| -> Result<Action> {
        Ok(Action::Session(session::Args {
            globals: globals.clone(),
            command,
        }))
    };
    let verify_action = |command: verify::Command| -> Result<Action> {
        Ok(Action::Verify(verify::Args {
            globals: globals.clone(),
            command,
        }))
    };

    match name {
        CMD_LOGIN => session_action(session::Command::Login {
            email: required(sub, ARG_EMAIL)?,
            password: SecretString::from(required(sub, ARG_PASSWORD)?),
        }),
        CMD_REGISTER => session_action(session::Command::Register {
            name: required(sub, ARG_NAME)?,
            email: required(sub, ARG_EMAIL)?,
            phone: required(sub, ARG_PHONE)?,
            password: SecretString::from(required(sub, ARG_PASSWORD)?),
        }),
        CMD_WHOAMI => session_action(session::Command::WhoAmI),
        CMD_SESSIONS => session_action(session::Command::List),
        CMD_SWITCH_ROLE => session_action(session::Command::SwitchRole {
            role: required(sub, ARG_ROLE)?,
        }),
        CMD_LOGOUT => session_action(session::Command::Logout {
            role: sub.get_one::<String>(ARG_ROLE).cloned(),
        }),
        CMD_OPEN => session_action(session::Command::Open {
            path: required(sub, ARG_PATH)?,
        }),
        CMD_VERIFY => match (
            sub.get_one::<String>(ARG_EMAIL_OTP),
            sub.get_one::<String>(ARG_PHONE_OTP),
        ) {
            (Some(email_otp), Some(phone_otp)) => verify_action(verify::Command::Submit {
                email_otp: email_otp.clone(),
                phone_otp: phone_otp.clone(),
            }),
            _ => verify_action(verify::Command::Interactive),
        },
        CMD_RESEND => verify_action(verify::Command::Resend),
        CMD_CHANGE_CONTACT => verify_action(verify::Command::ChangeContact {
            email: required(sub, ARG_EMAIL)?,
            phone: required(sub, ARG_PHONE)?,
        }),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Result<Action> {
        temp_env::with_vars(
            [
                ("CAREPORT_API_BASE_URL", None::<&str>),
                ("CAREPORT_DATA_DIR", Some("/tmp/careport-dispatch")),
                ("CAREPORT_PASSWORD", None::<&str>),
            ],
            || {
                let mut argv = vec!["careport"];
                argv.extend_from_slice(args);
                handler(&commands::new().get_matches_from(argv))
            },
        )
    }

    #[test]
    fn login_maps_to_session_action() {
        let action = dispatch(&["login", "--email", "a@b.com", "--password", "password1"]).unwrap();
        let Action::Session(args) = action else {
            panic!("expected session action");
        };
        assert_eq!(args.globals.api.base_url, "http://localhost:5000/api");
        assert_eq!(args.globals.data_dir.to_str(), Some("/tmp/careport-dispatch"));
        let session::Command::Login { email, password } = args.command else {
            panic!("expected login");
        };
        assert_eq!(email, "a@b.com");
        assert_eq!(password.expose_secret(), "password1");
    }

    #[test]
    fn verify_without_codes_is_interactive() {
        let action = dispatch(&["verify"]).unwrap();
        assert!(matches!(
            action,
            Action::Verify(verify::Args {
                command: verify::Command::Interactive,
                ..
            })
        ));

        let action = dispatch(&["verify", "--email-otp", "1234", "--phone-otp", "5678"]).unwrap();
        assert!(matches!(
            action,
            Action::Verify(verify::Args {
                command: verify::Command::Submit { .. },
                ..
            })
        ));
    }

    #[test]
    fn logout_role_is_optional() {
        let action = dispatch(&["logout", "--role", "doctor"]).unwrap();
        assert!(matches!(
            action,
            Action::Session(session::Args {
                command: session::Command::Logout { role: Some(ref role) },
                ..
            }) if role == "doctor"
        ));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = dispatch(&["--api-base-url", "ftp://files.example", "sessions"]);
        assert!(result.is_err());
    }
}
