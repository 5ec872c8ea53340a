//! Subcommands standing in for the client's views and buttons.

use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_RESEND: &str = "resend";
pub const CMD_CHANGE_CONTACT: &str = "change-contact";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_SESSIONS: &str = "sessions";
pub const CMD_SWITCH_ROLE: &str = "switch-role";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_OPEN: &str = "open";

pub const ARG_NAME: &str = "name";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PHONE: &str = "phone";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_EMAIL_OTP: &str = "email-otp";
pub const ARG_PHONE_OTP: &str = "phone-otp";
pub const ARG_ROLE: &str = "role";
pub const ARG_PATH: &str = "path";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .long(ARG_EMAIL)
        .help("Account email address")
        .required(true)
}

fn phone_arg() -> Arg {
    Arg::new(ARG_PHONE)
        .long(ARG_PHONE)
        .help("10-digit phone number")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("CAREPORT_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and store the session for the account's role")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account; codes are sent to email and phone")
                .arg(
                    Arg::new(ARG_NAME)
                        .long(ARG_NAME)
                        .help("Full name")
                        .required(true),
                )
                .arg(email_arg())
                .arg(phone_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new(CMD_VERIFY)
                .about("Verify a pending account; interactive when no codes are given")
                .arg(
                    Arg::new(ARG_EMAIL_OTP)
                        .long(ARG_EMAIL_OTP)
                        .help("4-digit code sent by email")
                        .requires(ARG_PHONE_OTP),
                )
                .arg(
                    Arg::new(ARG_PHONE_OTP)
                        .long(ARG_PHONE_OTP)
                        .help("4-digit code sent by SMS")
                        .requires(ARG_EMAIL_OTP),
                ),
        )
        .subcommand(
            Command::new(CMD_RESEND)
                .about("Request new verification codes once the resend cooldown ends"),
        )
        .subcommand(
            Command::new(CMD_CHANGE_CONTACT)
                .about("Change email and phone of a pending account, then resend codes")
                .arg(email_arg())
                .arg(phone_arg()),
        )
        .subcommand(
            Command::new(CMD_WHOAMI).about("Validate the stored session and show the active user"),
        )
        .subcommand(Command::new(CMD_SESSIONS).about("List stored role sessions"))
        .subcommand(
            Command::new(CMD_SWITCH_ROLE)
                .about("Make another stored role the active identity")
                .arg(Arg::new(ARG_ROLE).help("Role, e.g. USER or doctor").required(true)),
        )
        .subcommand(
            Command::new(CMD_LOGOUT)
                .about("Sign out the active identity, or only the given role")
                .arg(
                    Arg::new(ARG_ROLE)
                        .long(ARG_ROLE)
                        .help("Clear only this role's stored session"),
                ),
        )
        .subcommand(
            Command::new(CMD_OPEN)
                .about("Resolve a route the way the client would navigate to it")
                .arg(Arg::new(ARG_PATH).help("Route path, e.g. /dashboard").required(true)),
        )
}
