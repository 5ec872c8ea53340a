//! OTP verification commands. A verification view lives for one process:
//! codes and cooldown start fresh each run, only the pending registration is
//! stored.

use crate::auth::client::AuthApi;
use crate::cli::globals::GlobalArgs;
use crate::verification::{Banner, VerificationFlow, VerifyState};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Debug)]
pub enum Command {
    Submit { email_otp: String, phone_otp: String },
    /// Prompt loop over stdin, the closest thing to the verification page.
    Interactive,
    Resend,
    ChangeContact { email: String, phone: String },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// # Errors
/// Returns an error if nothing is pending or the requested step fails.
pub async fn execute(args: Args) -> Result<()> {
    let Args { globals, command } = args;
    let client = globals.client()?;
    let auth = globals.auth_context();
    let mut flow = VerificationFlow::start(&client, auth)?;

    match command {
        Command::Submit {
            email_otp,
            phone_otp,
        } => {
            flow.set_email_otp(&email_otp);
            flow.set_phone_otp(&phone_otp);
            submit(&mut flow).await?;
        }
        Command::Resend => {
            let mut remaining = flow.cooldown().subscribe();
            while *remaining.borrow_and_update() > 0 {
                info!(seconds = *remaining.borrow(), "waiting for resend cooldown");
                remaining.changed().await?;
            }
            flow.resend().await?;
            print_banner(flow.banner());
        }
        Command::ChangeContact { email, phone } => {
            flow.change_contact(&email, &phone).await?;
            println!("Contact details updated");
            print_banner(flow.banner());
        }
        Command::Interactive => interactive(&mut flow).await?,
    }

    Ok(())
}

async fn submit<A: AuthApi>(flow: &mut VerificationFlow<'_, A>) -> Result<()> {
    let role = flow.submit().await?;
    print_banner(flow.banner());
    println!("Signed in as {role}");
    if let Some(path) = flow.redirect_after_verify().await {
        println!("-> {path}");
    }
    Ok(())
}

/// A line typed at the verification prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Codes { email_otp: String, phone_otp: String },
    Resend,
    Change { email: String, phone: String },
    Status,
    Quit,
}

#[must_use]
pub fn parse_input(line: &str) -> Option<Input> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["code" | "codes", email_otp, phone_otp] => Some(Input::Codes {
            email_otp: (*email_otp).to_string(),
            phone_otp: (*phone_otp).to_string(),
        }),
        ["resend"] => Some(Input::Resend),
        ["change", email, phone] => Some(Input::Change {
            email: (*email).to_string(),
            phone: (*phone).to_string(),
        }),
        ["status"] => Some(Input::Status),
        ["quit" | "exit" | "q"] => Some(Input::Quit),
        _ => None,
    }
}

const PROMPT_HELP: &str =
    "commands: code <email-otp> <phone-otp> | resend | change <email> <phone> | status | quit";

async fn interactive<A: AuthApi>(flow: &mut VerificationFlow<'_, A>) -> Result<()> {
    println!("{PROMPT_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(input) = parse_input(&line) else {
            println!("{PROMPT_HELP}");
            continue;
        };

        match input {
            Input::Codes {
                email_otp,
                phone_otp,
            } => {
                flow.set_email_otp(&email_otp);
                flow.set_phone_otp(&phone_otp);
                match submit(flow).await {
                    Ok(()) => return Ok(()),
                    Err(err) => println!("{err}"),
                }
            }
            Input::Resend => {
                if let Err(err) = flow.resend().await {
                    println!("{err}");
                } else {
                    print_banner(flow.banner());
                }
            }
            Input::Change { email, phone } => {
                if let Err(err) = flow.change_contact(&email, &phone).await {
                    println!("{err}");
                } else {
                    print_banner(flow.banner());
                }
            }
            Input::Status => print_status(flow),
            Input::Quit => break,
        }

        if flow.state() == VerifyState::Verified {
            break;
        }
    }

    Ok(())
}

fn print_status<A: AuthApi>(flow: &VerificationFlow<'_, A>) {
    let remaining = flow.cooldown().remaining();
    if flow.resend_disabled() {
        println!("resend available in {remaining}s");
    } else {
        println!("resend available");
    }
}

fn print_banner(banner: Option<&Banner>) {
    match banner {
        Some(Banner::Success(message)) => println!("{message}"),
        Some(Banner::Error(message)) => println!("error: {message}"),
        None => {}
    }
}
