//! Login, registration and session management commands.

use crate::auth::login::{self, RegisterForm};
use crate::auth::rehydrate::{RehydrateOutcome, rehydrate};
use crate::auth::{AuthContext, Dashboard, RoleKey};
use crate::cli::globals::GlobalArgs;
use crate::routes::{Navigation, Route, navigate};
use anyhow::Result;
use chrono::DateTime;
use secrecy::SecretString;
use serde_json::Value;

#[derive(Debug)]
pub enum Command {
    Login {
        email: String,
        password: SecretString,
    },
    Register {
        name: String,
        email: String,
        phone: String,
        password: SecretString,
    },
    WhoAmI,
    List,
    SwitchRole {
        role: String,
    },
    Logout {
        role: Option<String>,
    },
    Open {
        path: String,
    },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// # Errors
/// Returns an error if the flow fails or the backend cannot be configured.
pub async fn execute(args: Args) -> Result<()> {
    let Args { globals, command } = args;
    let auth = globals.auth_context();

    match command {
        Command::Login { email, password } => {
            let client = globals.client()?;
            let outcome = login::login(&client, &auth, &email, &password).await?;
            match &outcome {
                login::AuthOutcome::SignedIn { role } => {
                    println!("Signed in as {role} ({})", describe_user(auth.snapshot().user.as_ref()));
                }
                login::AuthOutcome::VerificationRequired => {
                    println!("Account not verified yet. Run `careport verify` with the codes you received.");
                }
            }
            println!("-> {}", outcome.next_path());
        }
        Command::Register {
            name,
            email,
            phone,
            password,
        } => {
            let client = globals.client()?;
            let form = RegisterForm {
                name,
                email,
                phone,
                password,
            };
            let outcome = login::register(&client, &auth, &form).await?;
            println!("Account created. Codes were sent to your email and phone.");
            println!("-> {}", outcome.next_path());
        }
        Command::WhoAmI => {
            let client = globals.client()?;
            match rehydrate(&client, &auth, globals.api.timeout).await {
                RehydrateOutcome::NoToken => println!("Not signed in"),
                RehydrateOutcome::Restored { role } => {
                    println!(
                        "{role} ({}), dashboard: {}",
                        describe_user(auth.snapshot().user.as_ref()),
                        role.dashboard()
                    );
                }
                RehydrateOutcome::Rejected { status } => {
                    println!("Stored session was rejected ({status}) and has been removed");
                }
                RehydrateOutcome::Unavailable => {
                    println!("Backend unavailable; stored session kept, showing signed out");
                }
            }
        }
        Command::List => list_sessions(&auth),
        Command::SwitchRole { role } => {
            let role = auth.switch_role(&role)?;
            println!(
                "Active role: {role} ({})",
                describe_user(auth.snapshot().user.as_ref())
            );
        }
        Command::Logout { role: Some(role) } => {
            let role = RoleKey::normalize(&role);
            auth.clear_user_for_role(role.as_str());
            println!("Cleared stored session for {role}");
        }
        Command::Logout { role: None } => match login::logout(&auth) {
            Some(role) => println!("Signed out of {role}"),
            None => println!("Signed out"),
        },
        Command::Open { path } => {
            let client = globals.client()?;
            rehydrate(&client, &auth, globals.api.timeout).await;
            println!("{}", describe_navigation(&auth, &path));
        }
    }

    Ok(())
}

fn list_sessions(auth: &AuthContext) {
    let sessions = auth.sessions();
    let stored = sessions.sessions();
    let last_active = sessions.last_active_role();

    if stored.is_empty() {
        println!("No stored sessions");
    }
    for session in stored.values() {
        let marker = if last_active.as_ref() == Some(&session.role) {
            "*"
        } else {
            " "
        };
        let updated = DateTime::from_timestamp_millis(session.updated_at)
            .map_or_else(|| "unknown".to_string(), |at| at.to_rfc3339());
        let state = if session.is_live() { "live" } else { "empty token" };
        println!(
            "{marker} {:<13} {state:<11} updated {updated}  {}",
            session.role.as_str(),
            describe_user(Some(&session.user))
        );
    }

    if let Some(role) = sessions.default_redirect_role() {
        println!("Default role: {role}");
    }
    if sessions.pending().is_some() {
        println!("A registration is waiting for verification");
    }
}

/// One-line rendering of a navigation decision, with the dashboard the
/// role-aware layout would pick.
#[must_use]
pub fn describe_navigation(auth: &AuthContext, path: &str) -> String {
    match navigate(path, &auth.guard_snapshot()) {
        Navigation::Render(Route::Dashboard) => {
            let dashboard = auth
                .snapshot()
                .role
                .map_or(Dashboard::Patient, |role| role.dashboard());
            format!("render {} ({dashboard} dashboard)", Route::Dashboard)
        }
        Navigation::Render(route) => format!("render {route}"),
        Navigation::Redirect { to, from: Some(from) } => format!("redirect {to} (from {from})"),
        Navigation::Redirect { to, from: None } => format!("redirect {to}"),
    }
}

fn describe_user(user: Option<&Value>) -> String {
    let field = |name: &str| user.and_then(|u| u.get(name)).and_then(Value::as_str);
    match (field("name"), field("email")) {
        (Some(name), Some(email)) => format!("{name} <{email}>"),
        (Some(name), None) => name.to_string(),
        (None, Some(email)) => email.to_string(),
        (None, None) => "unknown user".to_string(),
    }
}
