//! Login, registration and logout flows.

use super::client::AuthApi;
use super::errors::FlowError;
use super::role::RoleKey;
use super::sessions::PendingVerification;
use super::state::{AuthContext, role_of};
use super::types::{LoginRequest, RegisterRequest, is_unverified};
use super::validation;
use crate::routes::paths;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn { role: RoleKey },
    /// The account exists but its codes have not been confirmed yet.
    VerificationRequired,
}

impl AuthOutcome {
    /// Where the client navigates next.
    #[must_use]
    pub fn next_path(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => paths::DASHBOARD,
            Self::VerificationRequired => paths::VERIFY,
        }
    }
}

pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

/// Signs in with email and password.
///
/// # Errors
/// Returns a validation error before any request, or the server message
/// (falling back to a generic one) when the backend rejects the login.
#[instrument(skip_all)]
pub async fn login<A: AuthApi>(
    api: &A,
    auth: &AuthContext,
    email: &str,
    password: &SecretString,
) -> Result<AuthOutcome, FlowError> {
    let email = email.trim();
    validation::check_email(email)?;
    validation::check_login_password(password.expose_secret())?;

    let request = LoginRequest {
        email: email.to_string(),
        password: password.expose_secret().to_string(),
    };
    let response = api.login(&request).await.map_err(|err| {
        warn!(status = ?err.status(), "login rejected: {err}");
        FlowError::Api(err.user_message(LOGIN_FALLBACK))
    })?;

    if is_unverified(&response.user) {
        info!("login requires verification");
        auth.begin_verification(PendingVerification {
            token: response.token,
            user: response.user,
        });
        return Ok(AuthOutcome::VerificationRequired);
    }

    let role = role_of(&response.user);
    let role = auth.sign_in(role.as_str(), &response.token, response.user);
    Ok(AuthOutcome::SignedIn { role })
}

/// Creates an account and parks it for OTP verification.
///
/// # Errors
/// Returns a validation error before any request, or the server message
/// (falling back to a generic one) when registration fails.
#[instrument(skip_all)]
pub async fn register<A: AuthApi>(
    api: &A,
    auth: &AuthContext,
    form: &RegisterForm,
) -> Result<AuthOutcome, FlowError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let phone = form.phone.trim();
    validation::check_name(name)?;
    validation::check_email(email)?;
    validation::check_phone(phone)?;
    validation::check_new_password(form.password.expose_secret())?;

    let request = RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        password: form.password.expose_secret().to_string(),
    };
    let response = api.register(&request).await.map_err(|err| {
        warn!(status = ?err.status(), "registration rejected: {err}");
        FlowError::Api(err.user_message(REGISTER_FALLBACK))
    })?;

    info!("registration pending verification");
    auth.begin_verification(PendingVerification {
        token: response.token,
        user: response.user,
    });
    Ok(AuthOutcome::VerificationRequired)
}

/// Signs out the active identity. Returns the role that was signed out.
pub fn logout(auth: &AuthContext) -> Option<RoleKey> {
    auth.sign_out()
}
