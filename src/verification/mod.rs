//! OTP account verification. The flow lives for one view: codes, banners and
//! the resend cooldown are never persisted, only the pending registration is.

pub mod cooldown;

pub use cooldown::ResendCooldown;

use crate::auth::client::AuthApi;
use crate::auth::errors::FlowError;
use crate::auth::role::RoleKey;
use crate::auth::sessions::PendingVerification;
use crate::auth::state::AuthContext;
use crate::auth::types::{ChangeContactRequest, VerifyOtpRequest};
use crate::auth::validation;
use crate::routes::paths;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Cooldown after the page opens.
pub const INITIAL_COOLDOWN_SECS: u32 = 30;
/// Cooldown after a resend or a contact change.
pub const RESEND_COOLDOWN_SECS: u32 = 60;
/// Delay between a successful verification and the dashboard redirect.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1_500);

pub const VERIFY_FALLBACK: &str = "Verification failed. Please try again.";
pub const RESEND_FALLBACK: &str = "Failed to resend OTP. Please try again.";
pub const CHANGE_CONTACT_FALLBACK: &str = "Failed to update contact details. Please try again.";

pub const VERIFIED_MESSAGE: &str = "Account verified successfully! Redirecting...";
pub const RESENT_MESSAGE: &str = "A new OTP has been sent to your email and phone.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyState {
    EnteringCodes,
    Submitting,
    Verified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// "Change email or phone" dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactModal {
    pub open: bool,
    pub email: String,
    pub phone: String,
    pub error: Option<String>,
}

pub struct VerificationFlow<'a, A> {
    api: &'a A,
    auth: AuthContext,
    state: VerifyState,
    banner: Option<Banner>,
    modal: ContactModal,
    email_otp: String,
    phone_otp: String,
    cooldown: ResendCooldown,
}

impl<'a, A: AuthApi> VerificationFlow<'a, A> {
    /// Opens the flow for the stored pending registration and starts the
    /// initial cooldown. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns `FlowError::NoPendingVerification` when nothing awaits
    /// verification.
    pub fn start(api: &'a A, auth: AuthContext) -> Result<Self, FlowError> {
        let pending = auth
            .sessions()
            .pending()
            .ok_or(FlowError::NoPendingVerification)?;
        auth.begin_verification(pending);

        let mut cooldown = ResendCooldown::new();
        cooldown.start(INITIAL_COOLDOWN_SECS);

        Ok(Self {
            api,
            auth,
            state: VerifyState::EnteringCodes,
            banner: None,
            modal: ContactModal::default(),
            email_otp: String::new(),
            phone_otp: String::new(),
            cooldown,
        })
    }

    #[must_use]
    pub fn state(&self) -> VerifyState {
        self.state
    }

    #[must_use]
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    #[must_use]
    pub fn modal(&self) -> &ContactModal {
        &self.modal
    }

    #[must_use]
    pub fn email_otp(&self) -> &str {
        &self.email_otp
    }

    #[must_use]
    pub fn phone_otp(&self) -> &str {
        &self.phone_otp
    }

    pub fn set_email_otp(&mut self, code: &str) {
        self.email_otp = code.trim().to_string();
    }

    pub fn set_phone_otp(&mut self, code: &str) {
        self.phone_otp = code.trim().to_string();
    }

    #[must_use]
    pub fn cooldown(&self) -> &ResendCooldown {
        &self.cooldown
    }

    /// Whether the resend action is disabled: exactly while the cooldown runs.
    #[must_use]
    pub fn resend_disabled(&self) -> bool {
        self.cooldown.remaining() > 0
    }

    /// Submits both codes. On success the pending registration becomes a
    /// durable session; follow with [`VerificationFlow::redirect_after_verify`].
    ///
    /// # Errors
    /// Returns a validation error without any request when a code is not four
    /// digits, or the server message when verification fails.
    #[instrument(skip_all)]
    pub async fn submit(&mut self) -> Result<RoleKey, FlowError> {
        validation::check_otp_pair(&self.email_otp, &self.phone_otp)?;
        let pending = self.pending()?;

        self.state = VerifyState::Submitting;
        self.banner = None;
        let request = VerifyOtpRequest {
            email_otp: self.email_otp.clone(),
            phone_otp: self.phone_otp.clone(),
        };

        if let Err(err) = self.api.verify_otp(&pending.token, &request).await {
            warn!(status = ?err.status(), "verification rejected: {err}");
            return Err(self.fail(err.user_message(VERIFY_FALLBACK)));
        }

        let role = match self.auth.complete_verification() {
            Ok(role) => role,
            Err(err) => return Err(self.fail(err.to_string())),
        };
        self.state = VerifyState::Verified;
        self.banner = Some(Banner::Success(VERIFIED_MESSAGE.to_string()));
        info!(role = %role, "account verified");
        Ok(role)
    }

    /// Waits the fixed delay after a successful verification and returns the
    /// route to land on. `None` when the flow is not verified.
    pub async fn redirect_after_verify(&self) -> Option<&'static str> {
        if self.state != VerifyState::Verified {
            return None;
        }
        tokio::time::sleep(REDIRECT_DELAY).await;
        Some(paths::DASHBOARD)
    }

    /// Requests new codes.
    ///
    /// # Errors
    /// Returns `FlowError::CooldownActive` without calling the API while the
    /// cooldown runs, or the server message when the resend fails.
    #[instrument(skip_all)]
    pub async fn resend(&mut self) -> Result<(), FlowError> {
        let remaining = self.cooldown.remaining();
        if remaining > 0 {
            return Err(FlowError::CooldownActive(remaining));
        }
        self.send_code().await
    }

    /// Opens the contact dialog prefilled from the pending profile.
    pub fn open_contact_modal(&mut self) {
        let user = self.auth.snapshot().user.unwrap_or(Value::Null);
        let field = |name: &str| {
            user.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        self.modal = ContactModal {
            open: true,
            email: field("email"),
            phone: field("phone"),
            error: None,
        };
    }

    pub fn close_contact_modal(&mut self) {
        self.modal = ContactModal::default();
    }

    /// Replaces the account's email and phone, then sends fresh codes to them.
    /// Failures keep the dialog open with the error shown inside it.
    ///
    /// # Errors
    /// Returns a validation error without any request, the server message when
    /// the change fails, or the resend error if the follow-up send fails.
    #[instrument(skip_all)]
    pub async fn change_contact(&mut self, email: &str, phone: &str) -> Result<(), FlowError> {
        let email = email.trim();
        let phone = phone.trim();
        self.modal.open = true;
        self.modal.email = email.to_string();
        self.modal.phone = phone.to_string();

        if let Err(err) = validation::check_email(email).and_then(|()| validation::check_phone(phone))
        {
            self.modal.error = Some(err.to_string());
            return Err(err);
        }

        let pending = match self.pending() {
            Ok(pending) => pending,
            Err(err) => {
                self.modal.error = Some(err.to_string());
                return Err(err);
            }
        };

        let request = ChangeContactRequest {
            email: email.to_string(),
            phone: phone.to_string(),
        };
        let user = match self.api.change_contact(&pending.token, &request).await {
            Ok(user) => user,
            Err(err) => {
                warn!(status = ?err.status(), "contact change rejected: {err}");
                let message = err.user_message(CHANGE_CONTACT_FALLBACK);
                self.modal.error = Some(message.clone());
                return Err(FlowError::Api(message));
            }
        };

        self.auth.begin_verification(PendingVerification {
            token: pending.token,
            user,
        });
        self.email_otp.clear();
        self.phone_otp.clear();
        self.close_contact_modal();
        self.cooldown.start(RESEND_COOLDOWN_SECS);
        debug!("contact updated, sending new codes");

        self.send_code().await
    }

    async fn send_code(&mut self) -> Result<(), FlowError> {
        let pending = self.pending()?;
        match self.api.resend_otp(&pending.token).await {
            Ok(()) => {
                self.cooldown.start(RESEND_COOLDOWN_SECS);
                self.banner = Some(Banner::Success(RESENT_MESSAGE.to_string()));
                info!("verification codes resent");
                Ok(())
            }
            Err(err) => {
                warn!(status = ?err.status(), "resend rejected: {err}");
                let message = err.user_message(RESEND_FALLBACK);
                self.banner = Some(Banner::Error(message.clone()));
                Err(FlowError::Api(message))
            }
        }
    }

    fn pending(&self) -> Result<PendingVerification, FlowError> {
        self.auth
            .sessions()
            .pending()
            .ok_or(FlowError::NoPendingVerification)
    }

    fn fail(&mut self, message: String) -> FlowError {
        self.state = VerifyState::EnteringCodes;
        self.banner = Some(Banner::Error(message.clone()));
        FlowError::Api(message)
    }
}
