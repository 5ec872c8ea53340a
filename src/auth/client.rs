//! Client wrappers for the auth endpoints. Flows are written against the
//! [`AuthApi`] trait so tests can swap the HTTP backend for a fake; the
//! [`ApiClient`] implementation centralizes paths and bearer handling and never
//! logs credentials.

use super::types::{
    AuthResponse, ChangeContactRequest, ChangeContactResponse, LoginRequest, RegisterRequest,
    VerifyOtpRequest,
};
use crate::api::{ApiClient, ApiError};
use serde_json::Value;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const VERIFY_OTP_PATH: &str = "/verify-otp";
pub const RESEND_OTP_PATH: &str = "/resend-otp";
pub const CHANGE_CONTACT_PATH: &str = "/change-email-phone";
pub const CURRENT_USER_PATH: &str = "/user";

#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Exchanges credentials for a token and profile.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Creates an account; the returned token is only usable for verification
    /// until both codes are accepted.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    async fn verify_otp(&self, token: &str, request: &VerifyOtpRequest) -> Result<(), ApiError>;

    async fn resend_otp(&self, token: &str) -> Result<(), ApiError>;

    /// Updates email and phone of a pending account and returns the new profile.
    async fn change_contact(
        &self,
        token: &str,
        request: &ChangeContactRequest,
    ) -> Result<Value, ApiError>;

    /// Fetches the profile for a bearer token.
    async fn current_user(&self, token: &str) -> Result<Value, ApiError>;
}

impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(LOGIN_PATH, request, None).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(REGISTER_PATH, request, None).await
    }

    async fn verify_otp(&self, token: &str, request: &VerifyOtpRequest) -> Result<(), ApiError> {
        self.post_json_empty(VERIFY_OTP_PATH, request, Some(token))
            .await
    }

    async fn resend_otp(&self, token: &str) -> Result<(), ApiError> {
        self.get_empty(RESEND_OTP_PATH, Some(token)).await
    }

    async fn change_contact(
        &self,
        token: &str,
        request: &ChangeContactRequest,
    ) -> Result<Value, ApiError> {
        let response: ChangeContactResponse = self
            .post_json(CHANGE_CONTACT_PATH, request, Some(token))
            .await?;
        Ok(response.into_user())
    }

    async fn current_user(&self, token: &str) -> Result<Value, ApiError> {
        self.get_json(CURRENT_USER_PATH, Some(token)).await
    }
}
