//! # Careport (patient and provider session client)
//!
//! `careport` is the session core of the Careport healthcare client. Patients,
//! doctors, laboratories and delivery partners sign in against the same REST
//! backend; this crate keeps their credentials, decides which views they may
//! reach, and drives the OTP account verification step.
//!
//! ## Sessions
//!
//! Credentials are stored durably per role (`USER`, `DOCTOR`, `LABORATORY`,
//! `DELIVERY_BOY`, `ADMIN`). Role keys are always upper case, and a stored
//! session's `role` always equals the key it is stored under. Exactly one
//! session is projected as the active user at a time; see [`auth::state`].
//!
//! ## Routing
//!
//! Navigation is resolved by [`routes::navigate`], which applies the protected
//! and public-only gates from [`auth::guards`] and returns an explicit
//! render-or-redirect decision. Guards are UX-only; the backend still enforces
//! access on every call.
//!
//! ## Verification
//!
//! New accounts confirm both email and phone with 4-digit codes. The flow in
//! [`verification`] owns the resend cooldown timer and the
//! "change contact, then resend" sub-flow.

pub mod api;
pub mod auth;
pub mod cli;
pub mod routes;
pub mod verification;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
