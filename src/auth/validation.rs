//! Local form checks run before any request is sent. Failures are reported
//! against the offending field and never reach the server.

use super::errors::{Field, FlowError};
use regex::Regex;

pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_PHONE: &str = "Please enter a valid 10-digit phone number";
pub const INVALID_EMAIL_OTP: &str = "Email OTP must be 4 digits";
pub const INVALID_PHONE_OTP: &str = "Phone OTP must be 4 digits";
pub const MISSING_PASSWORD: &str = "Password is required";
pub const SHORT_PASSWORD: &str = "Password must be at least 8 characters";
pub const MISSING_NAME: &str = "Name is required";

const MIN_PASSWORD_CHARS: usize = 8;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_phone(phone: &str) -> bool {
    Regex::new(r"^[0-9]{10}$").is_ok_and(|re| re.is_match(phone))
}

#[must_use]
pub fn valid_otp(code: &str) -> bool {
    Regex::new(r"^[0-9]{4}$").is_ok_and(|re| re.is_match(code))
}

/// # Errors
/// Returns a validation error for the email field.
pub fn check_email(email: &str) -> Result<(), FlowError> {
    if valid_email(email.trim()) {
        Ok(())
    } else {
        Err(FlowError::validation(Field::Email, INVALID_EMAIL))
    }
}

/// # Errors
/// Returns a validation error for the phone field.
pub fn check_phone(phone: &str) -> Result<(), FlowError> {
    if valid_phone(phone.trim()) {
        Ok(())
    } else {
        Err(FlowError::validation(Field::Phone, INVALID_PHONE))
    }
}

/// Both codes must be exactly four digits; the email code is checked first.
///
/// # Errors
/// Returns a validation error for the first invalid code.
pub fn check_otp_pair(email_otp: &str, phone_otp: &str) -> Result<(), FlowError> {
    if !valid_otp(email_otp.trim()) {
        return Err(FlowError::validation(Field::EmailOtp, INVALID_EMAIL_OTP));
    }
    if !valid_otp(phone_otp.trim()) {
        return Err(FlowError::validation(Field::PhoneOtp, INVALID_PHONE_OTP));
    }
    Ok(())
}

/// # Errors
/// Returns a validation error when the password is empty.
pub fn check_login_password(password: &str) -> Result<(), FlowError> {
    if password.is_empty() {
        Err(FlowError::validation(Field::Password, MISSING_PASSWORD))
    } else {
        Ok(())
    }
}

/// # Errors
/// Returns a validation error when the password is empty or too short.
pub fn check_new_password(password: &str) -> Result<(), FlowError> {
    check_login_password(password)?;
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(FlowError::validation(Field::Password, SHORT_PASSWORD));
    }
    Ok(())
}

/// # Errors
/// Returns a validation error when the name is blank.
pub fn check_name(name: &str) -> Result<(), FlowError> {
    if name.trim().is_empty() {
        Err(FlowError::validation(Field::Name, MISSING_NAME))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("first.last+tag@clinic.co.in"));
        assert!(!valid_email("bad-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
        assert_eq!(
            check_email("bad-email"),
            Err(FlowError::validation(Field::Email, INVALID_EMAIL))
        );
    }

    #[test]
    fn phone_is_ten_ascii_digits() {
        assert!(valid_phone("9876543210"));
        assert!(!valid_phone("987654321"));
        assert!(!valid_phone("98765432100"));
        assert!(!valid_phone("98765-4321"));
        assert!(!valid_phone("٩٨٧٦٥٤٣٢١٠"));
        assert!(check_phone(" 9876543210 ").is_ok());
    }

    #[test]
    fn otp_pair_reports_first_bad_field() {
        assert!(check_otp_pair("1234", "0000").is_ok());

        let err = check_otp_pair("12", "5678").unwrap_err();
        assert_eq!(err.field(), Some(Field::EmailOtp));
        assert_eq!(err.to_string(), "Email OTP must be 4 digits");

        let err = check_otp_pair("1234", "56a8").unwrap_err();
        assert_eq!(err.field(), Some(Field::PhoneOtp));
        assert_eq!(err.to_string(), "Phone OTP must be 4 digits");
    }

    #[test]
    fn password_rules() {
        assert_eq!(check_login_password("").unwrap_err().to_string(), MISSING_PASSWORD);
        assert!(check_login_password("x").is_ok());
        assert_eq!(check_new_password("short").unwrap_err().to_string(), SHORT_PASSWORD);
        assert!(check_new_password("password1").is_ok());
    }

    #[test]
    fn name_must_not_be_blank() {
        assert_eq!(check_name("   ").unwrap_err().field(), Some(Field::Name));
        assert!(check_name("Asha").is_ok());
    }
}
