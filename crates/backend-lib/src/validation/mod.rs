// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Registration request validation.

use crate::clock::age_on;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use userbase_common::RegisterRequest;

// Common validation constants
const MIN_FIRST_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
pub const MIN_AGE_YEARS: u32 = 18;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex")
});

/// A single rule violation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid first name: {0}")]
    InvalidFirstName(String),

    #[error("Invalid last name: {0}")]
    InvalidLastName(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid date of birth: {0}")]
    InvalidDob(String),
}

impl ValidationError {
    /// Request field the violation belongs to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidFirstName(_) => "first_name",
            ValidationError::InvalidLastName(_) => "last_name",
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::InvalidPassword(_) => "password",
            ValidationError::InvalidDob(_) => "dob",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationError::InvalidFirstName(m)
            | ValidationError::InvalidLastName(m)
            | ValidationError::InvalidEmail(m)
            | ValidationError::InvalidPassword(m)
            | ValidationError::InvalidDob(m) => m,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// All violations of a request, grouped by field
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("request failed validation on {} field(s)", .fields.len())]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: ValidationError) {
        self.fields
            .entry(error.field())
            .or_default()
            .push(error.message().to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<&'static str, Vec<String>> {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    fn check<T>(&mut self, result: ValidationResult<T>) {
        if let Err(e) = result {
            self.push(e);
        }
    }
}

/// Validate a first name
pub fn validate_first_name(name: &str) -> ValidationResult<&str> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::InvalidFirstName(
            "First name must not be empty".to_string(),
        ));
    }
    if len < MIN_FIRST_NAME_LENGTH {
        return Err(ValidationError::InvalidFirstName(format!(
            "First name must be at least {MIN_FIRST_NAME_LENGTH} characters"
        )));
    }
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidFirstName(format!(
            "First name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Validate a last name (optional, but bounded)
pub fn validate_last_name(name: &str) -> ValidationResult<&str> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidLastName(format!(
            "Last name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address is required".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    if email.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot contain consecutive dots".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    let len = password.chars().count();
    if len == 0 {
        return Err(ValidationError::InvalidPassword(
            "Password is required".to_string(),
        ));
    }

    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if !(has_uppercase && has_lowercase && has_special) {
        return Err(ValidationError::InvalidPassword(
            "Password must contain at least one uppercase letter, one lowercase letter, and one special character".to_string(),
        ));
    }

    Ok(password)
}

/// Validate a date of birth against the minimum age on `today`
pub fn validate_dob(dob: NaiveDate, today: NaiveDate) -> ValidationResult<NaiveDate> {
    if dob > today {
        return Err(ValidationError::InvalidDob(
            "Date of birth cannot be in the future".to_string(),
        ));
    }
    if age_on(dob, today) < MIN_AGE_YEARS {
        return Err(ValidationError::InvalidDob(format!(
            "Must be at least {MIN_AGE_YEARS} years old"
        )));
    }
    Ok(dob)
}

/// Validate a registration request, collecting every violation
pub fn validate_registration(
    request: &RegisterRequest,
    today: NaiveDate,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check(validate_first_name(&request.first_name));
    errors.check(validate_last_name(&request.last_name));
    errors.check(validate_email(&request.email));
    errors.check(validate_password(&request.password));
    errors.check(validate_dob(request.dob, today));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
