//! Registration input validation.
//!
//! Checks run in a fixed order: required fields first, then name, student id
//! and date of birth. The first failing rule is reported.

use crate::validation::parse_iso_date;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum age in whole years accepted at registration.
pub const MIN_AGE_YEARS: i32 = 18;
const MIN_NAME_TOKENS: usize = 2;
const MIN_NAME_TOKEN_CHARS: usize = 2;

static STUDENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("valid student id regex"));

/// Raw participant input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCandidate {
    pub name: String,
    pub student_id: String,
    pub dob: String,
}

impl RegistrationCandidate {
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        dob: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            dob: dob.into(),
        }
    }
}

/// Normalized registration input that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRegistration {
    /// Trimmed with internal whitespace collapsed to single spaces.
    pub name: String,
    pub student_id: String,
    pub dob: NaiveDate,
}

impl ValidatedRegistration {
    /// Date of birth in the stored `YYYY-MM-DD` form.
    pub fn dob_iso(&self) -> String {
        self.dob.format("%Y-%m-%d").to_string()
    }
}

/// Required registration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Name,
    StudentId,
    DateOfBirth,
}

impl RegistrationField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::StudentId => "student_id",
            Self::DateOfBirth => "dob",
        }
    }
}

/// Reason a registration candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(RegistrationField),
    /// Fewer than two name tokens, or a token shorter than two characters.
    InvalidName,
    /// Not exactly eight decimal digits.
    InvalidStudentId,
    /// Not a `YYYY-MM-DD` calendar date.
    InvalidDateOfBirth,
    Underage { age: i32 },
}

impl ValidationError {
    /// Stable reason code for callers that map errors to messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidName => "invalid_name",
            Self::InvalidStudentId => "invalid_student_id",
            Self::InvalidDateOfBirth => "invalid_date_of_birth",
            Self::Underage { .. } => "underage",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {}", field.as_str()),
            Self::InvalidName => write!(
                f,
                "name must have at least {MIN_NAME_TOKENS} words of at least {MIN_NAME_TOKEN_CHARS} characters"
            ),
            Self::InvalidStudentId => write!(f, "student id must be exactly 8 digits"),
            Self::InvalidDateOfBirth => write!(f, "date of birth must be a YYYY-MM-DD date"),
            Self::Underage { age } => {
                write!(f, "participant must be at least {MIN_AGE_YEARS} years old, got {age}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates one candidate against a single snapshot of `today`.
pub fn validate_registration(
    candidate: &RegistrationCandidate,
    today: NaiveDate,
) -> Result<ValidatedRegistration, ValidationError> {
    let name = required(&candidate.name, RegistrationField::Name)?;
    let student_id = required(&candidate.student_id, RegistrationField::StudentId)?;
    let dob = required(&candidate.dob, RegistrationField::DateOfBirth)?;

    let name = normalize_name(name)?;
    let student_id = validate_student_id(student_id)?;
    let dob = parse_iso_date(dob).ok_or(ValidationError::InvalidDateOfBirth)?;

    let age = age_in_years(dob, today);
    if age < MIN_AGE_YEARS {
        return Err(ValidationError::Underage { age });
    }

    Ok(ValidatedRegistration {
        name,
        student_id,
        dob,
    })
}

/// Trims, splits on whitespace and rejoins with single spaces.
pub fn normalize_name(raw: &str) -> Result<String, ValidationError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < MIN_NAME_TOKENS
        || tokens
            .iter()
            .any(|token| token.chars().count() < MIN_NAME_TOKEN_CHARS)
    {
        return Err(ValidationError::InvalidName);
    }
    Ok(tokens.join(" "))
}

pub fn validate_student_id(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !STUDENT_ID_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidStudentId);
    }
    Ok(trimmed.to_string())
}

/// Whole years between `dob` and `today`.
///
/// One year is subtracted while `today`'s month/day precedes the birthday's,
/// so a Feb 29 birthday completes its year on Mar 1 of non-leap years.
/// Negative for birth dates in the future.
pub fn age_in_years(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

fn required(value: &str, field: RegistrationField) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}
