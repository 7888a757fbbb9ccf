use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use validator::{Validate, ValidationError};

use crate::errors::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const MAX_EMPLOYEE_ID_LEN: usize = 64;

pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Ids end up in URLs and file names.
pub fn validate_employee_id(id: &str) -> Result<(), ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(invalid("empty", "Employee ID cannot be empty."));
    }
    if id.len() > MAX_EMPLOYEE_ID_LEN {
        return Err(invalid("employee_id", "Employee ID must be at most 64 characters"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid(
            "employee_id",
            "Employee ID may only contain letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}

/// `length(min = 1)` alone lets whitespace through, and stored values are trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "Field cannot be blank"));
    }
    Ok(())
}

pub fn parse_date_of_birth(dob: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(dob.trim(), DATE_FORMAT)
        .map_err(|_| invalid("dob", "Date of birth must be formatted as YYYY-MM-DD"))?;
    if date > Utc::now().date_naive() {
        return Err(invalid("dob", "Date of birth cannot be in the future"));
    }
    Ok(date)
}

pub fn validate_date_of_birth(dob: &str) -> Result<(), ValidationError> {
    parse_date_of_birth(dob).map(|_| ())
}

/// Canonical upper-case form of a known blood group.
pub fn normalize_blood_group(raw: &str) -> Option<&'static str> {
    let upper = raw.trim().to_uppercase();
    BLOOD_GROUPS.iter().copied().find(|group| *group == upper)
}

pub fn validate_blood_group(raw: &str) -> Result<(), ValidationError> {
    normalize_blood_group(raw)
        .map(|_| ())
        .ok_or_else(|| invalid("blood_group", "Blood group must be one of A+, A-, B+, B-, AB+, AB-, O+, O-"))
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !allowed || phone.chars().filter(|c| c.is_ascii_digit()).count() < 3 {
        return Err(invalid("phone", "Phone numbers may only contain digits, spaces, '+', '-', '(' and ')'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_ids() {
        assert!(validate_employee_id("E1").is_ok());
        assert!(validate_employee_id("ops-team_42.b").is_ok());
        assert!(validate_employee_id("   ").is_err());
        assert!(validate_employee_id("a/b").is_err());
        assert!(validate_employee_id("a b").is_err());
        assert!(validate_employee_id(&"a".repeat(MAX_EMPLOYEE_ID_LEN)).is_ok());
        assert!(validate_employee_id(&"a".repeat(MAX_EMPLOYEE_ID_LEN + 1)).is_err());
        assert!(validate_employee_id(&format!(" {} ", "a".repeat(MAX_EMPLOYEE_ID_LEN))).is_ok());
    }

    #[test]
    fn blank_values() {
        assert!(validate_not_blank("Alice").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t ").is_err());
    }

    #[test]
    fn dates_of_birth() {
        assert_eq!(
            parse_date_of_birth("1990-01-01").unwrap(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
        );
        assert!(parse_date_of_birth("01/01/1990").is_err());
        assert!(parse_date_of_birth("1990-02-30").is_err());
        assert!(parse_date_of_birth("2999-01-01").is_err());
    }

    #[test]
    fn blood_groups_normalize() {
        assert_eq!(normalize_blood_group("o+"), Some("O+"));
        assert_eq!(normalize_blood_group(" ab- "), Some("AB-"));
        assert_eq!(normalize_blood_group("C+"), None);
    }

    #[test]
    fn phones() {
        assert!(validate_phone("555-1111").is_ok());
        assert!(validate_phone("+1 (555) 222 3333").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("--").is_err());
    }
}
