use crate::error::AppError;
use regex::Regex;

/// A required text field: present and not blank. Returns it trimmed.
pub(crate) fn required_text(value: Option<&str>, field: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::validation(format!("{} is required", field))),
    }
}

/// An optional field that, when given, must not be blank.
pub(crate) fn optional_text(value: Option<&str>, field: &str) -> Result<Option<String>, AppError> {
    value.map(|text| required_text(Some(text), field)).transpose()
}

pub(crate) fn email(value: &str) -> Result<(), AppError> {
    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_err(AppError::internal)?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(AppError::validation(format!("{:?} is not a valid email", value)))
    }
}
