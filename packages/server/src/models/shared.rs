use crate::error::AppError;

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate a required entity reference (ids are 1-based).
pub fn validate_id(id: i32, name: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::Validation(format!(
            "{name} is required and must be positive"
        )));
    }
    Ok(())
}

/// Validate a required numeric setting (>= 0, finite).
pub fn validate_setting(value: f64, name: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{name} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Validate an optional numeric setting when provided.
pub fn validate_optional_setting(value: Option<f64>, name: &str) -> Result<(), AppError> {
    match value {
        Some(v) => validate_setting(v, name),
        None => Ok(()),
    }
}
