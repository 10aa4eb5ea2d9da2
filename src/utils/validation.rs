use crate::utils::error::{Result, SwitchError};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid_value(field: &str, value: impl Into<String>, reason: impl Into<String>) -> SwitchError {
    SwitchError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// API 位址只接受 http/https
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid_value(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid_value(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid_value(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    let reason = if path.is_empty() {
        "Path cannot be empty"
    } else if path.contains('\0') {
        "Path contains null bytes"
    } else {
        return Ok(());
    };
    Err(invalid_value(field_name, path, reason))
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid_value(
            field_name,
            value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// API key 不在錯誤訊息中回顯
pub fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SwitchError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if value.chars().any(char::is_control) {
        return Err(invalid_value(
            field_name,
            "<redacted>",
            "Value contains control characters",
        ));
    }
    Ok(())
}

pub fn validate_non_zero_duration(field_name: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(invalid_value(
            field_name,
            format!("{:?}", value),
            "Duration must be greater than zero",
        ));
    }
    Ok(())
}
