use crate::utils::error::{Result, SyncError};
use std::fmt::Display;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> SyncError {
    SyncError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Only http(s) base URLs are accepted.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

/// Endpoint paths are joined onto the base URL, so they must be absolute paths.
pub fn validate_endpoint_path(field_name: &str, path: &str) -> Result<()> {
    validate_non_empty_string(field_name, path)?;

    if !path.starts_with('/') {
        return Err(invalid(field_name, path, "Endpoint path must start with '/'"));
    }
    if path.contains(['?', '#']) {
        return Err(invalid(
            field_name,
            path,
            "Endpoint path cannot carry a query string or fragment",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    validate_non_empty_string(field_name, path)?;
    if path.contains('\0') {
        return Err(invalid(field_name, path.escape_default(), "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// Secrets are reported as missing rather than echoed back in the error.
pub fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("geodb.base_url", "https://wft-geo-db.p.rapidapi.com").is_ok());
        assert!(validate_url("geodb.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("geodb.base_url", "").is_err());
        assert!(validate_url("geodb.base_url", "invalid-url").is_err());
        assert!(validate_url("geodb.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_path() {
        assert!(validate_endpoint_path("geodb.country_endpoint", "/v1/geo/countries").is_ok());
        assert!(validate_endpoint_path("geodb.country_endpoint", "v1/geo/countries").is_err());
        assert!(validate_endpoint_path("geodb.country_endpoint", "/v1?limit=5").is_err());
        assert!(validate_endpoint_path("geodb.country_endpoint", "  ").is_err());
    }

    #[test]
    fn test_validate_positive_number_and_range() {
        assert!(validate_positive_number("geodb.request_timeout_secs", 15, 1).is_ok());
        assert!(validate_positive_number("geodb.request_timeout_secs", 0, 1).is_err());
        assert!(validate_range("geodb.page_limit", 10, 1, 100).is_ok());
        assert!(validate_range("geodb.page_limit", 100, 1, 100).is_ok());
        assert!(validate_range("geodb.page_limit", 0, 1, 100).is_err());
        assert!(validate_range("geodb.page_limit", 101, 1, 100).is_err());
    }

    #[test]
    fn test_validate_secret_hides_the_value() {
        assert!(validate_secret("geodb.api_key", "abc123").is_ok());
        let err = validate_secret("geodb.api_key", " ").unwrap_err();
        assert!(matches!(err, SyncError::MissingConfigError { ref field } if field == "geodb.api_key"));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./out").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "out\0dir").is_err());
    }
}
