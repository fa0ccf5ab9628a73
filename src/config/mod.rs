#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_endpoint_path, validate_non_empty_string, validate_positive_number, validate_range,
    validate_secret, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://wft-geo-db.p.rapidapi.com";
pub const DEFAULT_COUNTRY_ENDPOINT: &str = "/v1/geo/countries";
pub const DEFAULT_API_KEY_HEADER: &str = "x-rapidapi-key";
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const DEFAULT_RATE_LIMIT_SLEEP: Duration = Duration::from_millis(1500);
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Largest page the API accepts.
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub geodb: GeoDbConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoDbConfig {
    pub base_url: String,
    pub country_endpoint: String,
    pub api_key_header: String,
    pub api_key: String,
    pub page_limit: usize,
    #[serde(with = "duration_str")]
    pub rate_limit_sleep: Duration,
    pub request_timeout_secs: u64,
}

impl Default for GeoDbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country_endpoint: DEFAULT_COUNTRY_ENDPOINT.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            api_key: String::new(),
            page_limit: DEFAULT_PAGE_LIMIT,
            rate_limit_sleep: DEFAULT_RATE_LIMIT_SLEEP,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_vars(content, |name| std::env::var(name).ok())?;

        toml::from_str(&processed).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Defaults overlaid with `GEO_API_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let geodb = &mut self.geodb;

        if let Some(value) = lookup("GEO_API_BASEURL") {
            geodb.base_url = value;
        }
        if let Some(value) = lookup("GEO_API_COUNTRY_ENDPOINT") {
            geodb.country_endpoint = value;
        }
        if let Some(value) = lookup("GEO_API_KEY_HEADER_NAME") {
            geodb.api_key_header = value;
        }
        if let Some(value) = lookup("GEO_API_KEY") {
            geodb.api_key = value;
        }
        if let Some(value) = lookup("GEO_API_PAGE_LIMIT") {
            geodb.page_limit =
                value
                    .trim()
                    .parse()
                    .map_err(|_| SyncError::InvalidConfigValueError {
                        field: "GEO_API_PAGE_LIMIT".to_string(),
                        value: value.clone(),
                        reason: "Expected a positive integer".to_string(),
                    })?;
        }
        if let Some(value) = lookup("GEO_API_RATE_LIMIT_SLEEP") {
            geodb.rate_limit_sleep = parse_duration(&value).map_err(|reason| {
                SyncError::InvalidConfigValueError {
                    field: "GEO_API_RATE_LIMIT_SLEEP".to_string(),
                    value: value.clone(),
                    reason,
                }
            })?;
        }
        if let Some(value) = lookup("GEO_API_REQUEST_TIMEOUT_SECS") {
            geodb.request_timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| SyncError::InvalidConfigValueError {
                        field: "GEO_API_REQUEST_TIMEOUT_SECS".to_string(),
                        value: value.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }

        Ok(())
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for GeoDbConfig {
    fn validate(&self) -> Result<()> {
        validate_url("geodb.base_url", &self.base_url)?;
        validate_endpoint_path("geodb.country_endpoint", &self.country_endpoint)?;
        validate_non_empty_string("geodb.api_key_header", &self.api_key_header)?;
        validate_secret("geodb.api_key", &self.api_key)?;
        validate_range("geodb.page_limit", self.page_limit, 1, MAX_PAGE_LIMIT)?;
        validate_positive_number("geodb.request_timeout_secs", self.request_timeout_secs, 1)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.geodb.validate()?;
        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// Replaces `${NAME}` with `lookup(NAME)`; unknown names are left untouched.
fn substitute_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

/// Accepts `1500ms`, `2s`, `1m` or a bare millisecond count.
pub fn parse_duration(raw: &str) -> std::result::Result<Duration, String> {
    let value = raw.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{}' does not start with a number", raw))?;

    match unit.trim() {
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("'{}' is too large", raw)),
        other => Err(format!("unknown duration unit '{}'", other)),
    }
}

mod duration_str {
    use super::parse_duration;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}ms", value.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
            Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_public_api() {
        let config = AppConfig::default();
        assert_eq!(config.geodb.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.geodb.country_endpoint, "/v1/geo/countries");
        assert_eq!(config.geodb.api_key_header, "x-rapidapi-key");
        assert_eq!(config.geodb.page_limit, 10);
        assert_eq!(config.geodb.rate_limit_sleep, Duration::from_millis(1500));
        assert!(matches!(
            config.validate(),
            Err(SyncError::MissingConfigError { ref field }) if field == "geodb.api_key"
        ));
    }

    #[test]
    fn parses_toml_with_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
[geodb]
base_url = "http://localhost:9000"
api_key = "abc"
page_limit = 5
rate_limit_sleep = "2s"

[logging]
json = true
"#,
        )
        .unwrap();

        assert_eq!(config.geodb.base_url, "http://localhost:9000");
        assert_eq!(config.geodb.page_limit, 5);
        assert_eq!(config.geodb.rate_limit_sleep, Duration::from_secs(2));
        assert_eq!(config.geodb.country_endpoint, DEFAULT_COUNTRY_ENDPOINT);
        assert!(config.json_logging());
        assert!(!config.verbose_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rate_limit_accepts_bare_milliseconds() {
        let config = AppConfig::from_toml_str("[geodb]\nrate_limit_sleep = 250\n").unwrap();
        assert_eq!(config.geodb.rate_limit_sleep, Duration::from_millis(250));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AppConfig::from_toml_str("[geodb\napi_key = ").unwrap_err();
        assert!(matches!(err, SyncError::ConfigError { .. }));
    }

    #[test]
    fn substitutes_known_variables_only() {
        let out = substitute_vars(
            "api_key = \"${KEY}\"\nother = \"${UNSET_THING}\"",
            lookup_from(&[("KEY", "s3cret")]),
        )
        .unwrap();
        assert!(out.contains("api_key = \"s3cret\""));
        assert!(out.contains("${UNSET_THING}"));
    }

    #[test]
    fn env_overrides_layer_over_file_values() {
        let mut config = AppConfig::from_toml_str("[geodb]\napi_key = \"from-file\"\n").unwrap();
        config
            .apply_overrides(lookup_from(&[
                ("GEO_API_KEY", "from-env"),
                ("GEO_API_PAGE_LIMIT", "25"),
                ("GEO_API_RATE_LIMIT_SLEEP", "1500ms"),
            ]))
            .unwrap();

        assert_eq!(config.geodb.api_key, "from-env");
        assert_eq!(config.geodb.page_limit, 25);
        assert_eq!(config.geodb.rate_limit_sleep, Duration::from_millis(1500));
    }

    #[test]
    fn oversized_rate_limit_is_a_config_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("GEO_API_RATE_LIMIT_SLEEP", "999999999999999999m")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::InvalidConfigValueError { ref field, ref reason, .. }
                if field == "GEO_API_RATE_LIMIT_SLEEP" && reason.contains("too large")
        ));
    }

    #[test]
    fn bad_env_values_are_reported_by_name() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("GEO_API_PAGE_LIMIT", "ten")]))
            .unwrap_err();
        assert!(
            matches!(err, SyncError::InvalidConfigValueError { ref field, .. } if field == "GEO_API_PAGE_LIMIT")
        );
    }

    #[test]
    fn page_limit_is_bounded() {
        let mut config = GeoDbConfig {
            api_key: "k".to_string(),
            ..GeoDbConfig::default()
        };
        config.page_limit = 0;
        assert!(config.validate().is_err());
        config.page_limit = MAX_PAGE_LIMIT + 1;
        assert!(config.validate().is_err());
        config.page_limit = MAX_PAGE_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("1500ms"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration(" 40 "), Ok(Duration::from_millis(40)));
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("10h").is_err());
        assert!(parse_duration("999999999999999999m").is_err());
        assert_eq!(
            parse_duration(&format!("{}m", u64::MAX / 60)),
            Ok(Duration::from_secs(u64::MAX / 60 * 60))
        );
    }
}
