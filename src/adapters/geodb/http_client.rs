use crate::adapters::geodb::dto::{CountriesPage, CountriesResponse};
use crate::config::GeoDbConfig;
use crate::utils::context::SyncContext;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches one page of countries. The HTTP client is the production source;
/// tests script pages through the same trait.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        ctx: &SyncContext,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CountriesPage>;
}

pub struct HttpClient {
    base_url: Url,
    api_key_header: HeaderName,
    api_key: HeaderValue,
    client: Client,
}

impl HttpClient {
    pub fn new(config: &GeoDbConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidConfigValueError {
                field: "geodb.base_url".to_string(),
                value: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(
            |e| SyncError::InvalidConfigValueError {
                field: "geodb.api_key_header".to_string(),
                value: config.api_key_header.clone(),
                reason: e.to_string(),
            },
        )?;
        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|e| {
            SyncError::InvalidConfigValueError {
                field: "geodb.api_key".to_string(),
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            }
        })?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key_header,
            api_key,
            client,
        })
    }

    /// Appends `endpoint` to the base path and sets the paging query.
    pub fn page_url(&self, endpoint: &str, offset: usize, limit: usize) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| SyncError::ConfigError {
                message: format!("base URL {} cannot take a path", self.base_url),
            })?;
            segments.pop_if_empty();
            for segment in endpoint.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(
        &self,
        ctx: &SyncContext,
        endpoint: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CountriesPage> {
        let url = self.page_url(endpoint, offset, limit)?;
        tracing::debug!(%url, "Sending page request");

        let request = self
            .client
            .get(url)
            .header(self.api_key_header.clone(), self.api_key.clone());

        let response = tokio::select! {
            biased;
            reason = ctx.done() => {
                tracing::debug!(offset, %reason, "Page request abandoned");
                return Err(SyncError::cancelled(reason));
            }
            result = request.send() => result.map_err(classify)?,
        };

        let status = response.status();
        tracing::debug!(offset, status = status.as_u16(), "Page response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = tokio::select! {
            biased;
            reason = ctx.done() => return Err(SyncError::cancelled(reason)),
            result = response.bytes() => result.map_err(classify)?,
        };

        let parsed: CountriesResponse = serde_json::from_slice(&body).map_err(|source| {
            tracing::warn!(
                offset,
                body = %String::from_utf8_lossy(&body),
                "Failed to decode countries page"
            );
            SyncError::Decode {
                context: format!("countries page at offset {}", offset),
                source,
            }
        })?;

        Ok(CountriesPage::from_response(parsed, offset))
    }
}

fn classify(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> GeoDbConfig {
        GeoDbConfig {
            base_url: base_url.to_string(),
            api_key: "secret".to_string(),
            ..GeoDbConfig::default()
        }
    }

    #[test]
    fn page_url_joins_paths_and_query() {
        let client = HttpClient::new(&config("https://api.example.com/geo/")).unwrap();
        let url = client.page_url("/v1/geo/countries", 20, 10).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/geo/v1/geo/countries?limit=10&offset=20"
        );
    }

    #[test]
    fn page_url_without_base_path() {
        let client = HttpClient::new(&config("https://api.example.com")).unwrap();
        let url = client.page_url("v1/geo/countries", 0, 5).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/geo/countries?limit=5&offset=0"
        );
    }

    #[test]
    fn rejects_unusable_header_name() {
        let mut cfg = config("https://api.example.com");
        cfg.api_key_header = "bad header".to_string();
        assert!(matches!(
            HttpClient::new(&cfg),
            Err(SyncError::InvalidConfigValueError { .. })
        ));
    }
}
