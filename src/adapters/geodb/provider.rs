use crate::adapters::geodb::http_client::{HttpClient, PageSource};
use crate::adapters::geodb::mapper::CountryMapper;
use crate::adapters::geodb::paginator::Paginator;
use crate::adapters::geodb::processor::PageProcessor;
use crate::config::GeoDbConfig;
use crate::domain::outcome::{FetchOutcome, SkippedRecord};
use crate::domain::ports::{CurrencyRepository, ExternalCountryProvider};
use crate::utils::context::SyncContext;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct GeoDbProvider {
    processor: PageProcessor,
    mapper: CountryMapper,
    endpoint: String,
    page_limit: usize,
    rate_limit_sleep: Duration,
}

impl GeoDbProvider {
    pub fn new(config: &GeoDbConfig, currency_repo: Arc<dyn CurrencyRepository>) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Ok(Self::with_source(
            Arc::new(client),
            currency_repo,
            config.country_endpoint.clone(),
            config.page_limit,
            config.rate_limit_sleep,
        ))
    }

    pub fn with_source(
        source: Arc<dyn PageSource>,
        currency_repo: Arc<dyn CurrencyRepository>,
        endpoint: impl Into<String>,
        page_limit: usize,
        rate_limit_sleep: Duration,
    ) -> Self {
        Self {
            processor: PageProcessor::new(source),
            mapper: CountryMapper::new(currency_repo),
            endpoint: endpoint.into(),
            page_limit,
            rate_limit_sleep,
        }
    }

    fn paginator(&self) -> Paginator {
        Paginator::new(self.processor.clone(), self.endpoint.clone(), self.page_limit)
    }
}

#[async_trait]
impl ExternalCountryProvider for GeoDbProvider {
    async fn fetch_all_countries(&self, ctx: &SyncContext) -> FetchOutcome {
        tracing::info!(endpoint = %self.endpoint, limit = self.page_limit, "Fetching all countries");

        let mut outcome = FetchOutcome::default();
        let mut paginator = self.paginator();

        while paginator.has_next() {
            if let Some(reason) = ctx.err() {
                tracing::warn!(fetched = outcome.countries.len(), %reason, "Fetch aborted before next page");
                outcome.error = Some(SyncError::cancelled(reason));
                return outcome;
            }

            let records = match paginator.next_page(ctx).await {
                Ok(records) => records,
                Err(err) => {
                    tracing::error!(fetched = outcome.countries.len(), %err, "Page fetch failed, stopping");
                    outcome.error = Some(err);
                    return outcome;
                }
            };

            if records.is_empty() && !paginator.has_next() {
                break;
            }
            outcome.pages += 1;

            for dto in &records {
                if let Some(reason) = ctx.err() {
                    tracing::warn!(fetched = outcome.countries.len(), %reason, "Fetch aborted while mapping");
                    outcome.error = Some(SyncError::cancelled(reason));
                    return outcome;
                }

                match self.mapper.map(dto).await {
                    Ok(mapped) => {
                        outcome.warnings.extend(mapped.warnings);
                        outcome.countries.push(mapped.country);
                    }
                    Err(reason) => {
                        tracing::warn!(code = %dto.code, %reason, "Skipping country record");
                        outcome.skipped.push(SkippedRecord {
                            code: dto.code.clone(),
                            name: dto.name.clone(),
                            reason,
                        });
                    }
                }
            }

            if paginator.has_next() {
                tracing::info!(
                    fetched = outcome.countries.len(),
                    offset = paginator.offset(),
                    total = ?paginator.total_count(),
                    "Page done, sleeping for rate limit"
                );

                tokio::select! {
                    biased;
                    reason = ctx.done() => {
                        tracing::warn!(fetched = outcome.countries.len(), %reason, "Fetch aborted during rate limit sleep");
                        outcome.error = Some(SyncError::cancelled(reason));
                        return outcome;
                    }
                    _ = tokio::time::sleep(self.rate_limit_sleep) => {}
                }
            }
        }

        tracing::info!(
            fetched = outcome.countries.len(),
            skipped = outcome.skipped.len(),
            pages = outcome.pages,
            "Fetched and mapped all countries"
        );
        outcome
    }

    async fn total_country_count(&self, ctx: &SyncContext) -> Result<usize> {
        let mut paginator = self.paginator();
        paginator.next_page(ctx).await?;
        paginator.total_count().ok_or(SyncError::TotalCountUnknown)
    }
}
