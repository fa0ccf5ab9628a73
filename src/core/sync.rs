use crate::core::{Country, CountryRepository, CurrencyRepository, ExternalCountryProvider, Storage};
use crate::domain::outcome::{IncompleteFetch, SkippedRecord};
use crate::utils::context::SyncContext;
use crate::utils::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub pages: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub saved: usize,
    pub failed_saves: usize,
    pub placeholders: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub remote_total: usize,
    pub local_total: usize,
}

impl SyncStatus {
    pub fn missing(&self) -> usize {
        self.remote_total.saturating_sub(self.local_total)
    }
}

/// A run that stopped early. Countries fetched before the failure were still saved.
#[derive(Error, Debug)]
#[error("country sync stopped after saving {} countries: {source}", .report.saved)]
pub struct SyncFailure {
    pub report: SyncReport,
    #[source]
    pub source: SyncError,
}

/// What `--output-path` writes to disk.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSnapshot {
    pub synced_at: DateTime<Utc>,
    pub complete: bool,
    pub report: SyncReport,
    pub countries: Vec<Country>,
}

impl SyncSnapshot {
    pub fn new(report: SyncReport, complete: bool, countries: Vec<Country>) -> Self {
        Self {
            synced_at: Utc::now(),
            complete,
            report,
            countries,
        }
    }

    /// Pretty JSON under `name`; encoding failures surface as `SerializationError`.
    pub async fn write_to<S: Storage>(&self, storage: &S, name: &str) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        storage.write_file(name, &json).await
    }
}

/// Fetches the remote catalog and upserts it into the local stores.
pub struct CountrySync {
    provider: Arc<dyn ExternalCountryProvider>,
    currency_repo: Arc<dyn CurrencyRepository>,
    country_repo: Arc<dyn CountryRepository>,
}

impl CountrySync {
    pub fn new(
        provider: Arc<dyn ExternalCountryProvider>,
        currency_repo: Arc<dyn CurrencyRepository>,
        country_repo: Arc<dyn CountryRepository>,
    ) -> Self {
        Self {
            provider,
            currency_repo,
            country_repo,
        }
    }

    pub async fn run(&self, ctx: &SyncContext) -> std::result::Result<SyncReport, SyncFailure> {
        tracing::info!("Starting country sync");

        let outcome = self.provider.fetch_all_countries(ctx).await;
        log_skipped(&outcome.skipped);

        let mut report = SyncReport {
            pages: outcome.pages,
            fetched: outcome.countries.len(),
            skipped: outcome.skipped.len(),
            placeholders: outcome.placeholder_count(),
            warnings: outcome.warnings.len(),
            ..SyncReport::default()
        };

        let (countries, stopped_by) = match outcome.into_result() {
            Ok(countries) => (countries, None),
            Err(IncompleteFetch { countries, source }) => {
                tracing::warn!(fetched = countries.len(), %source, "Saving partial fetch");
                (countries, Some(source))
            }
        };

        for country in &countries {
            match self.save_country(country).await {
                Ok(()) => report.saved += 1,
                Err(err) => {
                    tracing::error!(code = %country.code(), %err, "Failed to save country");
                    report.failed_saves += 1;
                }
            }
        }

        tracing::info!(
            fetched = report.fetched,
            saved = report.saved,
            skipped = report.skipped,
            placeholders = report.placeholders,
            "Country sync finished"
        );

        match stopped_by {
            None => Ok(report),
            Some(source) => Err(SyncFailure { report, source }),
        }
    }

    /// Compares the remote total with what the local store already holds.
    pub async fn status(&self, ctx: &SyncContext) -> Result<SyncStatus> {
        let remote_total = self.provider.total_country_count(ctx).await?;
        let local_total = self.country_repo.count_all().await?;
        Ok(SyncStatus {
            remote_total,
            local_total,
        })
    }

    // Placeholder currencies are stored first so the country never references an unknown code.
    async fn save_country(&self, country: &Country) -> Result<()> {
        for currency in country.currencies() {
            if currency.is_placeholder()
                && self.currency_repo.get_by_id(currency.code()).await?.is_none()
            {
                self.currency_repo.save(currency).await?;
            }
        }
        self.country_repo.save(country).await?;
        Ok(())
    }
}

fn log_skipped(skipped: &[SkippedRecord]) {
    for record in skipped {
        tracing::warn!(code = %record.code, name = %record.name, reason = %record.reason, "Record not synced");
    }
}
