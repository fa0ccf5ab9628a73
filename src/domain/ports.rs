use crate::domain::model::{Country, CountryCode, Currency, CurrencyCode};
use crate::domain::outcome::FetchOutcome;
use crate::utils::context::SyncContext;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait CurrencyRepository: Send + Sync {
    /// Upserts by code and returns the stored value.
    async fn save(&self, currency: &Currency) -> Result<Currency>;
    /// `Ok(None)` is the not-found case; `Err` means the lookup itself failed.
    async fn get_by_id(&self, code: &CurrencyCode) -> Result<Option<Currency>>;
    async fn count_all(&self) -> Result<usize>;
}

#[async_trait]
pub trait CountryRepository: Send + Sync {
    async fn save(&self, country: &Country) -> Result<Country>;
    async fn get_by_id(&self, code: &CountryCode) -> Result<Option<Country>>;
    async fn count_all(&self) -> Result<usize>;
}

#[async_trait]
pub trait ExternalCountryProvider: Send + Sync {
    async fn fetch_all_countries(&self, ctx: &SyncContext) -> FetchOutcome;
    async fn total_country_count(&self, ctx: &SyncContext) -> Result<usize>;
}
