use crate::domain::model::{Country, CountryCode, Currency, CurrencyCode};
use crate::domain::ports::{CountryRepository, CurrencyRepository};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Currency store keyed by code. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurrencyRepo {
    currencies: Arc<RwLock<HashMap<CurrencyCode, Currency>>>,
}

impl InMemoryCurrencyRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currencies(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let map = currencies
            .into_iter()
            .map(|c| (c.code().clone(), c))
            .collect();
        Self {
            currencies: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl CurrencyRepository for InMemoryCurrencyRepo {
    async fn save(&self, currency: &Currency) -> Result<Currency> {
        let mut currencies = self.currencies.write().await;
        currencies.insert(currency.code().clone(), currency.clone());
        tracing::debug!(code = %currency.code(), "Currency saved");
        Ok(currency.clone())
    }

    async fn get_by_id(&self, code: &CurrencyCode) -> Result<Option<Currency>> {
        Ok(self.currencies.read().await.get(code).cloned())
    }

    async fn count_all(&self) -> Result<usize> {
        Ok(self.currencies.read().await.len())
    }
}

/// Country store ordered by code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCountryRepo {
    countries: Arc<RwLock<BTreeMap<CountryCode, Country>>>,
}

impl InMemoryCountryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Country> {
        self.countries.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl CountryRepository for InMemoryCountryRepo {
    async fn save(&self, country: &Country) -> Result<Country> {
        let mut countries = self.countries.write().await;
        countries.insert(country.code().clone(), country.clone());
        tracing::debug!(code = %country.code(), currencies = country.currencies().len(), "Country saved");
        Ok(country.clone())
    }

    async fn get_by_id(&self, code: &CountryCode) -> Result<Option<Country>> {
        Ok(self.countries.read().await.get(code).cloned())
    }

    async fn count_all(&self) -> Result<usize> {
        Ok(self.countries.read().await.len())
    }
}
