use crate::adapters::geodb::dto::CountryDto;
use crate::domain::model::{Country, CountryCode, Currency, CurrencyCode, WikiCode};
use crate::domain::outcome::{MapError, MapWarning};
use crate::domain::ports::CurrencyRepository;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedCountry {
    pub country: Country,
    pub warnings: Vec<MapWarning>,
}

/// Turns API records into domain countries, resolving currencies against the local store.
#[derive(Clone)]
pub struct CountryMapper {
    currency_repo: Arc<dyn CurrencyRepository>,
}

impl CountryMapper {
    pub fn new(currency_repo: Arc<dyn CurrencyRepository>) -> Self {
        Self { currency_repo }
    }

    /// Fails only on record-level defects. Bad wiki ids and unusable currencies
    /// are dropped and reported as warnings.
    pub async fn map(&self, dto: &CountryDto) -> Result<MappedCountry, MapError> {
        if dto.code.is_empty() {
            return Err(MapError::EmptyCode);
        }
        if dto.name.is_empty() {
            return Err(MapError::EmptyName {
                code: dto.code.clone(),
            });
        }

        let code = CountryCode::new(&dto.code).map_err(|source| MapError::InvalidCode {
            code: dto.code.clone(),
            source,
        })?;

        let mut warnings = Vec::new();

        let wiki_id = if dto.wiki_data_id.is_empty() {
            WikiCode::empty()
        } else {
            WikiCode::new(&dto.wiki_data_id).unwrap_or_else(|err| {
                tracing::warn!(country = %code, value = %dto.wiki_data_id, %err, "Invalid wikidata id, using empty");
                warnings.push(MapWarning::InvalidWikiId {
                    country: code.to_string(),
                    value: dto.wiki_data_id.clone(),
                });
                WikiCode::empty()
            })
        };

        let currencies = self
            .resolve_currencies(&code, &dto.currency_codes, &mut warnings)
            .await;

        let country = Country::new(code.clone(), dto.name.clone(), currencies, wiki_id).map_err(
            |source| MapError::Construction {
                code: code.to_string(),
                source,
            },
        )?;

        Ok(MappedCountry { country, warnings })
    }

    async fn resolve_currencies(
        &self,
        country: &CountryCode,
        raw_codes: &[String],
        warnings: &mut Vec<MapWarning>,
    ) -> Vec<Currency> {
        let mut currencies = Vec::with_capacity(raw_codes.len());

        for raw in raw_codes {
            if raw.is_empty() {
                tracing::warn!(%country, "Empty currency code, skipping");
                warnings.push(MapWarning::EmptyCurrencyCode {
                    country: country.to_string(),
                });
                continue;
            }

            let code = match CurrencyCode::new(raw) {
                Ok(code) => code,
                Err(err) => {
                    tracing::warn!(%country, value = %raw, %err, "Invalid currency code, skipping");
                    warnings.push(MapWarning::InvalidCurrencyCode {
                        country: country.to_string(),
                        value: raw.clone(),
                    });
                    continue;
                }
            };

            match self.currency_repo.get_by_id(&code).await {
                Ok(Some(currency)) => currencies.push(currency),
                Ok(None) => {
                    tracing::warn!(%country, currency = %code, "Currency not in local store, using placeholder");
                    warnings.push(MapWarning::PlaceholderCurrency {
                        country: country.to_string(),
                        code: code.clone(),
                    });
                    currencies.push(Currency::placeholder(code));
                }
                Err(err) => {
                    tracing::error!(%country, currency = %code, %err, "Currency lookup failed, skipping");
                    warnings.push(MapWarning::CurrencyLookupFailed {
                        country: country.to_string(),
                        code,
                        reason: err.to_string(),
                    });
                }
            }
        }

        currencies
    }
}
