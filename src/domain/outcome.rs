use crate::domain::model::{Country, CurrencyCode};
use crate::utils::error::{DomainError, SyncError};
use thiserror::Error;

/// Why a single API record was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("record has an empty country code")]
    EmptyCode,

    #[error("record '{code}' has an empty country name")]
    EmptyName { code: String },

    #[error("invalid country code '{code}': {source}")]
    InvalidCode {
        code: String,
        #[source]
        source: DomainError,
    },

    #[error("could not build country '{code}': {source}")]
    Construction {
        code: String,
        #[source]
        source: DomainError,
    },
}

/// Field-level problems that were tolerated while mapping a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapWarning {
    InvalidWikiId { country: String, value: String },
    EmptyCurrencyCode { country: String },
    InvalidCurrencyCode { country: String, value: String },
    CurrencyLookupFailed {
        country: String,
        code: CurrencyCode,
        reason: String,
    },
    PlaceholderCurrency { country: String, code: CurrencyCode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub code: String,
    pub name: String,
    pub reason: MapError,
}

/// Everything one `fetch_all_countries` run produced, including why it stopped.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub countries: Vec<Country>,
    pub skipped: Vec<SkippedRecord>,
    pub warnings: Vec<MapWarning>,
    pub pages: usize,
    pub error: Option<SyncError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn was_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(SyncError::is_cancellation)
    }

    pub fn placeholder_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, MapWarning::PlaceholderCurrency { .. }))
            .count()
    }

    pub fn into_result(self) -> Result<Vec<Country>, IncompleteFetch> {
        match self.error {
            None => Ok(self.countries),
            Some(source) => Err(IncompleteFetch {
                countries: self.countries,
                source,
            }),
        }
    }
}

/// A fetch that stopped early; keeps whatever was mapped before the failure.
#[derive(Error, Debug)]
#[error("country fetch stopped after {} countries: {source}", .countries.len())]
pub struct IncompleteFetch {
    pub countries: Vec<Country>,
    #[source]
    pub source: SyncError,
}
