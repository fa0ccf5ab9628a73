pub mod sync;

pub use crate::domain::model::{Country, CountryCode, Currency, CurrencyCode, WikiCode};
pub use crate::domain::outcome::{FetchOutcome, IncompleteFetch, MapError, MapWarning, SkippedRecord};
pub use crate::domain::ports::{
    CountryRepository, CurrencyRepository, ExternalCountryProvider, Storage,
};
pub use crate::utils::context::SyncContext;
pub use crate::utils::error::Result;
