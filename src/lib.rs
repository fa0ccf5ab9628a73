pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;
pub use config::{AppConfig, GeoDbConfig};

pub use adapters::geodb::{GeoDbProvider, HttpClient, PageSource, Paginator};
pub use adapters::memory::{InMemoryCountryRepo, InMemoryCurrencyRepo};
pub use adapters::storage::LocalStorage;
pub use core::sync::{CountrySync, SyncFailure, SyncReport, SyncSnapshot, SyncStatus};
pub use utils::context::SyncContext;
pub use utils::error::{Result, SyncError};
