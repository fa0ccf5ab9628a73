//! GeoDB Cities countries client.
//!
//! The provider walks the paginated `/countries` endpoint one page at a time:
//! [`Paginator`] keeps the offset cursor, [`PageProcessor`] runs each request on
//! its own task, and [`CountryMapper`] turns records into domain countries.

pub mod dto;
pub mod http_client;
pub mod mapper;
pub mod paginator;
pub mod processor;
pub mod provider;

pub use dto::{CountriesPage, CountriesResponse, CountryDto};
pub use http_client::{HttpClient, PageSource};
pub use mapper::{CountryMapper, MappedCountry};
pub use paginator::Paginator;
pub use processor::PageProcessor;
pub use provider::GeoDbProvider;
