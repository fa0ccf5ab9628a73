pub mod context;
pub mod error;
pub mod logger;
pub mod validation;
