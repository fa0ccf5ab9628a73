use std::fmt;
use thiserror::Error;

/// Why a cancellable operation stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "operation cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Validation failures of the domain value objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("country code cannot be empty")]
    EmptyCountryCode,

    #[error("invalid country code '{0}': expected 2 ASCII letters")]
    InvalidCountryCode(String),

    #[error("country name cannot be empty")]
    EmptyCountryName,

    #[error("invalid currency code '{0}': expected 3 ASCII letters")]
    InvalidCurrencyCode(String),

    #[error("invalid wikidata id '{0}': expected 'Q' followed by digits")]
    InvalidWikiId(String),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{reason}")]
    Cancelled { reason: CancelReason },

    #[error("request timed out")]
    Timeout,

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("page fetch failed at offset {offset} ({endpoint}): {source}")]
    Page {
        endpoint: String,
        offset: usize,
        #[source]
        source: Box<SyncError>,
    },

    #[error("total count could not be determined from the first page")]
    TotalCountUnknown,

    #[error("page worker stopped before delivering a result")]
    WorkerDropped,

    #[error("Repository error: {message}")]
    Repository { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Cancellation,
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn cancelled(reason: CancelReason) -> Self {
        SyncError::Cancelled { reason }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        SyncError::Repository {
            message: message.into(),
        }
    }

    /// Wraps a failure with the page it happened on.
    pub fn at_page(self, endpoint: &str, offset: usize) -> Self {
        SyncError::Page {
            endpoint: endpoint.to_string(),
            offset,
            source: Box::new(self),
        }
    }

    /// True for caller-initiated stops: cancellation, deadline or request timeout.
    pub fn is_cancellation(&self) -> bool {
        match self {
            SyncError::Cancelled { .. } | SyncError::Timeout => true,
            SyncError::Page { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }

    /// Strips page context and returns the underlying failure.
    pub fn root(&self) -> &SyncError {
        match self {
            SyncError::Page { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            SyncError::Cancelled { .. } | SyncError::Timeout => ErrorCategory::Cancellation,
            SyncError::Http(_) | SyncError::Status { .. } | SyncError::WorkerDropped => {
                ErrorCategory::Network
            }
            SyncError::Decode { .. }
            | SyncError::TotalCountUnknown
            | SyncError::SerializationError(_) => ErrorCategory::Data,
            SyncError::Repository { .. } | SyncError::IoError(_) => ErrorCategory::Storage,
            SyncError::Url(_)
            | SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SyncError::Page { .. } => unreachable!("root() never returns a page wrapper"),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Cancellation => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            SyncError::Cancelled {
                reason: CancelReason::DeadlineExceeded,
            }
            | SyncError::Timeout => "Increase --timeout-secs or the request timeout and retry",
            SyncError::Cancelled { .. } => "Re-run the sync to fetch the remaining pages",
            SyncError::Status { status: 401, .. } | SyncError::Status { status: 403, .. } => {
                "Check GEO_API_KEY and the API key header name"
            }
            SyncError::Status { status: 429, .. } => "Raise the rate-limit sleep between pages",
            SyncError::Http(_) | SyncError::Status { .. } | SyncError::WorkerDropped => {
                "Check network connectivity and the API base URL, then retry"
            }
            SyncError::Decode { .. } | SyncError::TotalCountUnknown => {
                "The API returned an unexpected payload; verify the endpoint path"
            }
            SyncError::Repository { .. } | SyncError::IoError(_) => {
                "Check the local store and output path are writable"
            }
            SyncError::MissingConfigError { .. } => "Set GEO_API_KEY or geodb.api_key in the config file",
            _ => "Fix the configuration file or GEO_API_* environment variables",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Cancellation => format!("Sync stopped early: {}", self),
            ErrorCategory::Network => format!("Could not reach the country API: {}", self),
            ErrorCategory::Data => format!("The country API returned unusable data: {}", self),
            ErrorCategory::Storage => format!("Could not store the results: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
