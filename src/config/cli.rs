use crate::config::AppConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, validate_range, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "geodb-sync")]
#[command(about = "Sync the GeoDB country catalog into a local store")]
pub struct CliArgs {
    /// TOML configuration file; GEO_API_* variables override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Only report the remote total count (fetches a single page)
    #[arg(long)]
    pub count_only: bool,

    /// Abort the whole run after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory to write countries.json into
    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Override the configured page size
    #[arg(long)]
    pub page_limit: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliArgs {
    /// File (or defaults), then environment, then command-line overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = AppConfig::from_file(path)?;
                config.apply_env_overrides()?;
                config
            }
            None => AppConfig::from_env()?,
        };

        if let Some(limit) = self.page_limit {
            config.geodb.page_limit = limit;
        }

        Ok(config)
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.output_path {
            validate_path("output_path", path)?;
        }
        if let Some(timeout) = self.timeout_secs {
            validate_positive_number("timeout_secs", timeout, 1)?;
        }
        if let Some(limit) = self.page_limit {
            validate_range("page_limit", limit, 1, crate::config::MAX_PAGE_LIMIT)?;
        }
        Ok(())
    }
}
