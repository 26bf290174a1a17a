pub mod cli;
pub mod prompt;
pub mod toml_config;

use crate::adapters::yelp::SEARCH_API_URL;
use crate::core::{ConfigProvider, ParameterSource};
use crate::domain::model::WriteMode;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LOCATION: &str = "NYC";
pub const DEFAULT_LIMIT: u32 = 50;
/// Largest `limit` the search endpoint accepts.
pub const API_MAX_LIMIT: u32 = 50;
pub const DEFAULT_OUTPUT_PATH: &str = "test_data.csv";
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 5.0;

/// Everything one run needs, however it was gathered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Free-text location, e.g. `NYC` or `Austin, TX`.
    pub location: String,
    /// Category aliases searched in addition to vegan and vegetarian.
    pub extra_categories: Vec<String>,
    pub limit: u32,
    pub output_path: String,
    pub write_mode: WriteMode,
    pub api_endpoint: String,
    pub timeout_seconds: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            extra_categories: Vec::new(),
            limit: DEFAULT_LIMIT,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            write_mode: WriteMode::Overwrite,
            api_endpoint: SEARCH_API_URL.to_string(),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl ConfigProvider for RunConfig {
    fn location(&self) -> &str {
        &self.location
    }

    fn extra_categories(&self) -> &[String] {
        &self.extra_categories
    }

    fn limit(&self) -> u32 {
        self.limit
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    /// Values that are not a positive, representable duration mean no timeout.
    fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
            .filter(|timeout| !timeout.is_zero())
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("location", &self.location)?;
        validate_positive_number("limit", self.limit, 1)?;
        validate_path("output_path", &self.output_path)?;
        validate_url("api_endpoint", &self.api_endpoint)?;

        if let Some(seconds) = self.timeout_seconds {
            let representable = Duration::try_from_secs_f64(seconds)
                .is_ok_and(|timeout| !timeout.is_zero());
            if !representable {
                return Err(EtlError::InvalidConfigValueError {
                    field: "timeout_seconds".to_string(),
                    value: seconds.to_string(),
                    reason: "Timeout must be a positive number of seconds".to_string(),
                });
            }
        }

        if self.limit > API_MAX_LIMIT {
            tracing::warn!(
                "limit {} is above the API maximum of {}; the request will likely be rejected",
                self.limit,
                API_MAX_LIMIT
            );
        }

        Ok(())
    }
}

/// Splits user input such as `,kebab, sushi,bbq` into category aliases.
pub fn parse_categories(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads the API key from `API_KEY`, then `YELP_API_KEY`.
pub fn api_key_from_env() -> Result<String> {
    let key = ["API_KEY", "YELP_API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty());
    validate_required_field("API_KEY", &key).cloned()
}

#[cfg(feature = "cli")]
pub use self::cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Clone, Default, Parser)]
    #[command(name = "restaurant-etl")]
    #[command(about = "Export vegan and vegetarian friendly restaurants from Yelp to CSV")]
    pub struct CliConfig {
        /// Location to search, e.g. NYC, TX, "Austin, TX"
        #[arg(long)]
        pub location: Option<String>,

        /// Extra category aliases, comma separated (e.g. kebab,sushi,bbq)
        #[arg(long, value_delimiter = ',')]
        pub categories: Vec<String>,

        /// Number of restaurants to request (API maximum: 50)
        #[arg(long)]
        pub limit: Option<u32>,

        /// CSV file to write
        #[arg(short, long)]
        pub output: Option<String>,

        /// Write mode: w (overwrite with header) or a (append without header)
        #[arg(long)]
        pub mode: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        pub timeout: Option<f64>,

        /// Search endpoint override
        #[arg(long)]
        pub endpoint: Option<String>,

        /// TOML file with run parameters; disables prompting
        #[arg(short, long)]
        pub config: Option<String>,

        /// Use flags and defaults only, never prompt
        #[arg(long)]
        pub no_prompt: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        pub fn should_prompt(&self) -> bool {
            !self.no_prompt && self.config.is_none()
        }

        /// Flags given on the command line win over any other source.
        pub fn apply_overrides(&self, config: &mut RunConfig) {
            if let Some(location) = &self.location {
                config.location = location.clone();
            }
            let categories: Vec<String> = self
                .categories
                .iter()
                .flat_map(|c| parse_categories(c))
                .collect();
            if !categories.is_empty() {
                config.extra_categories = categories;
            }
            if let Some(limit) = self.limit {
                config.limit = limit;
            }
            if let Some(output) = &self.output {
                config.output_path = output.clone();
            }
            if let Some(mode) = &self.mode {
                config.write_mode = WriteMode::from_flag(mode);
            }
            if let Some(timeout) = self.timeout {
                config.timeout_seconds = Some(timeout);
            }
            if let Some(endpoint) = &self.endpoint {
                config.api_endpoint = endpoint.clone();
            }
        }
    }

    impl ParameterSource for CliConfig {
        fn collect(&mut self) -> Result<RunConfig> {
            let mut config = RunConfig::default();
            self.apply_overrides(&mut config);
            Ok(config)
        }
    }
}
