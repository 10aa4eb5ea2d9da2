use crate::domain::ports::{ApiSettings, BatchOptions, ConfigProvider, UnauthorizedPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "profile-switch")]
#[command(about = "Bulk switch lead customer profiles from a CSV file")]
pub struct CliConfig {
    /// CSV with First Name, Last Name, Mobile Phone and Customer Profile columns
    #[arg(short, long)]
    pub input: String,

    #[arg(long, env = "APTEN_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    #[arg(long, default_value = "https://api.attent.app/v1")]
    pub base_url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "3")]
    pub max_attempts: u32,

    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Pause between rows to stay under upstream rate limits
    #[arg(long, default_value = "100")]
    pub row_delay_ms: u64,

    /// Stop calling the API after the first 401
    #[arg(long)]
    pub fail_fast_unauthorized: bool,

    /// Validate the input without calling the API
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            row_delay: Duration::from_millis(self.row_delay_ms),
            unauthorized_policy: if self.fail_fast_unauthorized {
                UnauthorizedPolicy::FailFast
            } else {
                UnauthorizedPolicy::Continue
            },
            ..BatchOptions::default()
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;
        if !self.dry_run {
            validation::validate_url("base_url", &self.base_url)?;
            validation::validate_secret("api_key", &self.api_key)?;
        }
        validation::validate_positive_number("max_attempts", self.max_attempts as usize, 1)?;
        validation::validate_non_zero_duration(
            "timeout_secs",
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(())
    }
}
