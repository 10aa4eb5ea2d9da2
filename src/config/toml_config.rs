use crate::domain::ports::{ApiSettings, BatchOptions, ConfigProvider, UnauthorizedPolicy};
use crate::utils::error::{Result, SwitchError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: ApiConfig,
    pub retry: Option<RetryConfig>,
    pub batch: Option<BatchConfig>,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub row_delay_ms: Option<u64>,
    pub row_number_offset: Option<usize>,
    pub fail_fast_on_unauthorized: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SwitchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SwitchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${APTEN_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SwitchError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(ApiSettings::DEFAULT_BASE_URL)
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn api_settings(&self) -> ApiSettings {
        let mut settings = ApiSettings::new(self.base_url(), self.api.api_key.clone());
        if let Some(timeout) = self.api.timeout_seconds {
            settings.request_timeout = Duration::from_secs(timeout);
        }
        if let Some(retry) = &self.retry {
            if let Some(max_attempts) = retry.max_attempts {
                settings.max_attempts = max_attempts;
            }
            if let Some(delay_ms) = retry.delay_ms {
                settings.retry_delay = Duration::from_millis(delay_ms);
            }
        }
        settings
    }

    fn batch_options(&self) -> BatchOptions {
        let mut options = BatchOptions::default();
        if let Some(batch) = &self.batch {
            if let Some(delay_ms) = batch.row_delay_ms {
                options.row_delay = Duration::from_millis(delay_ms);
            }
            if let Some(offset) = batch.row_number_offset {
                options.row_number_offset = offset;
            }
            if batch.fail_fast_on_unauthorized.unwrap_or(false) {
                options.unauthorized_policy = UnauthorizedPolicy::FailFast;
            }
        }
        options
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", self.base_url())?;

        // 環境變數未設定時佔位符會原樣留下
        if self.api.api_key.starts_with("${") {
            return Err(SwitchError::MissingConfigError {
                field: format!("api.api_key (environment variable {})", self.api.api_key),
            });
        }
        validation::validate_secret("api.api_key", &self.api.api_key)?;

        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_path("output.path", &self.output.path)?;

        let settings = self.api_settings();
        validation::validate_positive_number(
            "retry.max_attempts",
            settings.max_attempts as usize,
            1,
        )?;
        validation::validate_non_zero_duration("api.timeout_seconds", settings.request_timeout)?;
        Ok(())
    }
}
