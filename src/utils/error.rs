use thiserror::Error;

/// 回應內容截斷上限 (HTTP 錯誤訊息)
pub const ERROR_BODY_LIMIT: usize = 200;
/// 缺少 lead id 時附帶的回應片段上限
pub const RESPONSE_SNIPPET_LIMIT: usize = 100;

/// 批次層級錯誤：環境、配置、資料集本身無法讀取等。
/// 單筆資料的錯誤不會走到這裡，而是轉成 FAILED 的 Outcome。
#[derive(Error, Debug)]
pub enum SwitchError {
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Missing profile column. Need either 'Customer Profile' or 'Customer Profile - MOVE'")]
    MissingProfileColumn,

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Dataset,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SwitchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SwitchError::HttpClientError(_) => ErrorCategory::Network,
            SwitchError::CsvError(_)
            | SwitchError::MissingColumns { .. }
            | SwitchError::MissingProfileColumn => ErrorCategory::Dataset,
            SwitchError::IoError(_) => ErrorCategory::Storage,
            SwitchError::SerializationError(_) | SwitchError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            SwitchError::ConfigValidationError { .. }
            | SwitchError::InvalidConfigValueError { .. }
            | SwitchError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Dataset | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SwitchError::HttpClientError(_) => {
                "Check network connectivity and the API base URL".to_string()
            }
            SwitchError::CsvError(_) => {
                "Make sure the input file is a valid CSV with a header row".to_string()
            }
            SwitchError::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            SwitchError::SerializationError(_) => {
                "The data could not be encoded; re-run with --verbose for details".to_string()
            }
            SwitchError::ConfigValidationError { field, .. }
            | SwitchError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            SwitchError::MissingConfigError { field } => {
                format!("Provide '{}' via flag, environment or config file", field)
            }
            SwitchError::MissingColumns { .. } | SwitchError::MissingProfileColumn => {
                "Required columns: First Name, Last Name, Mobile Phone and Customer Profile (or Customer Profile - MOVE)".to_string()
            }
            SwitchError::ProcessingError { .. } => {
                "Inspect the input data and re-run with --verbose".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the API: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Dataset => format!("Error reading CSV file: {}", self),
            ErrorCategory::Storage => format!("File access failed: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }
}

/// 單次遠端呼叫的分類錯誤，Display 即為寫入報表的訊息
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    #[error("Unauthorized - check your API key")]
    Unauthorized,

    #[error("Lead not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Connection error")]
    ConnectionError,

    #[error("HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Invalid JSON response")]
    InvalidResponse,

    #[error("No lead ID in response. Response: {snippet}")]
    MissingIdentifier { snippet: String },

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl ClassifiedError {
    pub fn server_error(status: u16, body: &str) -> Self {
        ClassifiedError::ServerError {
            status,
            body: truncate_chars(body, ERROR_BODY_LIMIT),
        }
    }

    pub fn missing_identifier(raw_response: &str) -> Self {
        ClassifiedError::MissingIdentifier {
            snippet: truncate_chars(raw_response, RESPONSE_SNIPPET_LIMIT),
        }
    }
}

/// 資料列驗證失敗，只回報第一個不通過的檢查
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("No target profile specified")]
    MissingProfile,
}

/// 以字元 (而非位元組) 截斷，避免切在 UTF-8 中間
pub fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

pub type Result<T> = std::result::Result<T, SwitchError>;
