use crate::domain::model::{LeadId, NormalizedRecord, ProgressUpdate};
use crate::utils::error::{ClassifiedError, Result};
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 遠端 API 設定，建構 transport 時明確傳入，批次期間唯讀
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl ApiSettings {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.attent.app/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(Self::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// 遇到 401 時的批次策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnauthorizedPolicy {
    /// 只讓當前這筆失敗
    #[default]
    Continue,
    /// 之後的列不再呼叫 API
    FailFast,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub row_delay: Duration,
    /// 第 0 筆資料對應的報表列號 (含標頭列)
    pub row_number_offset: usize,
    pub unauthorized_policy: UnauthorizedPolicy,
}

impl BatchOptions {
    pub const DEFAULT_ROW_DELAY_MS: u64 = 100;
    pub const DEFAULT_ROW_NUMBER_OFFSET: usize = 2;
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            row_delay: Duration::from_millis(Self::DEFAULT_ROW_DELAY_MS),
            row_number_offset: Self::DEFAULT_ROW_NUMBER_OFFSET,
            unauthorized_policy: UnauthorizedPolicy::Continue,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn api_settings(&self) -> ApiSettings;
    fn batch_options(&self) -> BatchOptions;
}

/// 單筆處理失敗；lookup 成功但 mutate 失敗時仍帶著 lead id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub lead_id: Option<LeadId>,
    pub error: ClassifiedError,
}

#[async_trait]
pub trait LeadProcessor: Send + Sync {
    async fn process(
        &self,
        record: &NormalizedRecord,
    ) -> std::result::Result<LeadId, ProcessFailure>;
}

pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, update: &ProgressUpdate) {
        tracing::info!("⏳ [{:>5.1}%] {}", update.fraction * 100.0, update.message);
    }
}
