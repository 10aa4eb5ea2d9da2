use crate::domain::ports::ApiSettings;
use crate::utils::error::{ClassifiedError, Result, SwitchError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const API_KEY_HEADER: &str = "x-api-key";

/// 單次嘗試失敗；`retry_after` 為 None 表示不可重試
struct AttemptFailure {
    error: ClassifiedError,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    fn terminal(error: ClassifiedError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }

    fn retryable(error: ClassifiedError, delay: Duration) -> Self {
        Self {
            error,
            retry_after: Some(delay),
        }
    }
}

/// 帶有限次重試與統一錯誤分類的 HTTP 呼叫
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryingTransport {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&settings.api_key).map_err(|_| {
            SwitchError::InvalidConfigValueError {
                field: "api_key".to_string(),
                value: "<redacted>".to_string(),
                reason: "API key is not a valid header value".to_string(),
            }
        })?;
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            max_attempts: settings.max_attempts.max(1),
            retry_delay: settings.retry_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 執行一次邏輯呼叫，必要時在嘗試之間等待後重試
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        payload: Option<&Value>,
    ) -> std::result::Result<Value, ClassifiedError> {
        let mut attempt = 1;
        loop {
            tracing::debug!(
                "📡 {} {} (attempt {}/{})",
                method,
                url.path(),
                attempt,
                self.max_attempts
            );

            let failure = match self.attempt(method.clone(), url.clone(), payload).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            let delay = match failure.retry_after {
                Some(delay) if attempt < self.max_attempts => delay,
                _ => {
                    tracing::debug!("📡 {} {} failed: {}", method, url.path(), failure.error);
                    return Err(failure.error);
                }
            };

            tracing::warn!(
                "🔁 {} {} attempt {}/{} failed ({}), retrying in {:?}",
                method,
                url.path(),
                attempt,
                self.max_attempts,
                failure.error,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: Url,
        payload: Option<&Value>,
    ) -> std::result::Result<Value, AttemptFailure> {
        let mut request = self.client.request(method, url);
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.classify_transport_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        self.classify_response(status, &body)
    }

    fn classify_response(
        &self,
        status: StatusCode,
        body: &str,
    ) -> std::result::Result<Value, AttemptFailure> {
        match status {
            // 只有 200 算成功；201/204 等其他狀態照一般錯誤重試
            StatusCode::OK => serde_json::from_str(body)
                .map_err(|_| AttemptFailure::terminal(ClassifiedError::InvalidResponse)),
            StatusCode::UNAUTHORIZED => {
                Err(AttemptFailure::terminal(ClassifiedError::Unauthorized))
            }
            StatusCode::NOT_FOUND => Err(AttemptFailure::terminal(ClassifiedError::NotFound)),
            StatusCode::TOO_MANY_REQUESTS => Err(AttemptFailure::retryable(
                ClassifiedError::RateLimited,
                self.retry_delay * 2,
            )),
            s => Err(AttemptFailure::retryable(
                ClassifiedError::server_error(s.as_u16(), body),
                self.retry_delay,
            )),
        }
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> AttemptFailure {
        if error.is_timeout() {
            AttemptFailure::retryable(ClassifiedError::Timeout, self.retry_delay)
        } else if error.is_connect() {
            AttemptFailure::retryable(ClassifiedError::ConnectionError, self.retry_delay)
        } else {
            AttemptFailure::terminal(ClassifiedError::UnexpectedError(error.to_string()))
        }
    }
}
