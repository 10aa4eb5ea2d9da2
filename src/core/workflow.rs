use crate::core::transport::RetryingTransport;
use crate::domain::model::{LeadId, NormalizedRecord};
use crate::domain::ports::{ApiSettings, LeadProcessor, ProcessFailure};
use crate::utils::error::{ClassifiedError, Result, SwitchError};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// switchCustomerProfile 的固定格式 payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchProfileRequest<'a> {
    pub profile: &'a str,
    pub send_message: bool,
    pub message_delay_hours: u32,
    pub message_delay_mins: u32,
    pub clear_memory: bool,
}

impl<'a> SwitchProfileRequest<'a> {
    pub fn new(profile: &'a str) -> Self {
        Self {
            profile,
            send_message: true,
            message_delay_hours: 0,
            message_delay_mins: 0,
            clear_memory: false,
        }
    }
}

/// lookup-by-phone 之後 switch-profile-by-id 的兩段式流程
#[derive(Debug)]
pub struct LeadApi {
    transport: RetryingTransport,
    base_url: Url,
}

impl LeadApi {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let transport = RetryingTransport::new(settings)?;
        Self::with_transport(transport, &settings.base_url)
    }

    pub fn with_transport(transport: RetryingTransport, base_url: &str) -> Result<Self> {
        // 統一結尾斜線，endpoint() 會在原路徑 (例如 /v1) 之後接上片段
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| SwitchError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self {
            transport,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, ClassifiedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClassifiedError::UnexpectedError("base URL cannot have a path".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET {base}/leads/lookup?phone=...`，取回應中的 `id`
    pub async fn lookup(&self, phone: &str) -> std::result::Result<LeadId, ClassifiedError> {
        let mut url = self.endpoint(&["leads", "lookup"])?;
        url.query_pairs_mut().append_pair("phone", phone);

        let body = self.transport.execute(Method::GET, url, None).await?;
        extract_lead_id(&body)
    }

    /// `POST {base}/leads/{leadId}/switchCustomerProfile`
    pub async fn switch_profile(
        &self,
        lead_id: &LeadId,
        target_profile: &str,
    ) -> std::result::Result<(), ClassifiedError> {
        let url = self.endpoint(&["leads", lead_id.as_str(), "switchCustomerProfile"])?;
        let payload = serde_json::to_value(SwitchProfileRequest::new(target_profile))
            .map_err(|e| ClassifiedError::UnexpectedError(e.to_string()))?;

        self.transport
            .execute(Method::POST, url, Some(&payload))
            .await
            .map(|_| ())
    }
}

/// 字串或數字型別的 `id` 都接受；缺少或空字串視為錯誤
fn extract_lead_id(body: &Value) -> std::result::Result<LeadId, ClassifiedError> {
    let id = match body.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    if id.is_empty() {
        return Err(ClassifiedError::missing_identifier(&body.to_string()));
    }
    Ok(LeadId::new(id))
}

#[async_trait]
impl LeadProcessor for LeadApi {
    async fn process(
        &self,
        record: &NormalizedRecord,
    ) -> std::result::Result<LeadId, ProcessFailure> {
        let lead_id = self
            .lookup(&record.phone)
            .await
            .map_err(|error| ProcessFailure {
                lead_id: None,
                error,
            })?;

        tracing::debug!("🔎 Found lead {} for phone {}", lead_id, record.phone);

        match self.switch_profile(&lead_id, &record.target_profile).await {
            Ok(()) => Ok(lead_id),
            Err(error) => Err(ProcessFailure {
                lead_id: Some(lead_id),
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn api(server: &MockServer, base_path: &str) -> LeadApi {
        let settings = ApiSettings {
            base_url: server.url(base_path),
            api_key: "k".to_string(),
            request_timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(5),
        };
        LeadApi::new(&settings).unwrap()
    }

    fn record(phone: &str, profile: &str) -> NormalizedRecord {
        NormalizedRecord {
            phone: phone.to_string(),
            target_profile: profile.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn test_switch_payload_shape() {
        let payload = serde_json::to_value(SwitchProfileRequest::new("VIP")).unwrap();
        assert_eq!(
            payload,
            json!({
                "profile": "VIP",
                "sendMessage": true,
                "messageDelayHours": 0,
                "messageDelayMins": 0,
                "clearMemory": false
            })
        );
    }

    #[test]
    fn test_extract_lead_id_variants() {
        assert_eq!(extract_lead_id(&json!({"id": "abc"})).unwrap().as_str(), "abc");
        assert_eq!(extract_lead_id(&json!({"id": 42})).unwrap().as_str(), "42");
        assert!(matches!(
            extract_lead_id(&json!({"id": ""})),
            Err(ClassifiedError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn test_missing_identifier_snippet_is_truncated() {
        let body = json!({"leads": "x".repeat(300)});
        match extract_lead_id(&body) {
            Err(ClassifiedError::MissingIdentifier { snippet }) => {
                assert_eq!(snippet.chars().count(), 100);
                assert!(snippet.starts_with("{\"leads\""));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_keeps_base_path_and_sends_phone() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/leads/lookup")
                .query_param("phone", "5551234567");
            then.status(200).json_body(json!({"id": "abc123"}));
        });

        let lead_id = api(&server, "/v1").lookup("5551234567").await.unwrap();

        lookup_mock.assert();
        assert_eq!(lead_id, LeadId::new("abc123"));
    }

    #[tokio::test]
    async fn test_process_success() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/leads/lookup")
                .query_param("phone", "5551234567");
            then.status(200).json_body(json!({"id": "abc123"}));
        });
        let switch_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/leads/abc123/switchCustomerProfile")
                .json_body(json!({
                    "profile": "VIP",
                    "sendMessage": true,
                    "messageDelayHours": 0,
                    "messageDelayMins": 0,
                    "clearMemory": false
                }));
            then.status(200).json_body(json!({"success": true}));
        });

        let result = api(&server, "/").process(&record("5551234567", "VIP")).await;

        lookup_mock.assert();
        switch_mock.assert();
        assert_eq!(result, Ok(LeadId::new("abc123")));
    }

    #[tokio::test]
    async fn test_process_lookup_failure_short_circuits() {
        let server = MockServer::start();
        let lookup_mock = server.mock(|when, then| {
            when.method(GET).path("/leads/lookup");
            then.status(404);
        });
        let switch_mock = server.mock(|when, then| {
            when.method(POST).path_contains("/switchCustomerProfile");
            then.status(200).json_body(json!({}));
        });

        let result = api(&server, "/").process(&record("555", "VIP")).await;

        lookup_mock.assert_hits(1);
        switch_mock.assert_hits(0);
        assert_eq!(
            result,
            Err(ProcessFailure {
                lead_id: None,
                error: ClassifiedError::NotFound
            })
        );
    }

    #[tokio::test]
    async fn test_process_missing_identifier() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/leads/lookup");
            then.status(200).json_body(json!({"status": "ok"}));
        });

        let failure = api(&server, "/")
            .process(&record("555", "VIP"))
            .await
            .unwrap_err();

        assert_eq!(failure.lead_id, None);
        assert_eq!(
            failure.error.to_string(),
            "No lead ID in response. Response: {\"status\":\"ok\"}"
        );
    }

    #[tokio::test]
    async fn test_process_switch_failure_keeps_lead_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/leads/lookup");
            then.status(200).json_body(json!({"id": "abc123"}));
        });
        let switch_mock = server.mock(|when, then| {
            when.method(POST).path("/leads/abc123/switchCustomerProfile");
            then.status(429);
        });

        let failure = api(&server, "/")
            .process(&record("555", "VIP"))
            .await
            .unwrap_err();

        switch_mock.assert_hits(3);
        assert_eq!(failure.lead_id, Some(LeadId::new("abc123")));
        assert_eq!(failure.error, ClassifiedError::RateLimited);
    }
}
