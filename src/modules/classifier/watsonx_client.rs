//! Vision classification client for the watsonx generation endpoint
//!
//! Sends the photo to a vision model and reads back crack type and repair
//! priority. Without credentials, or when the single request fails, a
//! deterministic mock result is returned instead so uploads never fail on
//! classification.

use base64::prelude::*;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use super::mock::mock_classification;
use super::response::parse_response;
use super::types::Classification;
use crate::core::config::ClassifierConfig;
use crate::core::error::AppError;

const CLASSIFICATION_PROMPT: &str = "Analyze this road image and identify any cracks or damage. \
Classify the crack type as one of: longitudinal crack, transverse crack, alligator crack, or pothole. \
Also determine the repair priority level as: immediate, moderate, low, or none. \
Respond in JSON format with keys: crack_type and repair_level.";

const MOCK_NOTE_UNCONFIGURED: &str =
    "Mock result - WATSONX_API_KEY and WATSONX_URL not configured";
const MOCK_NOTE_FAILED: &str = "Mock result - vision classification request failed";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Live endpoint details, present only when fully configured
struct Endpoint {
    http_client: Client,
    api_key: String,
    generation_url: String,
}

pub struct ClassificationClient {
    endpoint: Option<Endpoint>,
    model: String,
}

impl ClassificationClient {
    pub fn new(config: &ClassifierConfig) -> Result<Self, AppError> {
        let endpoint = match (&config.api_key, &config.url) {
            (Some(api_key), Some(url)) => {
                let http_client = Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|e| {
                        AppError::Internal(format!("Failed to create HTTP client: {}", e))
                    })?;

                let generation_url = format!("{}/v1/generation", url.trim_end_matches('/'));
                info!(
                    "Vision classifier configured: url={}, model={}, timeout={:?}",
                    generation_url, config.model, config.timeout
                );

                Some(Endpoint {
                    http_client,
                    api_key: api_key.clone(),
                    generation_url,
                })
            }
            _ => {
                info!("Vision classifier credentials not configured, using mock classification");
                None
            }
        };

        Ok(Self {
            endpoint,
            model: config.model.clone(),
        })
    }

    pub fn is_live(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Classify a road photo.
    ///
    /// Never fails: any problem with the live call degrades to the mock result.
    pub async fn classify(&self, image: &[u8]) -> Classification {
        let Some(endpoint) = &self.endpoint else {
            return mock_classification(image, MOCK_NOTE_UNCONFIGURED);
        };

        match self.request_classification(endpoint, image).await {
            Ok(classification) => {
                debug!(
                    "Vision classification ({:?}): crack_type={}, repair_level={}",
                    classification.source, classification.crack_type, classification.repair_level
                );
                classification
            }
            Err(e) => {
                warn!("Vision classification failed, using mock result: {}", e);
                mock_classification(image, MOCK_NOTE_FAILED)
            }
        }
    }

    async fn request_classification(
        &self,
        endpoint: &Endpoint,
        image: &[u8],
    ) -> Result<Classification, AppError> {
        let payload = json!({
            "model": self.model,
            "input": [
                {
                    "role": "user",
                    "content": CLASSIFICATION_PROMPT,
                },
                {
                    "type": "image",
                    "image_base64": BASE64_STANDARD.encode(image),
                    "mimetype": sniff_mime_type(image),
                }
            ]
        });

        let response = endpoint
            .http_client
            .post(&endpoint.generation_url)
            .bearer_auth(&endpoint.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Vision request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Vision service returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to read vision response: {}", e))
        })?;

        Ok(parse_response(&body))
    }
}

fn sniff_mime_type(image: &[u8]) -> &'static str {
    if image.starts_with(PNG_SIGNATURE) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::classifier::{ClassificationSource, CrackType, RepairLevel};
    use crate::shared::test_helpers::spawn_stub_server;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;
    use std::time::Duration;

    fn live_config(url: String) -> ClassifierConfig {
        ClassifierConfig {
            api_key: Some("test-key".to_string()),
            url: Some(url),
            model: "vision-test".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_uses_mock() {
        let client = ClassificationClient::new(&ClassifierConfig::mock()).unwrap();
        assert!(!client.is_live());

        let result = client.classify(&[0u8; 7]).await;
        assert_eq!(result.source, ClassificationSource::Mock);
        assert_eq!(result.crack_type, CrackType::Pothole);
        assert_eq!(result.repair_level, RepairLevel::Low);
        assert_eq!(result.raw, MOCK_NOTE_UNCONFIGURED);
    }

    #[tokio::test]
    async fn test_live_structured_response() {
        let router = Router::new().route(
            "/v1/generation",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer test-key");
                let well_formed = body["model"] == "vision-test"
                    && body["input"][0]["role"] == "user"
                    && body["input"][1]["type"] == "image"
                    && body["input"][1]["mimetype"] == "image/png"
                    && body["input"][1]["image_base64"] == BASE64_STANDARD.encode(PNG_SIGNATURE);

                if authorized && well_formed {
                    (
                        StatusCode::OK,
                        Json(json!({"output": {"crack_type": "pothole", "repair_level": "immediate"}})),
                    )
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"error": "unexpected request"})))
                }
            }),
        );
        let url = spawn_stub_server(router).await;
        let client = ClassificationClient::new(&live_config(url)).unwrap();
        assert!(client.is_live());

        let result = client.classify(PNG_SIGNATURE).await;
        assert_eq!(result.source, ClassificationSource::Structured);
        assert_eq!(result.crack_type, CrackType::Pothole);
        assert_eq!(result.repair_level, RepairLevel::Immediate);
    }

    #[tokio::test]
    async fn test_live_text_response_uses_keywords() {
        let router = Router::new().route(
            "/v1/generation",
            post(|| async { "I see an alligator crack; repair is moderate." }),
        );
        let url = spawn_stub_server(router).await;
        let client = ClassificationClient::new(&live_config(url)).unwrap();

        let result = client.classify(b"jpeg-ish").await;
        assert_eq!(result.source, ClassificationSource::Keyword);
        assert_eq!(result.crack_type, CrackType::Alligator);
        assert_eq!(result.repair_level, RepairLevel::Moderate);
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_mock() {
        let router = Router::new().route(
            "/v1/generation",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "pothole immediate") }),
        );
        let url = spawn_stub_server(router).await;
        let client = ClassificationClient::new(&live_config(url)).unwrap();

        let image = [1u8; 9];
        let result = client.classify(&image).await;
        assert_eq!(result.source, ClassificationSource::Mock);
        assert_eq!(result.crack_type, CrackType::Transverse);
        assert_eq!(result.repair_level, RepairLevel::None);
        assert_eq!(result.raw, MOCK_NOTE_FAILED);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back_to_mock() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ClassificationClient::new(&live_config(format!("http://{}", addr))).unwrap();
        let result = client.classify(&[0u8; 4]).await;
        assert_eq!(result.source, ClassificationSource::Mock);
    }

    #[test]
    fn test_sniff_mime_type() {
        assert_eq!(sniff_mime_type(b"\x89PNG\r\n\x1a\nrest"), "image/png");
        assert_eq!(sniff_mime_type(b"\xff\xd8\xff"), "image/jpeg");
    }
}
