use std::time::Duration;

use async_trait::async_trait;
use ecosort_common::error::{EcosortError, EcosortResult};
use ecosort_decision::Detection;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{Detector, ImagePayload};

#[derive(Debug, Clone)]
pub struct RemoteDetectorConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl RemoteDetectorConfig {
    /// Load detector config from environment.
    ///
    /// Returns `None` if `DETECTOR_URL` is unset — the service then runs with
    /// the heuristic stub instead.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("DETECTOR_URL").ok()?;
        let timeout_secs = std::env::var("DETECTOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let max_retries = std::env::var("DETECTOR_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            max_retries,
        })
    }
}

/// Wire shape of the detector's prediction response.
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// HTTP client for an external object-detection service.
///
/// Uploads the image as a multipart `file` field to `{base_url}/predict` and
/// expects `{"detections": [...]}` back. Transient failures (timeouts,
/// connect errors, 5xx) are retried with exponential backoff; 429 honors
/// `Retry-After`; any other 4xx fails fast.
#[derive(Clone)]
pub struct RemoteDetector {
    client: Client,
    config: RemoteDetectorConfig,
}

impl RemoteDetector {
    pub fn new(config: RemoteDetectorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn predict_with_retry(&self, image: &ImagePayload) -> EcosortResult<Vec<Detection>> {
        let url = format!("{}/predict", self.config.base_url);
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = std::cmp::min(1u64 << attempt, 30);
                tracing::warn!(attempt, backoff_secs, "retrying detector after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
            }

            // The form is consumed by send, so rebuild it per attempt.
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.filename.clone().unwrap_or_else(|| "upload.jpg".to_string()));
            let form = reqwest::multipart::Form::new().part("file", part);

            let response = match self.client.post(&url).multipart(form).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(EcosortError::Upstream(format!("detector request failed: {e}")));
                }
            };

            let status = response.status();

            if status.is_success() {
                let parsed: DetectResponse = response.json().await.map_err(|e| {
                    EcosortError::Upstream(format!("invalid detector response: {e}"))
                })?;
                return Ok(parsed.detections);
            }

            // Honor Retry-After header for 429
            if status == StatusCode::TOO_MANY_REQUESTS {
                if let Some(retry_after) = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                {
                    let wait = std::cmp::min(retry_after, 60);
                    tracing::warn!(wait, "detector rate-limited, waiting Retry-After");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                last_error = "429 Too Many Requests".to_string();
                continue;
            }

            // Retry on 5xx
            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on 4xx (except 429 handled above)
            let body = response.text().await.unwrap_or_default();
            return Err(EcosortError::Upstream(format!(
                "detector returned {status}: {body}"
            )));
        }

        Err(EcosortError::Upstream(format!(
            "detector unavailable after {} attempts: {last_error}",
            self.config.max_retries + 1
        )))
    }
}

#[async_trait]
impl Detector for RemoteDetector {
    fn mode(&self) -> &'static str {
        "remote"
    }

    async fn detect(&self, image: &ImagePayload) -> EcosortResult<Vec<Detection>> {
        self.predict_with_retry(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> RemoteDetectorConfig {
        RemoteDetectorConfig {
            base_url: "http://localhost".to_string(),
            timeout_secs: 5,
            max_retries: 2,
        }
    }

    fn test_image() -> ImagePayload {
        ImagePayload {
            bytes: b"fake-jpeg".to_vec(),
            filename: Some("bottle.jpg".to_string()),
            source_url: None,
        }
    }

    #[tokio::test]
    async fn detect_parses_detections() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "detections": [
                { "class_id": 1, "class_name": "plastic", "confidence": 0.91,
                  "box": [1.0, 2.0, 3.0, 4.0] },
                { "class_id": 0, "class_name": "paper", "confidence": 0.12,
                  "box": [5.0, 6.0, 7.0, 8.0] }
            ]
        });
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let detector = RemoteDetector::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());

        let detections = detector.detect(&test_image()).await.unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].class_name.as_deref(), Some("plastic"));
        assert_eq!(detections[0].confidence, Some(0.91));
        assert_eq!(detections[1].bbox, Some([5.0, 6.0, 7.0, 8.0]));
    }

    #[tokio::test]
    async fn missing_detections_field_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let detector = RemoteDetector::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());

        let detections = detector.detect(&test_image()).await.unwrap();
        assert!(detections.is_empty());
    }

    #[tokio::test]
    async fn retries_on_500_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "detections": [] })),
            )
            .mount(&server)
            .await;

        let detector = RemoteDetector::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());

        let detections = detector.detect(&test_image()).await.unwrap();
        assert!(detections.is_empty());
    }

    #[tokio::test]
    async fn fails_fast_on_400() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad image"))
            .expect(1)
            .mount(&server)
            .await;

        let detector = RemoteDetector::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());

        let err = detector.detect(&test_image()).await.unwrap_err();
        match err {
            EcosortError::Upstream(msg) => assert!(msg.contains("400")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3) // initial attempt + 2 retries
            .mount(&server)
            .await;

        let detector = RemoteDetector::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());

        let err = detector.detect(&test_image()).await.unwrap_err();
        match err {
            EcosortError::Upstream(msg) => assert!(msg.contains("3 attempts")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
