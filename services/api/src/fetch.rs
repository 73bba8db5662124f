use std::time::Duration;

use ecosort_common::error::{EcosortError, EcosortResult};
use reqwest::Client;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Downloads images referenced by URL in prediction requests.
///
/// Any failure (transport, timeout, non-2xx) is reported as a validation
/// error: a bad image URL is the caller's problem, not ours.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self, reqwest::Error> {
        let timeout_secs = std::env::var("IMAGE_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(timeout_secs)
    }

    pub async fn fetch(&self, url: &str) -> EcosortResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EcosortError::Validation(format!("Failed to fetch/parse image: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EcosortError::Validation(format!(
                "Failed to fetch/parse image: HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EcosortError::Validation(format!("Failed to fetch/parse image: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_returns_body_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(5).unwrap();
        let bytes = fetcher
            .fetch(&format!("{}/img.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, b"jpegdata");
    }

    #[tokio::test]
    async fn fetch_404_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(5).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        match err {
            EcosortError::Validation(msg) => {
                assert!(msg.contains("Failed to fetch/parse image"));
                assert!(msg.contains("404"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_unreachable_host_is_validation_error() {
        // Port 1 is virtually guaranteed to refuse connections.
        let fetcher = ImageFetcher::new(1).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/x.jpg").await.unwrap_err();
        assert!(matches!(err, EcosortError::Validation(_)));
    }
}
