pub mod remote;
pub mod stub;

use async_trait::async_trait;
use ecosort_common::error::EcosortResult;
use ecosort_decision::Detection;

pub use remote::{RemoteDetector, RemoteDetectorConfig};
pub use stub::HeuristicDetector;

/// An image handed to the detector, with whatever provenance we have.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub source_url: Option<String>,
}

impl ImagePayload {
    /// Best available name for logging and event records.
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .or(self.source_url.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// The object-detection collaborator.
///
/// Implementations report raw per-object detections; the decision engine owns
/// everything after that, including the fallback when nothing is detected.
#[async_trait]
pub trait Detector: Send + Sync {
    fn mode(&self) -> &'static str;

    async fn detect(&self, image: &ImagePayload) -> EcosortResult<Vec<Detection>>;
}
