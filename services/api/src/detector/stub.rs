use async_trait::async_trait;
use ecosort_common::error::EcosortResult;
use ecosort_decision::Detection;

use super::{Detector, ImagePayload};

/// Filename keywords mapped to the class the demo detector would report.
const KEYWORDS: &[(&str, &str, f64)] = &[
    ("cup", "plastic", 0.95),
    ("juice", "plastic", 0.95),
    ("bottle", "plastic", 0.94),
    ("soda", "plastic", 0.94),
    ("paper", "paper", 0.93),
    ("bag", "paper", 0.93),
    ("book", "paper", 0.93),
    ("napkin", "paper", 0.93),
    ("tissue", "paper", 0.93),
];

/// Deterministic keyword stub, pending a real detector deployment.
///
/// Matches on the image's filename or source URL; anything unrecognized
/// yields no detections at all, so the decision engine's own fallback applies.
pub struct HeuristicDetector;

#[async_trait]
impl Detector for HeuristicDetector {
    fn mode(&self) -> &'static str {
        "heuristic"
    }

    async fn detect(&self, image: &ImagePayload) -> EcosortResult<Vec<Detection>> {
        let name = image.display_name().to_lowercase();

        for (keyword, class_name, confidence) in KEYWORDS {
            if name.contains(keyword) {
                return Ok(vec![Detection {
                    class_id: None,
                    class_name: Some((*class_name).to_string()),
                    confidence: Some(*confidence),
                    bbox: None,
                }]);
            }
        }

        Ok(Vec::new())
    }
}
