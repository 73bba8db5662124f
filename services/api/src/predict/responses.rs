use ecosort_decision::{Category, Detection};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub category: Category,
    pub confidence: f64,
    pub uncertain: bool,
    /// Rationale fragments joined with "; ".
    pub notes: String,
    /// The detector's output, passed through untouched.
    pub raw_prediction: Vec<Detection>,
}
