use serde::{Deserialize, Deserializer, Serialize};

/// A single object detection as reported by the model service.
///
/// Detector payloads in the wild are sloppy: fields go missing, confidences
/// arrive as strings, boxes are sometimes omitted entirely. Every field is
/// therefore optional and the engine decides how to treat the gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub class_id: Option<i64>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "confidence_lenient")]
    pub confidence: Option<f64>,
    #[serde(default, rename = "box")]
    pub bbox: Option<[f64; 4]>,
}

/// Accepts a JSON number or a numeric string; anything else becomes `None`.
fn confidence_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(value)) => Some(value),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        _ => None,
    })
}
