use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}
