use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::Json;
use ecosort_common::error::EcosortError;
use ecosort_decision::decide;

use crate::detector::ImagePayload;
use crate::error::ApiError;
use crate::events::ClassificationEvent;
use crate::extractors::ModelKeyGuard;
use crate::predict::requests::PredictRequest;
use crate::predict::responses::PredictResponse;
use crate::AppState;

const NO_IMAGE_MESSAGE: &str =
    "No image provided. Send JSON {imageUrl} or upload multipart file 'file'.";

fn no_image_error() -> ApiError {
    ApiError(EcosortError::Validation(NO_IMAGE_MESSAGE.to_string()))
}

pub async fn predict(
    State(state): State<AppState>,
    _guard: ModelKeyGuard,
    request: Request,
) -> Result<Json<PredictResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let image = if content_type.starts_with("application/json") {
        from_json_body(&state, request).await?
    } else if content_type.starts_with("multipart/form-data") {
        from_multipart(&state, request).await?
    } else {
        return Err(no_image_error());
    };

    let started = Instant::now();
    let detections = state.detector.detect(&image).await?;
    tracing::info!(
        image = image.display_name(),
        detections = detections.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "inference complete"
    );

    let verdict = decide(&detections, &state.decision);
    state.events.record(ClassificationEvent::new(
        image.filename.clone(),
        image.source_url.clone(),
        verdict.category,
        verdict.confidence,
        verdict.uncertain,
    ));

    Ok(Json(PredictResponse {
        success: true,
        category: verdict.category,
        confidence: verdict.confidence,
        uncertain: verdict.uncertain,
        notes: verdict.notes_joined(),
        raw_prediction: detections,
    }))
}

async fn from_json_body(state: &AppState, request: Request) -> Result<ImagePayload, ApiError> {
    let bytes = Bytes::from_request(request, state)
        .await
        .map_err(|e| ApiError(EcosortError::Validation(format!("failed to read body: {e}"))))?;
    let body: PredictRequest = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError(EcosortError::Validation(format!("invalid JSON body: {e}"))))?;

    let url = body
        .image_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(no_image_error)?;

    tracing::info!(%url, "fetching image from URL");
    let image_bytes = state.fetcher.fetch(&url).await?;

    Ok(ImagePayload {
        bytes: image_bytes,
        filename: None,
        source_url: Some(url),
    })
}

async fn from_multipart(state: &AppState, request: Request) -> Result<ImagePayload, ApiError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError(EcosortError::Validation(format!("invalid multipart body: {e}"))))?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError(EcosortError::Validation(format!(
            "Failed to fetch/parse image: {e}"
        )))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError(EcosortError::Validation(format!(
                "Failed to fetch/parse image: {e}"
            )))
        })?;
        return Ok(ImagePayload {
            bytes: bytes.to_vec(),
            filename,
            source_url: None,
        });
    }

    Err(no_image_error())
}
