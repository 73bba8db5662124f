use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::AppState;

/// Guard for the prediction endpoint.
///
/// When no `MODEL_API_KEY` is configured the guard is a no-op. When one is
/// set, the caller must present it either in the `X-Model-Key` header or as
/// a `?key=` query parameter.
pub struct ModelKeyGuard;

#[derive(Debug)]
pub struct ModelKeyRejection;

impl IntoResponse for ModelKeyRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "success": false, "message": "Invalid API Key" });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for ModelKeyGuard {
    type Rejection = ModelKeyRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.api_key.as_deref() else {
            return Ok(Self);
        };

        let from_header = parts
            .headers
            .get("X-Model-Key")
            .and_then(|v| v.to_str().ok());
        let from_query = parts.uri.query().and_then(key_from_query);

        if from_header.or(from_query) == Some(expected) {
            Ok(Self)
        } else {
            Err(ModelKeyRejection)
        }
    }
}

fn key_from_query(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| pair.strip_prefix("key="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_extracted_from_query() {
        assert_eq!(key_from_query("key=sekrit"), Some("sekrit"));
        assert_eq!(key_from_query("a=1&key=sekrit&b=2"), Some("sekrit"));
        assert_eq!(key_from_query("a=1&b=2"), None);
        assert_eq!(key_from_query(""), None);
    }
}
