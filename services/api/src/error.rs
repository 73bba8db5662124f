use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ecosort_common::error::EcosortError;

pub struct ApiError(pub EcosortError);

impl From<EcosortError> for ApiError {
    fn from(err: EcosortError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EcosortError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            EcosortError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            EcosortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            EcosortError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let resp = ApiError(EcosortError::Validation("bad input".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_maps_to_502() {
        let resp = ApiError(EcosortError::Upstream("detector down".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_maps_to_500() {
        let resp = ApiError(EcosortError::Internal("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
