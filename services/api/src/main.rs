mod detector;
mod error;
mod events;
mod extractors;
mod fetch;
mod predict;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ecosort_common::types::ServiceInfo;
use ecosort_config::{init_tracing, AppConfig};
use ecosort_decision::DecisionConfig;
use tower_http::cors::CorsLayer;

use crate::detector::{Detector, HeuristicDetector, RemoteDetector, RemoteDetectorConfig};
use crate::events::EventStore;
use crate::fetch::ImageFetcher;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_EVENTS_CAPACITY: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn Detector>,
    pub detector_url: Option<String>,
    pub fetcher: ImageFetcher,
    pub events: EventStore,
    pub decision: DecisionConfig,
    pub api_key: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "detector": state.detector.mode(),
        "detector_url": state.detector_url,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("ecosort-api"))
}

async fn metrics() -> impl IntoResponse {
    let body = "\
# HELP ecosort_up Service up indicator\n\
# TYPE ecosort_up gauge\n\
ecosort_up 1\n\
# HELP ecosort_info Service info\n\
# TYPE ecosort_info gauge\n\
ecosort_info{service=\"ecosort-api\",version=\"0.1.0\"} 1\n";

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn build_router(state: AppState) -> Router {
    // The original endpoint was public with open CORS; uploads need a body
    // limit well above axum's 2 MB default.
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .merge(predict::router())
        .merge(events::router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn build_detector() -> (Arc<dyn Detector>, Option<String>) {
    match RemoteDetectorConfig::from_env() {
        Some(config) => {
            let url = config.base_url.clone();
            tracing::info!(url = %url, "using remote detector");
            let detector = RemoteDetector::new(config).expect("failed to build detector client");
            (Arc::new(detector), Some(url))
        }
        None => {
            tracing::warn!("DETECTOR_URL not set; using heuristic stub detector");
            (Arc::new(HeuristicDetector), None)
        }
    }
}

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("failed to load config");
    init_tracing(&config.log_level);
    tracing::info!(service = "ecosort-api", "starting");

    let (detector, detector_url) = build_detector();
    let events_capacity = std::env::var("EVENTS_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_EVENTS_CAPACITY);

    let state = AppState {
        detector,
        detector_url,
        fetcher: ImageFetcher::from_env().expect("failed to build image fetcher"),
        events: EventStore::new(events_capacity),
        decision: DecisionConfig {
            paper_threshold: config.paper_threshold,
            plastic_threshold: config.plastic_threshold,
            global_min: config.global_min,
            confidence_margin: config.confidence_margin,
        },
        api_key: config.model_api_key.clone(),
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
