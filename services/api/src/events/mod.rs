pub mod handlers;
pub mod responses;
pub mod store;

use axum::routing::get;
use axum::Router;

use crate::AppState;

pub use store::{ClassificationEvent, EventStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::list_events))
        .route("/events/stats", get(handlers::event_stats))
        .route("/events/export", get(handlers::export_csv))
}
