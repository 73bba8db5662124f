use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::events::responses::{EventStatsResponse, ListEventsResponse};
use crate::events::store::ClassificationEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).max(1);

    let (events, total) = state.events.page(page, limit);
    Ok(Json(ListEventsResponse {
        success: true,
        page,
        limit,
        total,
        events,
    }))
}

pub async fn event_stats(
    State(state): State<AppState>,
) -> Result<Json<EventStatsResponse>, ApiError> {
    let (total, counts) = state.events.stats();
    Ok(Json(EventStatsResponse {
        success: true,
        total,
        counts,
    }))
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let mut csv = String::from("id,timestamp,filename,image_url,category,confidence,uncertain\n");
    for event in state.events.all() {
        csv.push_str(&csv_row(&event));
        csv.push('\n');
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ecosort_export.csv\"",
            ),
        ],
        csv,
    )
}

fn csv_row(event: &ClassificationEvent) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        event.id,
        event.timestamp.to_rfc3339(),
        csv_field(event.filename.as_deref().unwrap_or("")),
        csv_field(event.image_url.as_deref().unwrap_or("")),
        event.category.as_str(),
        event.confidence,
        event.uncertain,
    )
}

/// Quote a field only when it needs it (commas, quotes, newlines).
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosort_decision::Category;

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain.jpg"), "plain.jpg");
        assert_eq!(csv_field("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_row_has_seven_fields() {
        let event = ClassificationEvent::new(
            Some("bottle.jpg".into()),
            None,
            Category::Plastic,
            0.94,
            false,
        );
        let row = csv_row(&event);
        assert_eq!(row.split(',').count(), 7);
        assert!(row.contains("plastic"));
        assert!(row.ends_with("false"));
    }
}
