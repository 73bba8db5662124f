use std::collections::HashMap;

use serde::Serialize;

use super::store::ClassificationEvent;

#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    pub success: bool,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub events: Vec<ClassificationEvent>,
}

#[derive(Debug, Serialize)]
pub struct EventStatsResponse {
    pub success: bool,
    pub total: usize,
    pub counts: HashMap<String, usize>,
}
