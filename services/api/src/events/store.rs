use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use ecosort_decision::Category;
use serde::Serialize;
use uuid::Uuid;

/// One recorded classification, newest kept first.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub filename: Option<String>,
    pub image_url: Option<String>,
    pub category: Category,
    pub confidence: f64,
    pub uncertain: bool,
}

impl ClassificationEvent {
    pub fn new(
        filename: Option<String>,
        image_url: Option<String>,
        category: Category,
        confidence: f64,
        uncertain: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            filename,
            image_url,
            category,
            confidence,
            uncertain,
        }
    }
}

/// Bounded in-memory event log shared across request tasks.
///
/// Oldest events are dropped once `capacity` is reached.
#[derive(Clone)]
pub struct EventStore {
    inner: Arc<Mutex<VecDeque<ClassificationEvent>>>,
    capacity: usize,
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
            capacity,
        }
    }

    pub fn record(&self, event: ClassificationEvent) {
        let mut events = self.inner.lock().expect("event store lock poisoned");
        events.push_front(event);
        while events.len() > self.capacity {
            events.pop_back();
        }
    }

    /// One page of events (1-based page), plus the total count.
    pub fn page(&self, page: usize, limit: usize) -> (Vec<ClassificationEvent>, usize) {
        let events = self.inner.lock().expect("event store lock poisoned");
        let total = events.len();
        let skip = (page - 1).saturating_mul(limit);
        let page_events = events.iter().skip(skip).take(limit).cloned().collect();
        (page_events, total)
    }

    /// Total count and per-category tallies.
    pub fn stats(&self) -> (usize, HashMap<String, usize>) {
        let events = self.inner.lock().expect("event store lock poisoned");
        let mut counts: HashMap<String, usize> = HashMap::new();
        for event in events.iter() {
            *counts.entry(event.category.as_str().to_string()).or_default() += 1;
        }
        (events.len(), counts)
    }

    pub fn all(&self) -> Vec<ClassificationEvent> {
        let events = self.inner.lock().expect("event store lock poisoned");
        events.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: Category, confidence: f64) -> ClassificationEvent {
        ClassificationEvent::new(Some("x.jpg".into()), None, category, confidence, false)
    }

    #[test]
    fn record_keeps_newest_first() {
        let store = EventStore::new(10);
        store.record(event(Category::Paper, 0.9));
        store.record(event(Category::Plastic, 0.8));

        let (events, total) = store.page(1, 50);
        assert_eq!(total, 2);
        assert_eq!(events[0].category, Category::Plastic);
        assert_eq!(events[1].category, Category::Paper);
    }

    #[test]
    fn capacity_drops_oldest() {
        let store = EventStore::new(3);
        for i in 0..5 {
            store.record(event(Category::General, i as f64 / 10.0));
        }
        let (events, total) = store.page(1, 50);
        assert_eq!(total, 3);
        // newest three survive: confidences 0.4, 0.3, 0.2
        assert_eq!(events[0].confidence, 0.4);
        assert_eq!(events[2].confidence, 0.2);
    }

    #[test]
    fn paging_skips_and_limits() {
        let store = EventStore::new(100);
        for i in 0..7 {
            store.record(event(Category::General, i as f64));
        }
        let (page2, total) = store.page(2, 3);
        assert_eq!(total, 7);
        assert_eq!(page2.len(), 3);
        // newest first: 6,5,4 | 3,2,1 | 0
        assert_eq!(page2[0].confidence, 3.0);

        let (page3, _) = store.page(3, 3);
        assert_eq!(page3.len(), 1);

        let (page4, _) = store.page(4, 3);
        assert!(page4.is_empty());
    }

    #[test]
    fn stats_tally_categories() {
        let store = EventStore::new(100);
        store.record(event(Category::Paper, 0.9));
        store.record(event(Category::Paper, 0.8));
        store.record(event(Category::General, 0.1));

        let (total, counts) = store.stats();
        assert_eq!(total, 3);
        assert_eq!(counts.get("paper"), Some(&2));
        assert_eq!(counts.get("general"), Some(&1));
        assert_eq!(counts.get("plastic"), None);
    }
}
