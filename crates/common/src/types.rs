use serde::Serialize;
use uuid::Uuid;

/// Metadata a service reports on its `/info` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub instance_id: Uuid,
}

impl ServiceInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instance_id: Uuid::new_v4(),
        }
    }
}
