//! Opt-in product analytics. Events are structured log lines; nothing leaves
//! the process when analytics is disabled.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    enabled: bool,
}

impl AnalyticsService {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn track(&self, event: &str, properties: Value) {
        if !self.enabled {
            return;
        }
        tracing::info!(target: "analytics", event, %properties, "event tracked");
    }
}
