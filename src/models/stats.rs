use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_events: u64,
    /// Registrations for events that have not started yet.
    pub active_registrations: u64,
    /// Mean over events with at least one registration, one decimal.
    pub average_registrations_per_event: f64,
    pub top_event: TopEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEvent {
    pub name: String,
    pub registrations: i64,
}

impl TopEvent {
    #[must_use]
    pub fn none() -> Self {
        Self {
            name: "N/A".to_string(),
            registrations: 0,
        }
    }
}
