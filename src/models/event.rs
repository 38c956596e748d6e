use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEvent {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub venue: String,
    pub capacity: i32,
    /// Category by id. Mutually exclusive with `category`.
    #[serde(default)]
    pub category_id: Option<i32>,
    /// Category by name. Mutually exclusive with `category_id`.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEvent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub capacity: Option<i32>,
    /// `null` detaches the event from its category.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events that start after today and still have free slots.
    pub available: bool,
    pub category_id: Option<i32>,
    pub skip: u64,
    pub limit: u64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            available: false,
            category_id: None,
            skip: 0,
            limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventSlots {
    pub capacity: i32,
    pub registered: u64,
    pub remaining: u64,
}
