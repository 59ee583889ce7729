use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::DbChatId;
use crate::utils::deserialize_null_default;

// Database models

#[derive(Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscription<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub subscribe_to_kladr: &'a str,
    pub subscribe_to_fulltext: &'a str,
    pub tg_id: DbChatId,
}

// Serde models

/// The only event kind that is delivered to subscribers.
pub const EVENT_SHUTDOWN: &str = "shutdown";

/// An enriched outage event as published to the queue.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutageEvent {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub mp: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub organization: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub short_description: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub event: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub event_start: String,
    pub event_stop: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub city: String,
    pub street_type: Option<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub street_type_raw: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub street: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub service: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub house_numbers: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub house_ranges: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub region_kladr: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub region_name: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub region_type: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub street_kladr: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub street_name: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub street_type_full: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub city_kladr: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub city_name: String,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub city_type: String,
}

impl OutageEvent {
    pub fn is_shutdown(&self) -> bool {
        self.event == EVENT_SHUTDOWN
    }

    /// Region, street and city codes of the event, skipping absent ones.
    pub fn kladr_codes(&self) -> Vec<&str> {
        [&self.region_kladr, &self.street_kladr, &self.city_kladr]
            .into_iter()
            .map(String::as_str)
            .filter(|code| !code.is_empty())
            .collect()
    }
}
