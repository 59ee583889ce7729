use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

/// Timestamp format used by the outage feed, e.g. "2024-03-15T08:00:00".
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Deserialize `null` the same way as a missing field.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a local timestamp of the outage feed.
pub fn parse_event_time(input: &str) -> chrono::ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, EVENT_TIME_FORMAT)
}
