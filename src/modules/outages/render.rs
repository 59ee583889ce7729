//! Text of an outage notification.

use itertools::Itertools as _;

use crate::models::OutageEvent;
use crate::utils::parse_event_time;

const DISPLAY_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

pub fn notification_text(event: &OutageEvent) -> String {
    format!(
        "{} по адресу {} с {}\n\n{}",
        service_label(&event.service),
        address(event),
        start_time(&event.event_start),
        event.short_description,
    )
}

fn service_label(service: &str) -> &'static str {
    match service {
        "WATER" => "💧 Отключение воды",
        "ELECTRICITY" => "⚡️ Отключение электричества",
        _ => "Отключение",
    }
}

/// "г. Тирасполь, ул. Ленина 5, 7, 9-15"
fn address(event: &OutageEvent) -> String {
    let street_type = event
        .street_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(&event.street_type_raw);
    let city = join_non_empty([event.city_type.as_str(), event.city.as_str()], " ");
    let street = join_non_empty([street_type, event.street.as_str()], " ");
    let houses = event
        .house_numbers
        .iter()
        .chain(&event.house_ranges)
        .filter(|h| !h.is_empty())
        .join(", ");
    let street = join_non_empty([street.as_str(), houses.as_str()], " ");
    join_non_empty([city.as_str(), street.as_str()], ", ")
}

fn join_non_empty<'a>(
    parts: impl IntoIterator<Item = &'a str>,
    sep: &str,
) -> String {
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).join(sep)
}

fn start_time(event_start: &str) -> String {
    match parse_event_time(event_start) {
        Ok(t) => t.format(DISPLAY_TIME_FORMAT).to_string(),
        Err(e) => {
            log::warn!("Unexpected event start {event_start:?}: {e}");
            event_start.to_string()
        }
    }
}
