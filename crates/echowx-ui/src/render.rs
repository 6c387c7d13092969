//! Panel and text renderers.

use chrono::{Local, TimeZone};
use echowx_services::Favorite;
use echowx_weather::{format_fahrenheit, Alert, CurrentConditions, ForecastPeriod};

use crate::view::{Fragment, Panel};

pub const FORECAST_HEADING: &str = "7-Day Forecast";
pub const ALERTS_HEADING: &str = "Active Alerts";

/// Append a heading and one block per period. Existing content is kept.
pub fn render_forecast(panel: &mut Panel, periods: &[ForecastPeriod]) {
    if periods.is_empty() {
        return;
    }
    panel.push(Fragment::Heading(FORECAST_HEADING.to_string()));
    for period in periods {
        panel.push(Fragment::Block {
            title: period.name.clone(),
            body: period.detailed_forecast.clone(),
        });
    }
}

/// Replace the panel with a heading and one block per alert.
pub fn render_alerts(panel: &mut Panel, alerts: &[Alert]) {
    if alerts.is_empty() {
        return;
    }
    let mut fragments = Vec::with_capacity(alerts.len() + 1);
    fragments.push(Fragment::Heading(ALERTS_HEADING.to_string()));
    fragments.extend(alerts.iter().map(|alert| Fragment::Block {
        title: alert.headline.clone(),
        body: alert.description.clone(),
    }));
    panel.replace(fragments);
}

/// "Mostly Cloudy, 86°F, (Feels like 91°F)" and an "Updated at" line in
/// local time. `None` when the observation has nothing to show.
pub fn format_conditions(conditions: &CurrentConditions) -> Option<String> {
    format_conditions_in(conditions, &Local)
}

pub fn format_conditions_in<Tz: TimeZone>(
    conditions: &CurrentConditions,
    tz: &Tz,
) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut parts = Vec::new();
    if !conditions.description.is_empty() {
        parts.push(conditions.description.clone());
    }
    if let Some(temp) = conditions.temperature_c {
        parts.push(format_fahrenheit(temp));
    }
    if let Some(feels) = conditions.displayed_feels_like() {
        parts.push(format!("(Feels like {})", format_fahrenheit(feels)));
    }
    if parts.is_empty() {
        return None;
    }

    let mut text = parts.join(", ");
    if let Some(ts) = conditions.timestamp {
        let local = ts.with_timezone(tz);
        text.push_str(&format!("\nUpdated at {}", local.format("%-I:%M %p")));
    }
    Some(text)
}

/// One row of the favorites list. `index` points into the unfiltered list.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRow {
    pub index: usize,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Filter by case-insensitive substring of the trimmed filter text, then
/// sort by name ignoring case.
pub fn render_favorites(favorites: &[Favorite], filter: &str) -> Vec<FavoriteRow> {
    let needle = filter.trim().to_lowercase();

    let mut rows: Vec<FavoriteRow> = favorites
        .iter()
        .enumerate()
        .filter(|(_, fav)| needle.is_empty() || fav.name.to_lowercase().contains(&needle))
        .map(|(index, fav)| FavoriteRow {
            index,
            name: fav.name.clone(),
            lat: fav.lat,
            lng: fav.lng,
        })
        .collect();

    rows.sort_by_cached_key(|row| row.name.to_lowercase());
    rows
}

/// Clipboard text for the first `days` days (two periods per day).
pub fn forecast_text(panel: &Panel, days: usize) -> String {
    panel
        .blocks()
        .take(days * 2)
        .map(|(title, body)| format!("{}: {}", title, collapse_whitespace(body)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clipboard text for the alerts panel, `None` when it holds no alerts.
pub fn alerts_text(panel: &Panel) -> Option<String> {
    let blocks: Vec<String> = panel
        .blocks()
        .map(|(title, body)| collapse_whitespace(&format!("{} {}", title, body)))
        .filter(|text| !text.is_empty())
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
