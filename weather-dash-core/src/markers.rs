//! Map marker placement: one marker for current conditions plus a few
//! forecast markers stacked just north of it so they stay visually distinct.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    chart::day_label,
    classify::classify,
    format::{
        format_humidity, format_precipitation, format_temperature, format_temperature_rounded,
        format_wind, round_display, select_temperature,
    },
    model::{Coordinates, CurrentConditions, DisplayUnit, ForecastDay},
};

pub const DEFAULT_MAX_MARKERS: usize = 3;

/// Latitude step between stacked forecast markers. Not a geographic projection.
pub const MARKER_LAT_OFFSET: f64 = 0.01;

/// Used when the upstream payload carries no usable coordinates (New York City).
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(40.7128, -74.0060);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerOptions {
    pub max_markers: usize,
    pub unit: DisplayUnit,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self { max_markers: DEFAULT_MAX_MARKERS, unit: DisplayUnit::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerKind {
    Current,
    Forecast { day_index: usize, date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub position: Coordinates,
    pub kind: MarkerKind,
    /// Short text drawn on the marker itself.
    pub label: String,
    pub popup: String,
}

pub fn resolve_center(center: Option<Coordinates>) -> Coordinates {
    center.filter(Coordinates::is_valid).unwrap_or(DEFAULT_CENTER)
}

pub fn place_markers(
    center: Option<Coordinates>,
    current: &CurrentConditions,
    forecast: &[ForecastDay],
    options: MarkerOptions,
) -> Vec<MarkerPlacement> {
    let center = resolve_center(center);
    let unit = options.unit;

    let primary = MarkerPlacement {
        position: center,
        kind: MarkerKind::Current,
        label: format!(
            "{} {}",
            format_temperature_rounded(current.temperature_c, current.temperature_f, unit),
            classify(&current.condition).glyph()
        ),
        popup: current_popup(current, unit),
    };

    let forecast_markers = forecast.iter().take(options.max_markers).enumerate().map(|(i, day)| {
        let k = (i + 1) as f64;
        MarkerPlacement {
            position: Coordinates::new(center.lat + k * MARKER_LAT_OFFSET, center.lon),
            kind: MarkerKind::Forecast { day_index: i, date: day.date },
            label: format!(
                "{} {}° {}",
                day.date.format("%a"),
                round_display(select_temperature(day.max_temp_c, day.max_temp_f, unit)),
                classify(&day.condition).glyph()
            ),
            popup: forecast_popup(day, unit),
        }
    });

    std::iter::once(primary).chain(forecast_markers).collect()
}

fn current_popup(current: &CurrentConditions, unit: DisplayUnit) -> String {
    [
        current.place_label(),
        format!(
            "{} {}",
            format_temperature(current.temperature_c, current.temperature_f, unit),
            classify(&current.condition).glyph()
        ),
        current.condition.clone(),
        format!("Humidity: {}", format_humidity(current.humidity_pct)),
        format!("Wind: {}", format_wind(current.wind_kph)),
        format!(
            "Feels like: {}",
            format_temperature(current.feels_like_c, current.feels_like_f, unit)
        ),
    ]
    .join("\n")
}

fn forecast_popup(day: &ForecastDay, unit: DisplayUnit) -> String {
    [
        day_label(day.date),
        format!(
            "High: {} / Low: {}",
            format_temperature(day.max_temp_c, day.max_temp_f, unit),
            format_temperature(day.min_temp_c, day.min_temp_f, unit)
        ),
        format!("{} {}", classify(&day.condition).glyph(), day.condition),
        format!("Precipitation: {}", format_precipitation(day.precipitation_mm)),
        format!("Wind: {}", format_wind(day.max_wind_kph)),
        format!("UV: {}", day.uv_index),
    ]
    .join("\n")
}
