//! Display formatting. Temperatures pick the pre-supplied value for the unit;
//! wind, precipitation and pressure are always metric.

use crate::model::DisplayUnit;

pub fn select_temperature(celsius: f64, fahrenheit: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => celsius,
        DisplayUnit::Fahrenheit => fahrenheit,
    }
}

pub fn format_temperature(celsius: f64, fahrenheit: f64, unit: DisplayUnit) -> String {
    format!("{}{}", select_temperature(celsius, fahrenheit, unit), unit.symbol())
}

/// Whole-degree variant for compact labels.
pub fn format_temperature_rounded(celsius: f64, fahrenheit: f64, unit: DisplayUnit) -> String {
    format!("{}{}", round_display(select_temperature(celsius, fahrenheit, unit)), unit.symbol())
}

pub fn format_wind(kph: f64) -> String {
    format!("{kph} km/h")
}

pub fn format_precipitation(mm: f64) -> String {
    format!("{mm} mm")
}

pub fn format_pressure(mb: f64) -> String {
    format!("{mb} mb")
}

pub fn format_humidity(pct: u8) -> String {
    format!("{pct}%")
}

/// Round to a whole number for display. `-0.4` would round to `-0.0`;
/// adding zero normalizes it so it prints as `0`.
pub fn round_display(value: f64) -> f64 {
    value.round() + 0.0
}
