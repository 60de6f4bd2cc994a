//! Shapes a forecast into the series the temperature and precipitation charts draw.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    format::select_temperature,
    model::{DisplayUnit, ForecastDay},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub unit: DisplayUnit,
    pub labels: Vec<String>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub max_wind: Vec<f64>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Renderers show "No forecast data available" instead of an empty chart.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn high_legend(&self) -> String {
        format!("Max Temperature ({})", self.unit.symbol())
    }

    pub fn low_legend(&self) -> String {
        format!("Min Temperature ({})", self.unit.symbol())
    }
}

/// `"Mon, Jan 6"`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

pub fn shape_forecast(days: &[ForecastDay], unit: DisplayUnit) -> ForecastSeries {
    ForecastSeries {
        unit,
        labels: days.iter().map(|d| day_label(d.date)).collect(),
        highs: days.iter().map(|d| select_temperature(d.max_temp_c, d.max_temp_f, unit)).collect(),
        lows: days.iter().map(|d| select_temperature(d.min_temp_c, d.min_temp_f, unit)).collect(),
        precipitation: days.iter().map(|d| d.precipitation_mm).collect(),
        max_wind: days.iter().map(|d| d.max_wind_kph).collect(),
    }
}
