//! Domain types for places, readings and forecasts, plus the backend wire schema.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{FetchError, QueryError};

/// City name or `"lat,lon"` pair, passed to the upstream service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceQuery(String);

impl PlaceQuery {
    pub fn new(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Uses the shortest exact decimal form of each `f64`, so no precision is lost.
    pub fn from_coordinates(coords: Coordinates) -> Self {
        Self(format!("{},{}", coords.lat, coords.lon))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the query back into coordinates if it is a `"lat,lon"` pair.
    pub fn as_coordinates(&self) -> Option<Coordinates> {
        let (lat, lon) = self.0.split_once(',')?;
        let coords = Coordinates {
            lat: lat.trim().parse().ok()?,
            lon: lon.trim().parse().ok()?,
        };
        coords.is_valid().then_some(coords)
    }
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Temperature unit used for every temperature on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl DisplayUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "celsius",
            DisplayUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "°C",
            DisplayUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DisplayUnit::Celsius => DisplayUnit::Fahrenheit,
            DisplayUnit::Fahrenheit => DisplayUnit::Celsius,
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(DisplayUnit::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(DisplayUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// Current conditions for one place. Celsius/Fahrenheit pairs come from upstream
/// and are never derived from each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city: String,
    pub region: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
    pub condition: String,
    pub temperature_c: f64,
    pub temperature_f: f64,
    pub feels_like_c: f64,
    pub feels_like_f: f64,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub wind_degree: Option<f64>,
    pub pressure_mb: f64,
    pub uv_index: f64,
    pub last_updated: String,
}

impl CurrentConditions {
    /// Reject payloads that deserialized but cannot be rendered.
    pub fn validate(self) -> Result<Self, FetchError> {
        if self.city.trim().is_empty() {
            return Err(FetchError::MalformedPayload("missing city name".into()));
        }
        let readings = [
            ("temperature_c", self.temperature_c),
            ("temperature_f", self.temperature_f),
            ("feels_like_c", self.feels_like_c),
            ("feels_like_f", self.feels_like_f),
            ("wind_kph", self.wind_kph),
            ("pressure_mb", self.pressure_mb),
            ("uv_index", self.uv_index),
        ];
        ensure_finite(&readings)?;
        Ok(self)
    }

    pub fn place_label(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.country)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub max_temp_f: f64,
    pub min_temp_f: f64,
    pub condition: String,
    pub precipitation_mm: f64,
    pub max_wind_kph: f64,
    pub uv_index: f64,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
}

impl ForecastDay {
    pub fn validate(self) -> Result<Self, FetchError> {
        let readings = [
            ("max_temp_c", self.max_temp_c),
            ("min_temp_c", self.min_temp_c),
            ("max_temp_f", self.max_temp_f),
            ("min_temp_f", self.min_temp_f),
            ("precipitation_mm", self.precipitation_mm),
            ("max_wind_kph", self.max_wind_kph),
            ("uv_index", self.uv_index),
        ];
        ensure_finite(&readings)?;
        Ok(self)
    }
}

/// Chronological days; may be empty.
pub type Forecast = Vec<ForecastDay>;

fn ensure_finite(readings: &[(&str, f64)]) -> Result<(), FetchError> {
    match readings.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(FetchError::MalformedPayload(format!("{name} is not a number"))),
        None => Ok(()),
    }
}

pub(crate) fn humidity_from(raw: f64) -> Result<u8, FetchError> {
    if !(0.0..=100.0).contains(&raw) {
        return Err(FetchError::MalformedPayload(format!("humidity {raw} out of range")));
    }
    Ok(raw.round() as u8)
}

/// Upstream clock strings look like `"06:45 AM"`; polar days send `"No sunrise"`.
pub(crate) fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%I:%M %p", "%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

// Wire schema of the dashboard backend.

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentPayload {
    city: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    coordinates: Option<CoordinatesPayload>,
    current: CurrentReadings,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct CoordinatesPayload {
    #[serde(default)]
    lat: Option<serde_json::Value>,
    #[serde(default)]
    lon: Option<serde_json::Value>,
}

impl CoordinatesPayload {
    fn resolve(&self) -> Option<Coordinates> {
        let coords = Coordinates {
            lat: lenient_number(self.lat.as_ref()?)?,
            lon: lenient_number(self.lon.as_ref()?)?,
        };
        coords.is_valid().then_some(coords)
    }
}

fn lenient_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct CurrentReadings {
    temperature_c: f64,
    temperature_f: f64,
    condition: String,
    humidity: f64,
    wind_speed_kph: f64,
    #[serde(default)]
    wind_direction: Option<f64>,
    pressure_mb: f64,
    uv_index: f64,
    feels_like_c: f64,
    feels_like_f: f64,
}

impl TryFrom<CurrentPayload> for CurrentConditions {
    type Error = FetchError;

    fn try_from(p: CurrentPayload) -> Result<Self, Self::Error> {
        let coordinates = p.coordinates.as_ref().and_then(CoordinatesPayload::resolve);
        CurrentConditions {
            city: p.city,
            region: p.region,
            country: p.country,
            coordinates,
            condition: p.current.condition,
            temperature_c: p.current.temperature_c,
            temperature_f: p.current.temperature_f,
            feels_like_c: p.current.feels_like_c,
            feels_like_f: p.current.feels_like_f,
            humidity_pct: humidity_from(p.current.humidity)?,
            wind_kph: p.current.wind_speed_kph,
            wind_degree: p.current.wind_direction,
            pressure_mb: p.current.pressure_mb,
            uv_index: p.current.uv_index,
            last_updated: p.last_updated,
        }
        .validate()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastPayload {
    forecast: Vec<ForecastDayPayload>,
}

#[derive(Debug, Deserialize)]
struct ForecastDayPayload {
    date: NaiveDate,
    max_temp_c: f64,
    min_temp_c: f64,
    max_temp_f: f64,
    min_temp_f: f64,
    condition: String,
    precipitation_mm: f64,
    max_wind_kph: f64,
    #[serde(default)]
    uv_index: f64,
    #[serde(default)]
    sunrise: Option<String>,
    #[serde(default)]
    sunset: Option<String>,
}

impl TryFrom<ForecastPayload> for Forecast {
    type Error = FetchError;

    fn try_from(p: ForecastPayload) -> Result<Self, Self::Error> {
        p.forecast
            .into_iter()
            .map(|d| {
                ForecastDay {
                    date: d.date,
                    max_temp_c: d.max_temp_c,
                    min_temp_c: d.min_temp_c,
                    max_temp_f: d.max_temp_f,
                    min_temp_f: d.min_temp_f,
                    condition: d.condition,
                    precipitation_mm: d.precipitation_mm,
                    max_wind_kph: d.max_wind_kph,
                    uv_index: d.uv_index,
                    sunrise: d.sunrise.as_deref().and_then(parse_clock),
                    sunset: d.sunset.as_deref().and_then(parse_clock),
                }
                .validate()
            })
            .collect()
    }
}
