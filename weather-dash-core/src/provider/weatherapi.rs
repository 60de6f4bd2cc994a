use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{
        Coordinates, CurrentConditions, Forecast, ForecastDay, PlaceQuery, humidity_from,
        parse_clock,
    },
    provider::{DEFAULT_FORECAST_DAYS, clamp_forecast_days, decode, http_client},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com error code for "No matching location found."
const NO_MATCHING_LOCATION: u32 = 1006;

/// Direct WeatherAPI.com client, for running the dashboard without its backend.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    forecast_days: u8,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            http: http_client().context("Failed to build HTTP client")?,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = clamp_forecast_days(days);
        self
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url)
    }
}

fn is_not_found(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    status == StatusCode::BAD_REQUEST
        && serde_json::from_str::<WaErrorBody>(body)
            .map(|b| b.error.code == NO_MATCHING_LOCATION)
            .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl WaLocation {
    fn coordinates(&self) -> Option<Coordinates> {
        let coords = Coordinates::new(self.lat?, self.lon?);
        coords.is_valid().then_some(coords)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    feelslike_f: f64,
    humidity: f64,
    wind_kph: f64,
    #[serde(default)]
    wind_degree: Option<f64>,
    pressure_mb: f64,
    uv: f64,
    condition: WaCondition,
    #[serde(default)]
    last_updated: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    maxtemp_f: f64,
    mintemp_f: f64,
    totalprecip_mm: f64,
    maxwind_kph: f64,
    #[serde(default)]
    uv: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    #[serde(default)]
    sunrise: String,
    #[serde(default)]
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    astro: Option<WaAstro>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

impl TryFrom<WaCurrentResponse> for CurrentConditions {
    type Error = FetchError;

    fn try_from(r: WaCurrentResponse) -> Result<Self, Self::Error> {
        let coordinates = r.location.coordinates();
        CurrentConditions {
            city: r.location.name,
            region: r.location.region,
            country: r.location.country,
            coordinates,
            condition: r.current.condition.text,
            temperature_c: r.current.temp_c,
            temperature_f: r.current.temp_f,
            feels_like_c: r.current.feelslike_c,
            feels_like_f: r.current.feelslike_f,
            humidity_pct: humidity_from(r.current.humidity)?,
            wind_kph: r.current.wind_kph,
            wind_degree: r.current.wind_degree,
            pressure_mb: r.current.pressure_mb,
            uv_index: r.current.uv,
            last_updated: r.current.last_updated,
        }
        .validate()
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(d: WaForecastDay) -> Self {
        let (sunrise, sunset) = match &d.astro {
            Some(astro) => (parse_clock(&astro.sunrise), parse_clock(&astro.sunset)),
            None => (None, None),
        };
        ForecastDay {
            date: d.date,
            max_temp_c: d.day.maxtemp_c,
            min_temp_c: d.day.mintemp_c,
            max_temp_f: d.day.maxtemp_f,
            min_temp_f: d.day.mintemp_f,
            condition: d.day.condition.text,
            precipitation_mm: d.day.totalprecip_mm,
            max_wind_kph: d.day.maxwind_kph,
            uv_index: d.day.uv,
            sunrise,
            sunset,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, place: &PlaceQuery) -> Result<CurrentConditions, FetchError> {
        tracing::debug!(%place, "requesting WeatherAPI current.json");

        let res = self
            .http
            .get(self.url("current.json"))
            .query(&[("key", self.api_key.as_str()), ("q", place.as_str()), ("aqi", "no")])
            .send()
            .await?;

        let parsed: WaCurrentResponse = decode(res, place, is_not_found).await?;
        CurrentConditions::try_from(parsed)
    }

    async fn forecast(&self, place: &PlaceQuery) -> Result<Forecast, FetchError> {
        tracing::debug!(%place, days = self.forecast_days, "requesting WeatherAPI forecast.json");

        let days = self.forecast_days.to_string();
        let res = self
            .http
            .get(self.url("forecast.json"))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", place.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
            ])
            .send()
            .await?;

        let parsed: WaForecastResponse = decode(res, place, is_not_found).await?;
        parsed
            .forecast
            .forecastday
            .into_iter()
            .map(|d| ForecastDay::from(d).validate())
            .collect()
    }
}
