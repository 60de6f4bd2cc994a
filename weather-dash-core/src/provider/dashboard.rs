use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{CurrentConditions, CurrentPayload, Forecast, ForecastPayload, PlaceQuery},
    provider::{DEFAULT_FORECAST_DAYS, clamp_forecast_days, decode, http_client},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the dashboard backend, which serves
/// `/api/weather/current/{place}` and `/api/weather/forecast/{place}`.
#[derive(Debug, Clone)]
pub struct DashboardApiProvider {
    base_url: Url,
    forecast_days: u8,
    http: Client,
}

impl DashboardApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL '{base_url}'"))?;
        if parsed.cannot_be_a_base() {
            return Err(anyhow!("Invalid backend URL '{base_url}': it cannot carry a path"));
        }

        Ok(Self {
            base_url: parsed,
            forecast_days: DEFAULT_FORECAST_DAYS,
            http: http_client().context("Failed to build HTTP client")?,
        })
    }

    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = clamp_forecast_days(days);
        self
    }

    /// The place is pushed as one percent-encoded path segment.
    fn endpoint(&self, resource: &str, place: &PlaceQuery) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::NetworkError {
                message: format!("backend URL {} cannot carry a path", self.base_url),
            })?;
            segments.pop_if_empty().extend(["api", "weather", resource, place.as_str()]);
        }
        Ok(url)
    }
}

/// Marker the backend puts in `detail` when it has no data for a place.
const UNAVAILABLE_DETAIL: &str = "not available for";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: String,
}

// The backend reports an unknown place as a 400 wrapped into a 500, e.g.
// `{"detail":"Error fetching weather data: 400: Weather data not available for X"}`.
fn is_not_found(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
        return true;
    }
    status == StatusCode::INTERNAL_SERVER_ERROR
        && serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.detail.contains("400:") && b.detail.contains(UNAVAILABLE_DETAIL))
            .unwrap_or(false)
}

#[async_trait]
impl WeatherProvider for DashboardApiProvider {
    async fn current(&self, place: &PlaceQuery) -> Result<CurrentConditions, FetchError> {
        let url = self.endpoint("current", place)?;
        tracing::debug!(%url, "requesting current conditions");

        let res = self.http.get(url).send().await?;
        let payload: CurrentPayload = decode(res, place, is_not_found).await?;
        CurrentConditions::try_from(payload)
    }

    async fn forecast(&self, place: &PlaceQuery) -> Result<Forecast, FetchError> {
        let url = self.endpoint("forecast", place)?;
        tracing::debug!(%url, days = self.forecast_days, "requesting forecast");

        let res = self
            .http
            .get(url)
            .query(&[("days", self.forecast_days)])
            .send()
            .await?;
        let payload: ForecastPayload = decode(res, place, is_not_found).await?;
        Forecast::try_from(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_place_as_single_segment() {
        let provider = DashboardApiProvider::new("https://weather.example.com/").unwrap();
        let place = PlaceQuery::new("New York").unwrap();
        let url = provider.endpoint("current", &place).unwrap();
        assert_eq!(url.as_str(), "https://weather.example.com/api/weather/current/New%20York");
    }

    #[test]
    fn endpoint_keeps_coordinate_pairs() {
        let provider = DashboardApiProvider::new("http://localhost:8000").unwrap();
        let place = PlaceQuery::new("48.8566,2.3522").unwrap();
        let url = provider.endpoint("forecast", &place).unwrap();
        assert_eq!(url.path(), "/api/weather/forecast/48.8566,2.3522");
    }

    #[test]
    fn endpoint_escapes_slashes_in_place() {
        let provider = DashboardApiProvider::new("http://localhost:8000").unwrap();
        let place = PlaceQuery::new("a/b").unwrap();
        let url = provider.endpoint("current", &place).unwrap();
        assert_eq!(url.path(), "/api/weather/current/a%2Fb");
    }

    #[test]
    fn base_url_with_prefix_is_kept() {
        let provider = DashboardApiProvider::new("https://host.example/proxy").unwrap();
        let place = PlaceQuery::new("Oslo").unwrap();
        let url = provider.endpoint("current", &place).unwrap();
        assert_eq!(url.path(), "/proxy/api/weather/current/Oslo");
    }

    #[test]
    fn not_found_statuses() {
        assert!(is_not_found(StatusCode::NOT_FOUND, ""));
        assert!(is_not_found(StatusCode::BAD_REQUEST, ""));
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR, ""));
    }

    #[test]
    fn wrapped_unavailable_place_is_not_found() {
        let current = r#"{"detail":"Error fetching weather data: 400: Weather data not available for Nowhereville"}"#;
        let forecast = r#"{"detail":"Error fetching forecast: 400: Forecast not available for Nowhereville"}"#;
        assert!(is_not_found(StatusCode::INTERNAL_SERVER_ERROR, current));
        assert!(is_not_found(StatusCode::INTERNAL_SERVER_ERROR, forecast));
    }

    #[test]
    fn other_backend_failures_stay_server_errors() {
        let body = r#"{"detail":"Error fetching weather data: API key invalid"}"#;
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR, body));
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"));
        assert!(!is_not_found(StatusCode::BAD_GATEWAY, body));
    }

    #[test]
    fn forecast_days_are_clamped() {
        let provider = DashboardApiProvider::new(DEFAULT_BASE_URL).unwrap().with_forecast_days(40);
        assert_eq!(provider.forecast_days, 7);
    }
}
