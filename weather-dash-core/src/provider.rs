use crate::{
    Config,
    error::FetchError,
    model::{CurrentConditions, Forecast, PlaceQuery},
    provider::{dashboard::DashboardApiProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod dashboard;
pub mod weatherapi;

pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const MAX_FORECAST_DAYS: u8 = 14;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Dashboard,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Dashboard => "dashboard",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Dashboard, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "dashboard" => Ok(ProviderId::Dashboard),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: dashboard, weatherapi."
            )),
        }
    }
}

/// Upstream source of current conditions and forecasts, keyed by place.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, place: &PlaceQuery) -> Result<CurrentConditions, FetchError>;

    async fn forecast(&self, place: &PlaceQuery) -> Result<Forecast, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let days = config.forecast_days();

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Dashboard => {
            Box::new(DashboardApiProvider::new(config.backend_url())?.with_forecast_days(days))
        }
        ProviderId::WeatherApi => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `weather-dash configure {id}` or set WEATHER_API_KEY."
                )
            })?;
            let mut provider = WeatherApiProvider::new(api_key.to_owned())?.with_forecast_days(days);
            if let Some(base) = config.provider_config(id).and_then(|p| p.base_url.as_deref()) {
                provider = provider.with_base_url(base);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Out-of-range day counts fall back to the default week.
pub fn clamp_forecast_days(days: u8) -> u8 {
    if (1..=MAX_FORECAST_DAYS).contains(&days) { days } else { DEFAULT_FORECAST_DAYS }
}

pub(crate) fn http_client() -> reqwest::Result<Client> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Read a response, classifying non-2xx statuses. The body is parsed only on success.
pub(crate) async fn decode<T: DeserializeOwned>(
    res: Response,
    place: &PlaceQuery,
    is_not_found: fn(StatusCode, &str) -> bool,
) -> Result<T, FetchError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        if is_not_found(status, &body) {
            return Err(FetchError::NotFound { place: place.to_string() });
        }
        return Err(FetchError::ServerError { status: status.as_u16(), body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn weatherapi_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::WeatherApi, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn dashboard_needs_no_credentials() {
        let cfg = Config::default();
        assert!(default_provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn dashboard_rejects_unusable_base_url() {
        let mut cfg = Config::default();
        cfg.set_backend_url("not a url".to_string());
        let err = provider_from_config(ProviderId::Dashboard, &cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid backend URL"));
    }

    #[test]
    fn weatherapi_works_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());
        assert!(provider_from_config(ProviderId::WeatherApi, &cfg).is_ok());
    }

    #[test]
    fn forecast_days_fall_back_to_a_week() {
        assert_eq!(clamp_forecast_days(3), 3);
        assert_eq!(clamp_forecast_days(14), 14);
        assert_eq!(clamp_forecast_days(0), 7);
        assert_eq!(clamp_forecast_days(30), 7);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
