//! One weather query: current conditions (required) then forecast (best effort).

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    error::FetchError,
    model::{CurrentConditions, Forecast, PlaceQuery},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub place: PlaceQuery,
    pub current: CurrentConditions,
    /// `None` when the forecast request failed; current conditions are still valid.
    pub forecast: Option<Forecast>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch current conditions, then the forecast, sequentially. A failed current
/// request fails the whole query; a failed forecast only drops the forecast.
/// Nothing is retried here.
pub async fn fetch_weather(
    provider: &dyn WeatherProvider,
    place: &PlaceQuery,
) -> Result<WeatherReport, FetchError> {
    let current = match provider.current(place).await {
        Ok(current) => current,
        Err(err) => {
            tracing::info!(%place, error = %err, "current conditions request failed");
            return Err(err);
        }
    };

    let forecast = match provider.forecast(place).await {
        Ok(days) => Some(days),
        Err(err) => {
            tracing::warn!(%place, error = %err, "forecast unavailable, showing current conditions only");
            None
        }
    };

    tracing::info!(
        %place,
        city = %current.city,
        forecast_days = forecast.as_ref().map_or(0, Vec::len),
        "weather query complete"
    );

    Ok(WeatherReport { place: place.clone(), current, forecast, fetched_at: Utc::now() })
}

/// Same as [`fetch_weather`], abandoned with [`FetchError::Cancelled`] once `cancel` fires.
pub async fn fetch_weather_cancellable(
    provider: &dyn WeatherProvider,
    place: &PlaceQuery,
    cancel: &CancellationToken,
) -> Result<WeatherReport, FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(%place, "weather query cancelled");
            Err(FetchError::Cancelled)
        }
        result = fetch_weather(provider, place) => result,
    }
}
