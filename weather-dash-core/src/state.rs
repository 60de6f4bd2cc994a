//! Dashboard state as explicit snapshots, and the driver that feeds it.
//!
//! Overlapping queries: each query gets a [`QueryTicket`]; a result whose
//! ticket is not the latest one is dropped, and starting a query cancels the
//! previous one's token. The newest query always wins.

use chrono::NaiveTime;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    chart::{ForecastSeries, shape_forecast},
    error::{DashboardError, FetchError, LocateError},
    geolocation::{PositionSource, request_location},
    markers::{MarkerOptions, MarkerPlacement, place_markers},
    model::{CurrentConditions, DisplayUnit, Forecast, PlaceQuery},
    orchestrator::{WeatherReport, fetch_weather_cancellable},
    provider::WeatherProvider,
    sun::{SunTimeline, sun_timeline},
    theme::{ThemeDescriptor, select_theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub place: Option<PlaceQuery>,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<Forecast>,
    /// Forecast belongs to an earlier query because the latest forecast fetch failed.
    pub forecast_stale: bool,
    pub unit: DisplayUnit,
    pub loading: bool,
    /// Single message slot; a new error replaces the old one.
    pub error: Option<String>,
    latest: u64,
}

impl DashboardState {
    pub fn new(unit: DisplayUnit) -> Self {
        Self { unit, ..Self::default() }
    }

    pub fn begin_query(&self) -> (Self, QueryTicket) {
        let ticket = QueryTicket(self.latest + 1);
        let next = Self { loading: true, error: None, latest: ticket.0, ..self.clone() };
        (next, ticket)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn finish_query(&self, ticket: QueryTicket, result: Result<WeatherReport, FetchError>) -> Self {
        if !self.is_current(ticket) {
            tracing::debug!(?ticket, latest = self.latest, "dropping stale weather response");
            return self.clone();
        }

        match result {
            Ok(report) => {
                let (forecast, forecast_stale) = match report.forecast {
                    Some(days) => (Some(days), false),
                    None => (self.forecast.clone(), self.forecast.is_some()),
                };
                Self {
                    place: Some(report.place),
                    current: Some(report.current),
                    forecast,
                    forecast_stale,
                    loading: false,
                    error: None,
                    ..self.clone()
                }
            }
            // A superseded query cancelled itself; the newer one owns the slot.
            Err(FetchError::Cancelled) => self.clone(),
            Err(err) => self.with_error(err.into()),
        }
    }

    pub fn locate_failed(&self, err: LocateError) -> Self {
        self.with_error(err.into())
    }

    pub fn with_error(&self, err: DashboardError) -> Self {
        Self { loading: false, error: Some(err.to_string()), ..self.clone() }
    }

    pub fn with_unit(&self, unit: DisplayUnit) -> Self {
        Self { unit, ..self.clone() }
    }

    pub fn theme(&self, local_hour: u32) -> Option<ThemeDescriptor> {
        self.current.as_ref().map(|c| select_theme(&c.condition, local_hour))
    }

    pub fn series(&self) -> ForecastSeries {
        shape_forecast(self.forecast.as_deref().unwrap_or_default(), self.unit)
    }

    pub fn markers(&self, max_markers: usize) -> Vec<MarkerPlacement> {
        let Some(current) = &self.current else {
            return Vec::new();
        };
        let options = MarkerOptions { max_markers, unit: self.unit };
        place_markers(current.coordinates, current, self.forecast.as_deref().unwrap_or_default(), options)
    }

    pub fn sun(&self, now: NaiveTime) -> Option<SunTimeline> {
        self.forecast.as_ref()?.first().and_then(|today| sun_timeline(today, now))
    }
}

/// A started query: run it with [`PendingQuery::run`], then hand the result to
/// [`Dashboard::complete`].
#[derive(Debug)]
pub struct PendingQuery {
    pub ticket: QueryTicket,
    pub place: PlaceQuery,
    cancel: CancellationToken,
}

impl PendingQuery {
    pub async fn run(&self, provider: &dyn WeatherProvider) -> Result<WeatherReport, FetchError> {
        fetch_weather_cancellable(provider, &self.place, &self.cancel).await
    }
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    state: DashboardState,
    in_flight: Option<CancellationToken>,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, unit: DisplayUnit) -> Self {
        Self { provider, state: DashboardState::new(unit), in_flight: None }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Switch the display unit; derived views follow without a refetch.
    pub fn set_unit(&mut self, unit: DisplayUnit) {
        self.state = self.state.with_unit(unit);
    }

    /// Start a query, cancelling whatever was still in flight.
    pub fn begin(&mut self, place: PlaceQuery) -> PendingQuery {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        let (state, ticket) = self.state.begin_query();
        self.state = state;

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        PendingQuery { ticket, place, cancel }
    }

    pub fn complete(&mut self, ticket: QueryTicket, result: Result<WeatherReport, FetchError>) {
        if self.state.is_current(ticket) {
            self.in_flight = None;
        }
        self.state = self.state.finish_query(ticket, result);
    }

    /// Search for a typed place. Blank input only sets the error slot.
    pub async fn search(&mut self, raw: &str) -> &DashboardState {
        match PlaceQuery::new(raw) {
            Ok(place) => self.search_place(place).await,
            Err(err) => {
                self.state = self.state.with_error(err.into());
                &self.state
            }
        }
    }

    pub async fn search_place(&mut self, place: PlaceQuery) -> &DashboardState {
        let pending = self.begin(place);
        let result = pending.run(self.provider.as_ref()).await;
        self.complete(pending.ticket, result);
        &self.state
    }

    /// Resolve the user's position, then search for it. Nothing is fetched
    /// when the position cannot be resolved.
    pub async fn search_here(&mut self, source: &dyn PositionSource, timeout_ms: u64) -> &DashboardState {
        match request_location(source, timeout_ms).await.into_result() {
            Ok(coords) => self.search_place(PlaceQuery::from_coordinates(coords)).await,
            Err(err) => {
                self.state = self.state.locate_failed(err);
                &self.state
            }
        }
    }
}
