//! Core library for the `weather-dash` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers and the query orchestrator
//! - Shared domain models and the pure view logic built on them
//!   (condition icons, themes, chart series, map markers, sun timeline)
//! - Geolocation normalization
//!
//! It is used by `weather-dash-cli`, but can also back other front ends.

pub mod chart;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod geolocation;
pub mod markers;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod state;
pub mod sun;
pub mod theme;

pub use classify::{IconCategory, classify};
pub use config::{Config, ProviderConfig};
pub use error::{DashboardError, FetchError, LocateError, QueryError};
pub use geolocation::{GeolocationOutcome, PositionSource, request_location};
pub use model::{Coordinates, CurrentConditions, DisplayUnit, Forecast, ForecastDay, PlaceQuery};
pub use orchestrator::{WeatherReport, fetch_weather};
pub use provider::{ProviderId, WeatherProvider};
pub use state::{Dashboard, DashboardState};
