use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_dash_core::{
    Config, Dashboard, DisplayUnit, PositionSource, ProviderId, WeatherProvider, request_location,
    geolocation::{FixedSource, IpApiSource},
    provider::{dashboard::DEFAULT_BASE_URL, provider_from_config},
};

use crate::render::render_dashboard;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider and make it the default.
    Configure {
        /// Provider short name, "dashboard" or "weatherapi".
        provider: String,
    },

    /// Show current conditions and the forecast for a place.
    Show {
        /// City name or "lat,lon". Omit to use your current location.
        place: Option<String>,

        /// Resolve your location instead of searching for a place.
        #[arg(long, conflicts_with = "place")]
        here: bool,

        /// Temperature unit: celsius or fahrenheit.
        #[arg(long)]
        unit: Option<String>,

        /// Provider to query instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Number of forecast markers to place on the map.
        #[arg(long)]
        markers: Option<usize>,
    },

    /// Resolve and print your current coordinates.
    Locate {
        /// Give up after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { place, here, unit, provider, markers } => {
                show(place, here, unit, provider, markers).await
            }
            Command::Locate { timeout_ms } => locate(timeout_ms).await,
        }
    }
}

fn position_source(config: &Config) -> Box<dyn PositionSource> {
    match config.location {
        Some(coords) => Box::new(FixedSource(coords)),
        None => Box::new(IpApiSource::new()),
    }
}

fn configure(provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    match id {
        ProviderId::Dashboard => {
            let url = Text::new("Backend URL:")
                .with_default(config.backend_url())
                .with_help_message(&format!("Default: {DEFAULT_BASE_URL}"))
                .prompt()
                .context("Failed to read backend URL")?;
            config.set_backend_url(url.trim().to_string());
        }
        ProviderId::WeatherApi => {
            let key = Password::new("WeatherAPI.com API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            let key = key.trim();
            if key.is_empty() {
                bail!("API key must not be empty");
            }
            config.upsert_provider_api_key(id, key.to_string());
        }
    }

    let units = vec![DisplayUnit::Fahrenheit, DisplayUnit::Celsius];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read temperature unit")?;

    config.set_default_provider(id);

    // Fail before writing a config that can't produce a provider.
    provider_from_config(id, &config)?;
    config.save()?;

    println!("Saved {id} as the default provider in {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    place: Option<String>,
    here: bool,
    unit: Option<String>,
    provider: Option<String>,
    markers: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;

    let id = match provider.as_deref() {
        Some(p) => ProviderId::try_from(p)?,
        None => config.default_provider_id()?,
    };
    let unit = match unit.as_deref() {
        Some(u) => u.parse::<DisplayUnit>()?,
        None => config.unit,
    };
    let max_markers = markers.unwrap_or(config.max_forecast_markers);

    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(id, &config)?);
    let mut dashboard = Dashboard::new(provider, unit);

    tracing::info!(provider = %id, %unit, "showing weather");

    let state = match place {
        Some(place) if !here => dashboard.search(&place).await,
        _ => {
            let source = position_source(&config);
            dashboard.search_here(source.as_ref(), config.geolocation_timeout_ms).await
        }
    };

    if state.current.is_none() {
        match &state.error {
            Some(err) => bail!("{err}"),
            None => bail!("No weather data received"),
        }
    }

    print!("{}", render_dashboard(state, chrono::Local::now().naive_local(), max_markers));
    Ok(())
}

async fn locate(timeout_ms: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let timeout_ms = timeout_ms.unwrap_or(config.geolocation_timeout_ms);
    let source = position_source(&config);

    let coords = request_location(source.as_ref(), timeout_ms).await.into_result()?;
    println!("{:.4},{:.4}", coords.lat, coords.lon);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_place_and_flags() {
        let cli = Cli::try_parse_from([
            "weather-dash", "show", "Paris", "--unit", "celsius", "--provider", "weatherapi", "--markers", "2",
        ])
        .unwrap();

        match cli.command {
            Command::Show { place, here, unit, provider, markers } => {
                assert_eq!(place.as_deref(), Some("Paris"));
                assert!(!here);
                assert_eq!(unit.as_deref(), Some("celsius"));
                assert_eq!(provider.as_deref(), Some("weatherapi"));
                assert_eq!(markers, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn here_conflicts_with_place() {
        assert!(Cli::try_parse_from(["weather-dash", "show", "Paris", "--here"]).is_err());
        assert!(Cli::try_parse_from(["weather-dash", "show", "--here"]).is_ok());
    }

    #[test]
    fn parses_locate_timeout() {
        let cli = Cli::try_parse_from(["weather-dash", "locate", "--timeout-ms", "2500"]).unwrap();
        assert!(matches!(cli.command, Command::Locate { timeout_ms: Some(2500) }));
    }

    #[test]
    fn configure_requires_provider() {
        assert!(Cli::try_parse_from(["weather-dash", "configure"]).is_err());
    }

    #[test]
    fn fixed_location_is_preferred_over_ip_lookup() {
        let config = Config {
            location: Some(weather_dash_core::Coordinates::new(1.0, 2.0)),
            ..Config::default()
        };
        assert!(format!("{:?}", position_source(&config)).contains("FixedSource"));
        assert!(format!("{:?}", position_source(&Config::default())).contains("IpApiSource"));
    }
}
