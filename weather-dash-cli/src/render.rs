//! Plain-text rendering of a dashboard snapshot.

use std::fmt::{self, Display, Formatter};

use chrono::{NaiveDateTime, Timelike};
use weather_dash_core::{
    DashboardState,
    chart::{ForecastSeries, day_label},
    classify,
    format::{
        format_humidity, format_precipitation, format_pressure, format_temperature, format_wind,
    },
    markers::{MarkerKind, MarkerPlacement},
    sun::{SunTimeline, format_clock},
    theme::ThemeDescriptor,
};

const BAR_WIDTH: usize = 30;
const NO_FORECAST: &str = "No forecast data available";

/// Everything the dashboard currently knows, as text. `now` is local wall-clock time.
pub struct DashboardView<'a> {
    pub state: &'a DashboardState,
    pub now: NaiveDateTime,
    pub max_markers: usize,
}

pub fn render_dashboard(state: &DashboardState, now: NaiveDateTime, max_markers: usize) -> String {
    DashboardView { state, now, max_markers }.to_string()
}

impl Display for DashboardView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state;

        if let Some(err) = &state.error {
            writeln!(f, "Error: {err}\n")?;
        }

        let Some(current) = &state.current else {
            return Ok(());
        };
        let unit = state.unit;

        if let Some(theme) = state.theme(self.now.hour()) {
            write_banner(f, &theme)?;
        }

        writeln!(f, "{}", current.place_label())?;
        if !current.region.is_empty() {
            writeln!(f, "  {}", current.region)?;
        }
        writeln!(
            f,
            "  {} {}  {}",
            classify(&current.condition).glyph(),
            format_temperature(current.temperature_c, current.temperature_f, unit),
            current.condition
        )?;
        writeln!(
            f,
            "  Feels like {}",
            format_temperature(current.feels_like_c, current.feels_like_f, unit)
        )?;
        writeln!(f, "  Humidity   {}", format_humidity(current.humidity_pct))?;
        writeln!(f, "  Wind       {}", format_wind(current.wind_kph))?;
        writeln!(f, "  Pressure   {}", format_pressure(current.pressure_mb))?;
        writeln!(f, "  UV index   {}", current.uv_index)?;
        if !current.last_updated.is_empty() {
            writeln!(f, "  Updated    {}", current.last_updated)?;
        }
        writeln!(f)?;

        if let Some(sun) = state.sun(self.now.time()) {
            write_sun_panel(f, &sun)?;
            writeln!(f)?;
        }

        let series = state.series();
        if series.is_empty() {
            writeln!(f, "{NO_FORECAST}")?;
        } else {
            if state.forecast_stale {
                writeln!(f, "(forecast from the previous search; the latest forecast could not be loaded)")?;
            }
            write_forecast_table(f, state)?;
            writeln!(f)?;
            write_temperature_chart(f, &series)?;
            writeln!(f)?;
            write_precipitation_chart(f, &series)?;
        }

        let markers = state.markers(self.max_markers);
        if !markers.is_empty() {
            writeln!(f)?;
            write_marker_list(f, &markers)?;
        }

        Ok(())
    }
}

fn write_banner(f: &mut Formatter<'_>, theme: &ThemeDescriptor) -> fmt::Result {
    writeln!(
        f,
        "{} {} {} ({})\n",
        theme.glyph,
        theme.backdrop.name(),
        if theme.daytime { "day" } else { "night" },
        theme.category.label()
    )
}

fn write_sun_panel(f: &mut Formatter<'_>, sun: &SunTimeline) -> fmt::Result {
    let filled = (((sun.progress_pct / 100.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    writeln!(
        f,
        "{} {}  sunrise {}  sunset {}  daylight {}",
        sun.period.glyph(),
        sun.period.label(),
        format_clock(sun.sunrise),
        format_clock(sun.sunset),
        sun.day_length_label(),
    )?;
    writeln!(f, "  [{}{}]", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

fn write_forecast_table(f: &mut Formatter<'_>, state: &DashboardState) -> fmt::Result {
    let unit = state.unit;
    writeln!(
        f,
        "{:<12} {:>8} {:>8} {:>9} {:>11}  Conditions",
        "Day", "High", "Low", "Precip", "Wind"
    )?;
    for day in state.forecast.as_deref().unwrap_or_default() {
        writeln!(
            f,
            "{:<12} {:>8} {:>8} {:>9} {:>11}  {} {}",
            day_label(day.date),
            format_temperature(day.max_temp_c, day.max_temp_f, unit),
            format_temperature(day.min_temp_c, day.min_temp_f, unit),
            format_precipitation(day.precipitation_mm),
            format_wind(day.max_wind_kph),
            classify(&day.condition).glyph(),
            day.condition
        )?;
    }
    Ok(())
}

/// Scale a value into `0..=BAR_WIDTH` over `[lo, hi]`.
fn bar_len(value: f64, lo: f64, hi: f64) -> usize {
    if hi - lo <= f64::EPSILON {
        return BAR_WIDTH;
    }
    (((value - lo) / (hi - lo)) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize
}

struct Bars<'a> {
    labels: &'a [String],
    values: &'a [f64],
    lo: f64,
    hi: f64,
    glyph: char,
    suffix: &'a str,
}

impl Bars<'_> {
    fn write(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (label, v) in self.labels.iter().zip(self.values) {
            let bar = self.glyph.to_string().repeat(bar_len(*v, self.lo, self.hi).max(1));
            writeln!(f, "  {label:<12} {bar} {v}{}", self.suffix)?;
        }
        Ok(())
    }
}

fn write_temperature_chart(f: &mut Formatter<'_>, series: &ForecastSeries) -> fmt::Result {
    let lo = series.lows.iter().copied().fold(f64::INFINITY, f64::min).min(0.0);
    let hi = series.highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let suffix = series.unit.symbol();

    writeln!(f, "{}", series.high_legend())?;
    Bars { labels: &series.labels, values: &series.highs, lo, hi, glyph: '█', suffix }.write(f)?;
    writeln!(f, "{}", series.low_legend())?;
    Bars { labels: &series.labels, values: &series.lows, lo, hi, glyph: '▒', suffix }.write(f)
}

fn write_precipitation_chart(f: &mut Formatter<'_>, series: &ForecastSeries) -> fmt::Result {
    let max_precip = series.precipitation.iter().copied().fold(0.0, f64::max);
    let max_wind = series.max_wind.iter().copied().fold(0.0, f64::max);

    writeln!(f, "Precipitation (mm)")?;
    Bars {
        labels: &series.labels,
        values: &series.precipitation,
        lo: 0.0,
        hi: max_precip,
        glyph: '▇',
        suffix: " mm",
    }
    .write(f)?;
    writeln!(f, "Max Wind (km/h)")?;
    Bars { labels: &series.labels, values: &series.max_wind, lo: 0.0, hi: max_wind, glyph: '░', suffix: " km/h" }
        .write(f)
}

fn write_marker_list(f: &mut Formatter<'_>, markers: &[MarkerPlacement]) -> fmt::Result {
    writeln!(f, "Map markers")?;
    for marker in markers {
        let kind = match marker.kind {
            MarkerKind::Current => "now".to_string(),
            MarkerKind::Forecast { day_index, .. } => format!("day {}", day_index + 1),
        };
        writeln!(
            f,
            "  [{kind:<6}] {:>9.4}, {:>9.4}  {}",
            marker.position.lat, marker.position.lon, marker.label
        )?;
    }
    Ok(())
}
