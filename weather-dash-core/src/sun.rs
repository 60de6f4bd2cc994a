//! Sunrise/sunset timeline for today's forecast entry.

use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::model::ForecastDay;

const NIGHT_START_HOUR: f64 = 22.0;
const NIGHT_END_HOUR: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPeriod {
    Sunrise,
    GoldenHour,
    Sunset,
    Night,
    Day,
    Evening,
}

impl DayPeriod {
    pub fn glyph(&self) -> &'static str {
        match self {
            DayPeriod::Sunrise => "🌅",
            DayPeriod::GoldenHour => "✨",
            DayPeriod::Sunset => "🌇",
            DayPeriod::Night => "🌙",
            DayPeriod::Day => "☀️",
            DayPeriod::Evening => "🌆",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Sunrise => "Sunrise",
            DayPeriod::GoldenHour => "Golden Hour",
            DayPeriod::Sunset => "Sunset",
            DayPeriod::Night => "Night",
            DayPeriod::Day => "Day",
            DayPeriod::Evening => "Evening",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunTimeline {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    #[serde(skip)]
    pub day_length: TimeDelta,
    pub period: DayPeriod,
    /// How far `now` is through the daylight span, clamped to 0..=100.
    pub progress_pct: f64,
}

impl SunTimeline {
    pub fn day_length_label(&self) -> String {
        let minutes = self.day_length.num_minutes();
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// `"6:45 AM"`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn fractional_hour(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

pub fn day_period(now: NaiveTime, sunrise: NaiveTime, sunset: NaiveTime) -> DayPeriod {
    let now = fractional_hour(now);
    let rise = fractional_hour(sunrise);
    let set = fractional_hour(sunset);

    if now >= rise && now < rise + 1.0 {
        DayPeriod::Sunrise
    } else if now >= set - 1.0 && now < set {
        DayPeriod::GoldenHour
    } else if now >= set && now < set + 1.0 {
        DayPeriod::Sunset
    } else if !(NIGHT_END_HOUR..NIGHT_START_HOUR).contains(&now) {
        DayPeriod::Night
    } else if now < set {
        DayPeriod::Day
    } else {
        DayPeriod::Evening
    }
}

/// `None` when the day has no usable sunrise/sunset (polar day or night).
pub fn sun_timeline(today: &ForecastDay, now: NaiveTime) -> Option<SunTimeline> {
    let (sunrise, sunset) = (today.sunrise?, today.sunset?);
    if sunset <= sunrise {
        return None;
    }

    let day_length = sunset - sunrise;
    let span = fractional_hour(sunset) - fractional_hour(sunrise);
    let progress_pct = ((fractional_hour(now) - fractional_hour(sunrise)) / span * 100.0).clamp(0.0, 100.0);

    Some(SunTimeline {
        sunrise,
        sunset,
        day_length,
        period: day_period(now, sunrise, sunset),
        progress_pct,
    })
}
