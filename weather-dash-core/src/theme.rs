//! Background theme derived from the condition text and the local hour.

use serde::Serialize;

use crate::classify::{IconCategory, classify};

/// Start of the daytime window (inclusive).
pub const DAY_START_HOUR: u32 = 6;
/// End of the daytime window (exclusive).
pub const DAY_END_HOUR: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backdrop {
    Sky,
    Overcast,
    Storm,
    Snow,
    Night,
}

impl Backdrop {
    pub fn gradient(&self) -> &'static str {
        match self {
            Backdrop::Sky => "linear-gradient(135deg, #74b9ff 0%, #0984e3 50%, #74b9ff 100%)",
            Backdrop::Overcast => "linear-gradient(135deg, #bdc3c7 0%, #95a5a6 50%, #7f8c8d 100%)",
            Backdrop::Storm | Backdrop::Night => {
                "linear-gradient(135deg, #2c3e50 0%, #34495e 50%, #2c3e50 100%)"
            }
            Backdrop::Snow => "linear-gradient(135deg, #ecf0f1 0%, #bdc3c7 50%, #95a5a6 100%)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backdrop::Sky => "sky",
            Backdrop::Overcast => "overcast",
            Backdrop::Storm => "storm",
            Backdrop::Snow => "snow",
            Backdrop::Night => "night",
        }
    }
}

/// Position of the sun/moon glyph, in percent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IconAnchor {
    pub top_pct: u8,
    pub left_pct: u8,
}

const ANCHOR: IconAnchor = IconAnchor { top_pct: 20, left_pct: 20 };

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ThemeDescriptor {
    pub category: IconCategory,
    pub daytime: bool,
    pub backdrop: Backdrop,
    pub overlay: &'static str,
    pub glyph: &'static str,
    pub anchor: IconAnchor,
}

pub fn is_daytime(local_hour: u32) -> bool {
    (DAY_START_HOUR..DAY_END_HOUR).contains(&(local_hour % 24))
}

pub fn select_theme(condition: &str, local_hour: u32) -> ThemeDescriptor {
    let category = classify(condition);
    let daytime = is_daytime(local_hour);

    let (backdrop, overlay, glyph) = match (category, daytime) {
        (IconCategory::Rain, _) => (Backdrop::Storm, "rgba(52, 73, 94, 0.3)", "🌧️"),
        (IconCategory::Thunderstorm, _) => (Backdrop::Storm, "rgba(52, 73, 94, 0.4)", "⛈️"),
        (IconCategory::Snow, _) => (Backdrop::Snow, "rgba(236, 240, 241, 0.3)", "❄️"),
        (IconCategory::Fog, _) => (Backdrop::Overcast, "rgba(189, 195, 199, 0.3)", "🌫️"),
        (IconCategory::Wind, _) => (Backdrop::Sky, "rgba(116, 185, 255, 0.2)", "💨"),
        (IconCategory::Clear, true) => (Backdrop::Sky, "rgba(116, 185, 255, 0.2)", "☀️"),
        (IconCategory::Cloudy, true) => (Backdrop::Overcast, "rgba(189, 195, 199, 0.3)", "☁️"),
        (IconCategory::PartlyCloudy | IconCategory::Unknown, true) => {
            (Backdrop::Sky, "rgba(116, 185, 255, 0.2)", "⛅")
        }
        (IconCategory::Cloudy, false) => (Backdrop::Night, "rgba(44, 62, 80, 0.4)", "☁️"),
        (_, false) => (Backdrop::Night, "rgba(44, 62, 80, 0.3)", "🌙"),
    };

    ThemeDescriptor { category, daytime, backdrop, overlay, glyph, anchor: ANCHOR }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_is_six_to_eighteen() {
        assert!(!is_daytime(5));
        assert!(is_daytime(6));
        assert!(is_daytime(17));
        assert!(!is_daytime(18));
        assert!(!is_daytime(0));
        assert!(is_daytime(30)); // wraps to 6
    }

    #[test]
    fn selection_is_deterministic() {
        assert_eq!(select_theme("Clear", 14), select_theme("Clear", 14));
    }

    #[test]
    fn clear_splits_day_and_night() {
        let day = select_theme("Clear", 14);
        let night = select_theme("Clear", 23);
        assert_eq!(day.backdrop, Backdrop::Sky);
        assert_eq!(day.glyph, "☀️");
        assert_eq!(night.backdrop, Backdrop::Night);
        assert_eq!(night.glyph, "🌙");
        assert!(day.daytime && !night.daytime);
    }

    #[test]
    fn cloudy_splits_day_and_night() {
        assert_eq!(select_theme("Overcast", 10).backdrop, Backdrop::Overcast);
        assert_eq!(select_theme("Overcast", 2).backdrop, Backdrop::Night);
    }

    #[test]
    fn weather_dominated_categories_ignore_the_hour() {
        for text in ["Heavy rain", "Thunderstorm", "Light snow", "Fog", "Windy"] {
            let day = select_theme(text, 12);
            let night = select_theme(text, 2);
            assert_eq!(day.backdrop, night.backdrop, "{text}");
            assert_eq!(day.overlay, night.overlay, "{text}");
            assert_eq!(day.glyph, night.glyph, "{text}");
        }
    }

    #[test]
    fn storm_theme_is_not_rain_theme() {
        let theme = select_theme("Patchy light rain with thunder", 12);
        assert_eq!(theme.category, IconCategory::Thunderstorm);
        assert_eq!(theme.glyph, "⛈️");
    }

    #[test]
    fn unknown_daytime_is_fair_weather() {
        let theme = select_theme("Volcanic ash", 9);
        assert_eq!(theme.glyph, "⛅");
        assert_eq!(theme.anchor, IconAnchor { top_pct: 20, left_pct: 20 });
    }
}
