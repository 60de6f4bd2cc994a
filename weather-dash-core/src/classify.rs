//! Free-text condition → icon category.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCategory {
    Thunderstorm,
    Rain,
    Snow,
    Fog,
    Wind,
    PartlyCloudy,
    Cloudy,
    Clear,
    Unknown,
}

/// Checked top to bottom; first hit wins. Storm wording must stay ahead of rain,
/// and "partly cloudy" ahead of "cloudy".
const KEYWORDS: &[(&[&str], IconCategory)] = &[
    (&["thunder", "storm"], IconCategory::Thunderstorm),
    (&["rain", "drizzle", "shower"], IconCategory::Rain),
    (&["snow", "sleet", "blizzard"], IconCategory::Snow),
    (&["fog", "mist", "haze"], IconCategory::Fog),
    (&["windy", "breezy"], IconCategory::Wind),
    (&["partly cloudy", "partly-cloudy", "scattered"], IconCategory::PartlyCloudy),
    (&["cloudy", "overcast"], IconCategory::Cloudy),
    (&["sunny", "clear"], IconCategory::Clear),
];

pub fn classify(condition: &str) -> IconCategory {
    let lower = condition.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| lower.contains(w)))
        .map(|(_, category)| *category)
        .unwrap_or(IconCategory::Unknown)
}

impl IconCategory {
    pub fn glyph(&self) -> &'static str {
        match self {
            IconCategory::Thunderstorm => "⛈️",
            IconCategory::Rain => "🌧️",
            IconCategory::Snow => "❄️",
            IconCategory::Fog => "🌫️",
            IconCategory::Wind => "💨",
            IconCategory::PartlyCloudy => "⛅",
            IconCategory::Cloudy => "☁️",
            IconCategory::Clear => "☀️",
            IconCategory::Unknown => "🌤️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IconCategory::Thunderstorm => "thunderstorm",
            IconCategory::Rain => "rain",
            IconCategory::Snow => "snow",
            IconCategory::Fog => "fog",
            IconCategory::Wind => "wind",
            IconCategory::PartlyCloudy => "partly-cloudy",
            IconCategory::Cloudy => "cloudy",
            IconCategory::Clear => "clear",
            IconCategory::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_wins_over_rain() {
        for text in [
            "Thundery outbreaks possible",
            "Patchy light rain with thunder",
            "Moderate or heavy rain with thunder",
            "Rain storm",
            "THUNDERSTORM",
        ] {
            assert_eq!(classify(text), IconCategory::Thunderstorm, "{text}");
        }
    }

    #[test]
    fn partly_cloudy_is_not_plain_cloudy() {
        assert_eq!(classify("Partly cloudy"), IconCategory::PartlyCloudy);
        assert_eq!(classify("Scattered clouds"), IconCategory::PartlyCloudy);
        assert_eq!(classify("Cloudy"), IconCategory::Cloudy);
        assert_eq!(classify("Overcast"), IconCategory::Cloudy);
    }

    #[test]
    fn common_upstream_texts() {
        assert_eq!(classify("Patchy rain possible"), IconCategory::Rain);
        assert_eq!(classify("Light drizzle"), IconCategory::Rain);
        assert_eq!(classify("Light sleet"), IconCategory::Snow);
        assert_eq!(classify("Blizzard"), IconCategory::Snow);
        assert_eq!(classify("Freezing fog"), IconCategory::Fog);
        assert_eq!(classify("Mist"), IconCategory::Fog);
        assert_eq!(classify("Breezy"), IconCategory::Wind);
        assert_eq!(classify("Sunny"), IconCategory::Clear);
        assert_eq!(classify("Clear"), IconCategory::Clear);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify("sUnNy"), IconCategory::Clear);
        assert_eq!(classify("PARTLY CLOUDY"), IconCategory::PartlyCloudy);
    }

    #[test]
    fn unmatched_text_is_unknown() {
        assert_eq!(classify(""), IconCategory::Unknown);
        assert_eq!(classify("Volcanic ash"), IconCategory::Unknown);
        assert_eq!(IconCategory::Unknown.glyph(), "🌤️");
    }
}
