//! Error taxonomy surfaced to the dashboard's single message slot.

/// Failure of a weather query against the upstream service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("City not found or weather data unavailable")]
    NotFound { place: String },

    #[error("Weather service returned an error (HTTP {status})")]
    ServerError { status: u16, body: String },

    #[error("Failed to fetch weather data. Is the backend running? ({message})")]
    NetworkError { message: String },

    #[error("Weather service sent malformed data: {0}")]
    MalformedPayload(String),

    #[error("Weather request was cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::NetworkError { message: err.to_string() }
    }
}

/// Failure to resolve the user's position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("Location access was denied. Please search for a city manually.")]
    Denied,

    #[error("Your location is currently unavailable. Please search for a city manually.")]
    Unavailable,

    #[error("Locating you took too long. Please try again or search for a city manually.")]
    Timeout,

    #[error("Geolocation is not supported here. Please search for a city manually.")]
    Unsupported,

    #[error("Could not determine your location ({0}). Please search for a city manually.")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Please enter a city name or coordinates")]
    Empty,
}

/// Anything the dashboard can show in its error slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Query(#[from] QueryError),
}
