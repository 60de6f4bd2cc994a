//! Normalizes a platform position source into a single [`GeolocationOutcome`].
//!
//! The position source itself (permission prompts, hardware, IP lookup) sits
//! behind [`PositionSource`]; this module only decides what its answer means.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{error::LocateError, model::Coordinates};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const IP_API_URL: &str = "https://ipapi.co/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub timeout: Duration,
    pub high_accuracy: bool,
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, high_accuracy: true, maximum_age: Duration::from_secs(5 * 60) }
    }
}

/// Error reported by a position source, with the platform's numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionError {
    pub code: u16,
    pub message: String,
}

impl PositionError {
    pub const PERMISSION_DENIED: u16 = 1;
    pub const POSITION_UNAVAILABLE: u16 = 2;
    pub const TIMEOUT: u16 = 3;

    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    fn is_supported(&self) -> bool {
        true
    }

    async fn permission(&self) -> PermissionState {
        PermissionState::Prompt
    }

    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationOutcome {
    Granted(Coordinates),
    Denied,
    Unavailable,
    TimedOut,
    NotSupported,
    /// Source reported a code outside the known set.
    Failed(String),
}

impl GeolocationOutcome {
    pub fn into_result(self) -> Result<Coordinates, LocateError> {
        match self {
            GeolocationOutcome::Granted(coords) => Ok(coords),
            GeolocationOutcome::Denied => Err(LocateError::Denied),
            GeolocationOutcome::Unavailable => Err(LocateError::Unavailable),
            GeolocationOutcome::TimedOut => Err(LocateError::Timeout),
            GeolocationOutcome::NotSupported => Err(LocateError::Unsupported),
            GeolocationOutcome::Failed(reason) => Err(LocateError::Failed(reason)),
        }
    }
}

impl From<PositionError> for GeolocationOutcome {
    fn from(err: PositionError) -> Self {
        match err.code {
            PositionError::PERMISSION_DENIED => GeolocationOutcome::Denied,
            PositionError::POSITION_UNAVAILABLE => GeolocationOutcome::Unavailable,
            PositionError::TIMEOUT => GeolocationOutcome::TimedOut,
            code => GeolocationOutcome::Failed(format!("code {code}: {}", err.message)),
        }
    }
}

/// Ask `source` for the current position, giving up after `timeout_ms`.
pub async fn request_location(source: &dyn PositionSource, timeout_ms: u64) -> GeolocationOutcome {
    if !source.is_supported() {
        tracing::debug!("position source {source:?} is not supported");
        return GeolocationOutcome::NotSupported;
    }

    if source.permission().await == PermissionState::Denied {
        tracing::debug!("location permission already denied");
        return GeolocationOutcome::Denied;
    }

    let timeout = Duration::from_millis(timeout_ms);
    let options = PositionOptions::with_timeout(timeout);

    let outcome = match tokio::time::timeout(timeout, source.current_position(&options)).await {
        Err(_elapsed) => GeolocationOutcome::TimedOut,
        Ok(Ok(coords)) if coords.is_valid() => GeolocationOutcome::Granted(coords),
        Ok(Ok(coords)) => {
            tracing::warn!(lat = coords.lat, lon = coords.lon, "position source returned invalid coordinates");
            GeolocationOutcome::Unavailable
        }
        Ok(Err(err)) => err.into(),
    };

    tracing::debug!(?outcome, "geolocation resolved");
    outcome
}

/// Coordinates pinned in the configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Coordinates);

#[async_trait]
impl PositionSource for FixedSource {
    async fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, PositionError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address (ipapi.co, no key needed).
#[derive(Debug, Clone)]
pub struct IpApiSource {
    url: String,
    http: Client,
}

impl IpApiSource {
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }
}

impl Default for IpApiSource {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[async_trait]
impl PositionSource for IpApiSource {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError> {
        let res = self
            .http
            .get(&self.url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                let code = if e.is_timeout() {
                    PositionError::TIMEOUT
                } else {
                    PositionError::POSITION_UNAVAILABLE
                };
                PositionError::new(code, e.to_string())
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(PositionError::new(
                PositionError::POSITION_UNAVAILABLE,
                format!("IP lookup failed with status {status}"),
            ));
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            PositionError::new(PositionError::POSITION_UNAVAILABLE, e.to_string())
        })?;

        if body.error {
            return Err(PositionError::new(
                PositionError::POSITION_UNAVAILABLE,
                body.reason.unwrap_or_else(|| "IP lookup reported an error".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(PositionError::new(
                PositionError::POSITION_UNAVAILABLE,
                "IP lookup returned no coordinates",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct FakeSource {
        supported: bool,
        permission: PermissionState,
        answer: Result<Coordinates, PositionError>,
        asked: AtomicBool,
    }

    impl FakeSource {
        fn answering(answer: Result<Coordinates, PositionError>) -> Self {
            Self { supported: true, permission: PermissionState::Prompt, answer, asked: AtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl PositionSource for FakeSource {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn permission(&self) -> PermissionState {
            self.permission
        }

        async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, PositionError> {
            self.asked.store(true, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[derive(Debug)]
    struct NeverAnswers;

    #[async_trait]
    impl PositionSource for NeverAnswers {
        async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, PositionError> {
            std::future::pending::<Result<Coordinates, PositionError>>().await
        }
    }

    #[tokio::test]
    async fn granted_keeps_full_precision() {
        let source = FakeSource::answering(Ok(Coordinates::new(51.507351, -0.127758)));
        let outcome = request_location(&source, 1_000).await;
        assert_eq!(outcome, GeolocationOutcome::Granted(Coordinates::new(51.507351, -0.127758)));
    }

    #[tokio::test]
    async fn platform_codes_map_to_distinct_outcomes() {
        let cases = [
            (PositionError::PERMISSION_DENIED, GeolocationOutcome::Denied),
            (PositionError::POSITION_UNAVAILABLE, GeolocationOutcome::Unavailable),
            (PositionError::TIMEOUT, GeolocationOutcome::TimedOut),
        ];
        for (code, expected) in cases {
            let source = FakeSource::answering(Err(PositionError::new(code, "nope")));
            assert_eq!(request_location(&source, 1_000).await, expected);
        }
    }

    #[tokio::test]
    async fn unknown_code_is_generic_failure() {
        let source = FakeSource::answering(Err(PositionError::new(42, "weird")));
        let outcome = request_location(&source, 1_000).await;
        assert!(matches!(outcome, GeolocationOutcome::Failed(ref msg) if msg.contains("42")));
    }

    #[tokio::test]
    async fn unsupported_source_is_never_asked() {
        let mut source = FakeSource::answering(Ok(Coordinates::new(1.0, 2.0)));
        source.supported = false;
        assert_eq!(request_location(&source, 1_000).await, GeolocationOutcome::NotSupported);
        assert!(!source.asked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn denied_permission_skips_position_request() {
        let mut source = FakeSource::answering(Ok(Coordinates::new(1.0, 2.0)));
        source.permission = PermissionState::Denied;
        assert_eq!(request_location(&source, 1_000).await, GeolocationOutcome::Denied);
        assert!(!source.asked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        assert_eq!(request_location(&NeverAnswers, 20).await, GeolocationOutcome::TimedOut);
    }

    #[tokio::test]
    async fn out_of_range_coordinates_are_unavailable() {
        let source = FakeSource::answering(Ok(Coordinates::new(123.0, 2.0)));
        assert_eq!(request_location(&source, 1_000).await, GeolocationOutcome::Unavailable);
    }

    #[tokio::test]
    async fn fixed_source_is_granted() {
        let source = FixedSource(Coordinates::new(59.3293, 18.0686));
        let coords = request_location(&source, 1_000).await.into_result().unwrap();
        assert_eq!(coords, Coordinates::new(59.3293, 18.0686));
    }

    #[test]
    fn outcomes_map_to_locate_errors() {
        assert_eq!(GeolocationOutcome::Denied.into_result(), Err(LocateError::Denied));
        assert_eq!(GeolocationOutcome::TimedOut.into_result(), Err(LocateError::Timeout));
        assert_eq!(GeolocationOutcome::NotSupported.into_result(), Err(LocateError::Unsupported));
        assert_eq!(GeolocationOutcome::Unavailable.into_result(), Err(LocateError::Unavailable));
    }
}
