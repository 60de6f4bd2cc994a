//! Integration tests for the direct WeatherAPI.com provider using wiremock.

use weather_dash_core::{
    FetchError, PlaceQuery, WeatherProvider, fetch_weather,
    provider::weatherapi::WeatherApiProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> WeatherApiProvider {
    WeatherApiProvider::new("TEST_KEY".to_string())
        .unwrap()
        .with_base_url(&format!("{}/v1", server.uri()))
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "London", "region": "City of London, Greater London", "country": "United Kingdom",
            "lat": 51.52, "lon": -0.11, "tz_id": "Europe/London", "localtime": "2025-06-02 9:30"
        },
        "current": {
            "last_updated": "2025-06-02 09:15",
            "temp_c": 14.2, "temp_f": 57.6,
            "condition": { "text": "Light rain shower", "icon": "", "code": 1240 },
            "wind_kph": 17.3, "wind_degree": 250,
            "pressure_mb": 1011.0, "humidity": 77,
            "feelslike_c": 12.8, "feelslike_f": 55.0, "uv": 2.0
        }
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "location": { "name": "London", "region": "", "country": "United Kingdom" },
        "forecast": {
            "forecastday": [{
                "date": "2025-06-02",
                "day": {
                    "maxtemp_c": 18.0, "maxtemp_f": 64.4, "mintemp_c": 10.1, "mintemp_f": 50.2,
                    "maxwind_kph": 24.1, "totalprecip_mm": 4.2, "uv": 3.0,
                    "condition": { "text": "Patchy rain nearby", "icon": "", "code": 1063 }
                },
                "astro": { "sunrise": "04:45 AM", "sunset": "09:10 PM" }
            }]
        }
    })
}

#[tokio::test]
async fn test_current_and_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "TEST_KEY"))
        .and(query_param("q", "London"))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("q", "London"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let report = fetch_weather(&provider(&server), &PlaceQuery::new("London").unwrap())
        .await
        .unwrap();

    assert_eq!(report.current.place_label(), "London, United Kingdom");
    assert_eq!(report.current.humidity_pct, 77);
    assert_eq!(report.current.feels_like_f, 55.0);

    let forecast = report.forecast.unwrap();
    assert_eq!(forecast.len(), 1);
    assert_eq!(forecast[0].precipitation_mm, 4.2);
    assert!(forecast[0].sunset.is_some());
}

#[tokio::test]
async fn test_no_matching_location() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current(&PlaceQuery::new("Nowhereville").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn test_invalid_key_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current(&PlaceQuery::new("London").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::ServerError { status: 401, .. }), "{err:?}");
}
