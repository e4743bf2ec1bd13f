mod common;

use common::{app, app_with, json_body, request, test_config};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn proxies_and_reshapes_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5"))
        .and(query_param("longitude", "-0.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "utc_offset_seconds": 0,
            "current_weather": { "temperature": 14.0, "windspeed": 9.5, "weathercode": 3, "time": "2024-05-01T08:00" },
            "hourly": { "time": [], "apparent_temperature": [], "precipitation_probability": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.weather.api_url = format!("{}/v1/forecast", server.uri());
    let app = app_with(config).await;

    let res = request(&app, "GET", "/weather?lat=51.5&lon=-0.12", None).await;
    assert_eq!(res.status(), 200);
    let body = json_body(res).await;
    assert_eq!(body["source"], "open-meteo");
    assert_eq!(body["lat"], 51.5);
    assert_eq!(body["temperature"], 14.0);
    // No hourly samples: apparent falls back to current, precipitation is zero.
    assert_eq!(body["apparentTemperature"], 14.0);
    assert_eq!(body["precipitationProbability"], 0);
    assert_eq!(body["windSpeed"], 9.5);
    assert_eq!(body["weatherCode"], 3);
    assert_eq!(body["timestamp"], "2024-05-01T08:00");

    // Second call within the freshness window is served from cache.
    let res = request(&app, "GET", "/weather?lat=51.5&lon=-0.12", None).await;
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn default_location_is_used_without_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("latitude", "35.681236"))
        .and(query_param("longitude", "139.767125"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "current_weather": { "temperature": 20.0 } })))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.weather.api_url = server.uri();
    let app = app_with(config).await;

    let res = request(&app, "GET", "/weather", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json_body(res).await["lon"], 139.767125);
}

#[tokio::test]
async fn non_numeric_coordinates_are_rejected() {
    let app = app().await;
    let res = request(&app, "GET", "/weather?lat=north&lon=10", None).await;
    assert_eq!(res.status(), 400);
    assert_eq!(json_body(res).await, json!({ "error": "invalid_coordinates" }));
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let app = app().await;
    let res = request(&app, "GET", "/weather?lat=200&lon=10", None).await;
    assert_eq!(res.status(), 502);
    assert_eq!(json_body(res).await, json!({ "error": "weather_unavailable" }));
}

#[tokio::test]
async fn upstream_error_status_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.weather.api_url = server.uri();
    let app = app_with(config).await;

    let res = request(&app, "GET", "/weather", None).await;
    assert_eq!(res.status(), 502);
}
