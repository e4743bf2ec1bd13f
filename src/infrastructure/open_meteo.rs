//! Open-Meteo forecast client with a short in-process freshness window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::weather::{Coordinates, Forecast};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,precipitation_probability,weathercode";

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("forecast API returned {0}")]
    Status(reqwest::StatusCode),
}

/// Exact bit patterns of the requested coordinates.
type CacheKey = (u64, u64);

#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    ttl: Duration,
    cache: Arc<RwLock<HashMap<CacheKey, (Instant, Forecast)>>>,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, ttl: Duration) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base_url: base_url.into(), ttl, cache: Arc::default() })
    }

    /// Fetch today's forecast, served from cache while younger than the TTL.
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(&self, at: Coordinates) -> Result<Forecast, ForecastError> {
        let key = cache_key(at);
        if let Some((fetched, forecast)) = self.cache.read().await.get(&key) {
            if fetched.elapsed() < self.ttl {
                tracing::debug!(lat = at.lat, lon = at.lon, "forecast cache hit");
                return Ok(forecast.clone());
            }
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("current_weather", "true".to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForecastError::Status(response.status()));
        }
        let forecast: Forecast = response.json().await?;

        let mut cache = self.cache.write().await;
        cache.retain(|_, (fetched, _)| fetched.elapsed() < self.ttl);
        cache.insert(key, (Instant::now(), forecast.clone()));
        Ok(forecast)
    }
}

fn cache_key(at: Coordinates) -> CacheKey {
    (at.lat.to_bits(), at.lon.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HERE: Coordinates = Coordinates { lat: 35.681236, lon: 139.767125 };

    fn body() -> serde_json::Value {
        serde_json::json!({
            "utc_offset_seconds": 32400,
            "current_weather": { "temperature": 18.2, "windspeed": 4.0, "weathercode": 1, "time": "2024-05-01T08:00" },
            "hourly": {
                "time": ["2024-05-01T08:00"],
                "temperature_2m": [18.2],
                "apparent_temperature": [17.0],
                "precipitation_probability": [30],
                "weathercode": [1]
            }
        })
    }

    #[tokio::test]
    async fn fetches_and_caches_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(format!("{}/v1/forecast", server.uri()), Duration::from_secs(600)).unwrap();
        let first = client.forecast(HERE).await.unwrap();
        let second = client.forecast(HERE).await.unwrap();
        assert_eq!(first.utc_offset_seconds, 32400);
        assert_eq!(second.current_weather.and_then(|c| c.temperature), Some(18.2));
        assert_eq!(first.hourly.unwrap().precipitation_probability, vec![Some(30.0)]);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(server.uri(), Duration::ZERO).unwrap();
        client.forecast(HERE).await.unwrap();
        client.forecast(HERE).await.unwrap();
    }

    #[tokio::test]
    async fn nearby_coordinates_are_cached_separately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(server.uri(), Duration::from_secs(600)).unwrap();
        client.forecast(HERE).await.unwrap();
        client.forecast(Coordinates { lat: HERE.lat + 0.00001, lon: HERE.lon }).await.unwrap();
        client.forecast(HERE).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = OpenMeteoClient::new(server.uri(), Duration::from_secs(600)).unwrap();
        let err = client.forecast(HERE).await.unwrap_err();
        assert!(matches!(err, ForecastError::Status(s) if s.as_u16() == 503));
    }
}
