use chrono::Utc;

use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::weather::{Coordinates, WeatherSnapshot};
use crate::infrastructure::open_meteo::OpenMeteoClient;

#[derive(Clone)]
pub struct WeatherService {
    client: OpenMeteoClient,
    default_location: Coordinates,
}

impl WeatherService {
    pub fn new(client: OpenMeteoClient, default_location: Coordinates) -> Self {
        Self { client, default_location }
    }

    /// Snapshot for the requested coordinates, each falling back to the default location.
    pub async fn snapshot(&self, lat: Option<&str>, lon: Option<&str>) -> ServiceResult<WeatherSnapshot> {
        let at = resolve_coordinates(lat, lon, self.default_location)?;
        let forecast = self.client.forecast(at).await.map_err(|e| {
            tracing::warn!(error = %e, lat = at.lat, lon = at.lon, "weather fetch failed");
            ServiceError::Upstream(e.to_string())
        })?;
        Ok(WeatherSnapshot::from_forecast(&forecast, at, Utc::now()))
    }
}

/// Blank or missing values use the default; anything else must be a finite number.
pub fn resolve_coordinates(lat: Option<&str>, lon: Option<&str>, default: Coordinates) -> ServiceResult<Coordinates> {
    Ok(Coordinates {
        lat: parse_coordinate(lat, default.lat)?,
        lon: parse_coordinate(lon, default.lon)?,
    })
}

fn parse_coordinate(raw: Option<&str>, default: f64) -> ServiceResult<f64> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(ServiceError::Validation("invalid_coordinates")),
    }
}
