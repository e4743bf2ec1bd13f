//! Forecast data as returned by Open-Meteo and the snapshot served to the dashboard.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Subset of the Open-Meteo `/v1/forecast` response the dashboard reads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Forecast {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CurrentWeather {
    pub temperature: Option<f64>,
    pub windspeed: Option<f64>,
    pub weathercode: Option<i32>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub source: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation_probability: u8,
    pub wind_speed: Option<f64>,
    pub weather_code: Option<i32>,
    pub timestamp: Option<String>,
}

impl WeatherSnapshot {
    /// Reduce a forecast to the dashboard payload as seen at `now`.
    ///
    /// Hourly timestamps are local to the forecast location, so `now` is shifted
    /// by the forecast's UTC offset before matching hour and day prefixes.
    pub fn from_forecast(forecast: &Forecast, at: Coordinates, now: DateTime<Utc>) -> Self {
        let offset = FixedOffset::east_opt(forecast.utc_offset_seconds).unwrap_or(Utc.fix());
        let local = now.with_timezone(&offset);
        let hour_prefix = local.format("%Y-%m-%dT%H").to_string();
        let day_prefix = local.format("%Y-%m-%d").to_string();

        let current = forecast.current_weather.clone().unwrap_or_default();
        let empty = HourlySeries::default();
        let hourly = forecast.hourly.as_ref().unwrap_or(&empty);

        let apparent_temperature = hourly
            .time
            .iter()
            .position(|t| t.starts_with(&hour_prefix))
            .and_then(|i| hourly.apparent_temperature.get(i).copied().flatten())
            .or(current.temperature);

        let peak = hourly
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| t.starts_with(&day_prefix))
            .map(|(i, _)| hourly.precipitation_probability.get(i).copied().flatten().unwrap_or(0.0))
            .fold(0.0_f64, f64::max);

        Self {
            source: "open-meteo",
            lat: at.lat,
            lon: at.lon,
            temperature: current.temperature,
            apparent_temperature,
            precipitation_probability: peak.round().clamp(0.0, 100.0) as u8,
            wind_speed: current.windspeed,
            weather_code: current.weathercode,
            timestamp: current.time,
        }
    }
}
