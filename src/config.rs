//! Application configuration loaded from environment variables.
//!
//! Google credentials are optional at startup: the OAuth routes report a
//! `ConfigError` when they are used without them.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LAT: f64 = 35.681236;
pub const DEFAULT_LON: f64 = 139.767125;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub weather: WeatherConfig,
    pub google: GoogleConfig,
    /// Where the browser lands after a successful Google sign-in.
    pub post_auth_redirect: String,
    pub news_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_url: String,
    pub default_lat: f64,
    pub default_lon: f64,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            environment: Environment::Development,
            weather: WeatherConfig {
                api_url: OPEN_METEO_URL.to_string(),
                default_lat: DEFAULT_LAT,
                default_lon: DEFAULT_LON,
                cache_ttl: Duration::from_secs(600),
            },
            google: GoogleConfig {
                client_id: Some("test_client_id".to_string()),
                client_secret: Some("test_secret".to_string()),
                redirect_uri: Some("http://localhost:3000/google/callback".to_string()),
                auth_url: GOOGLE_AUTH_URL.to_string(),
                token_url: GOOGLE_TOKEN_URL.to_string(),
                calendar_api: GOOGLE_CALENDAR_API.to_string(),
            },
            post_auth_redirect: "/".to_string(),
            news_api_key: None,
            gemini_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => return Err(ConfigError::Invalid { name: "APP_ENV", value: other.to_string() }),
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite://data.sqlite".to_string()),
            bind_addr: parse_or(var("BIND_ADDR"), "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            environment,
            weather: WeatherConfig {
                api_url: var("WEATHER_API_URL").unwrap_or_else(|| OPEN_METEO_URL.to_string()),
                default_lat: parse_or(var("WEATHER_DEFAULT_LAT"), "WEATHER_DEFAULT_LAT", DEFAULT_LAT)?,
                default_lon: parse_or(var("WEATHER_DEFAULT_LON"), "WEATHER_DEFAULT_LON", DEFAULT_LON)?,
                cache_ttl: Duration::from_secs(parse_or(var("WEATHER_CACHE_SECS"), "WEATHER_CACHE_SECS", 600)?),
            },
            google: GoogleConfig {
                client_id: var("GOOGLE_CLIENT_ID"),
                client_secret: var("GOOGLE_CLIENT_SECRET"),
                redirect_uri: var("GOOGLE_REDIRECT_URI"),
                auth_url: var("GOOGLE_AUTH_URL").unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
                token_url: var("GOOGLE_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
                calendar_api: var("GOOGLE_CALENDAR_API").unwrap_or_else(|| GOOGLE_CALENDAR_API.to_string()),
            },
            post_auth_redirect: var("POST_AUTH_REDIRECT").unwrap_or_else(|| "/".to_string()),
            news_api_key: var("NEWS_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, "sqlite://data.sqlite");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.weather.default_lat, DEFAULT_LAT);
        assert_eq!(config.weather.cache_ttl, Duration::from_secs(600));
        assert!(config.google.client_id.is_none());
        assert_eq!(config.post_auth_redirect, "/");
    }

    #[test]
    fn google_credentials_and_overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", " secret "),
            ("GOOGLE_REDIRECT_URI", ""),
            ("APP_ENV", "production"),
            ("WEATHER_DEFAULT_LAT", "51.5"),
        ]))
        .unwrap();
        assert_eq!(config.google.client_id.as_deref(), Some("id"));
        assert_eq!(config.google.client_secret.as_deref(), Some("secret"));
        assert!(config.google.redirect_uri.is_none());
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.weather.default_lat, 51.5);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("WEATHER_DEFAULT_LON", "east")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "WEATHER_DEFAULT_LON", .. }));

        let err = Config::from_lookup(lookup(&[("APP_ENV", "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "APP_ENV", .. }));
    }
}
