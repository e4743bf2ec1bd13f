//! Morning dashboard API: todos, news keywords, weather and Google Calendar
//! behind one JSON router.

pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;

use std::sync::Arc;

use axum::Router;

use crate::application::{
    google_service::GoogleService, keyword_service::KeywordServiceImpl, todo_service::TodoServiceImpl,
    weather_service::WeatherService,
};
use crate::config::Config;
use crate::domain::weather::Coordinates;
use crate::http::routing::{self, Dashboard};
use crate::infrastructure::{
    google::{CalendarClient, GoogleOAuthClient},
    open_meteo::OpenMeteoClient,
    sqlite_repo::{prepare_sqlite_file, SqliteStore},
};

/// Open the store, build the upstream clients and assemble the router.
pub async fn build_app(config: Config) -> anyhow::Result<Router> {
    prepare_sqlite_file(&config.database_url)?;
    let store = SqliteStore::connect(&config.database_url).await?;
    store.init().await?;

    let weather = WeatherService::new(
        OpenMeteoClient::new(config.weather.api_url.clone(), config.weather.cache_ttl)?,
        Coordinates { lat: config.weather.default_lat, lon: config.weather.default_lon },
    );
    let google = GoogleService::new(
        GoogleOAuthClient::new(config.google.clone())?,
        CalendarClient::new(config.google.calendar_api.clone())?,
    );

    Ok(routing::dashboard(Dashboard {
        todos: TodoServiceImpl::new(store.clone()),
        keywords: KeywordServiceImpl::new(store),
        weather,
        google,
        config: Arc::new(config),
    }))
}
