use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crate::application::weather_service::WeatherService;
use crate::domain::weather::WeatherSnapshot;
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState { pub service: WeatherService }

pub fn router(state: AppState) -> Router {
    Router::new().route("/weather", get(current_weather)).with_state(state)
}

#[derive(Deserialize)]
struct WeatherParams { lat: Option<String>, lon: Option<String> }

async fn current_weather(State(state): State<AppState>, Query(params): Query<WeatherParams>) -> Result<Json<WeatherSnapshot>, ApiError> {
    let snapshot = state
        .service
        .snapshot(params.lat.as_deref(), params.lon.as_deref())
        .await
        .map_err(|e| ApiError::from_service(e, "weather_unavailable"))?;
    Ok(Json(snapshot))
}
