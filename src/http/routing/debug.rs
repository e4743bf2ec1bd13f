use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use crate::config::Config;
use crate::domain::token::TOKEN_COOKIE;
use crate::http::types::ApiError;

#[derive(Clone)]
pub struct AppState { pub config: Arc<Config> }

pub fn router(state: AppState) -> Router {
    Router::new().route("/debug/env", get(env_presence)).with_state(state)
}

/// Reports which secrets are configured, never their values. Development only.
async fn env_presence(State(state): State<AppState>, jar: CookieJar) -> Result<Json<Value>, ApiError> {
    let config = &state.config;
    if !config.environment.is_development() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(json!({
        "env": {
            "GOOGLE_CLIENT_ID": config.google.client_id.is_some(),
            "GOOGLE_CLIENT_SECRET": config.google.client_secret.is_some(),
            "GOOGLE_REDIRECT_URI": config.google.redirect_uri.is_some(),
            "NEWS_API_KEY": config.news_api_key.is_some(),
            "GEMINI_API_KEY": config.gemini_api_key.is_some(),
        },
        "hasTokensCookie": jar.get(TOKEN_COOKIE).is_some_and(|c| !c.value().is_empty()),
    })))
}
