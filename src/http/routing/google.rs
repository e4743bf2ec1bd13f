//! Google sign-in redirect, callback, and today's calendar.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::application::error::ServiceError;
use crate::application::google_service::GoogleService;
use crate::config::Config;
use crate::domain::token::{TokenSet, TOKEN_COOKIE};
use crate::http::types::ApiError;

/// Short-lived cookie holding the CSRF `state` sent to Google.
pub const STATE_COOKIE: &str = "g_oauth_state";

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub post_auth_redirect: String,
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secure: !config.environment.is_development(),
            post_auth_redirect: config.post_auth_redirect.clone(),
        }
    }

    fn tokens(&self, tokens: &TokenSet) -> Result<Cookie<'static>, ApiError> {
        let value = tokens
            .to_cookie_value()
            .map_err(|source| ApiError::Store { code: "token_encoding_failed", source })?;
        Ok(Cookie::build((TOKEN_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(30))
            .build())
    }

    fn state(&self, state: String) -> Cookie<'static> {
        Cookie::build((STATE_COOKIE, state))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::minutes(10))
            .build()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: GoogleService,
    pub cookies: CookieSettings,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/google/auth", get(start_auth))
        .route("/google/callback", get(auth_callback))
        .route("/google/logout", post(logout))
        .route("/calendar", get(todays_calendar))
        .with_state(state)
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

async fn start_auth(State(state): State<AppState>, jar: CookieJar) -> Result<(CookieJar, Redirect), ApiError> {
    let csrf = uuid::Uuid::new_v4().to_string();
    let url = state
        .service
        .authorization_url(&csrf)
        .map_err(|e| ApiError::from_service(e, "auth_failed"))?;
    tracing::info!("redirecting to Google authorization");
    Ok((jar.add(state.cookies.state(csrf)), Redirect::temporary(&url)))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn auth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(error) = params.error {
        tracing::warn!(%error, "Google authorization denied");
        return Err(ApiError::BadRequest("oauth_denied"));
    }

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if expected.is_none() || expected != params.state {
        tracing::warn!("OAuth state mismatch");
        return Err(ApiError::BadRequest("invalid_state"));
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or(ApiError::BadRequest("code_required"))?;
    let tokens = state
        .service
        .complete_sign_in(&code)
        .await
        .map_err(|e| ApiError::from_service(e, "token_exchange_failed"))?;

    let jar = jar.remove(expired(STATE_COOKIE)).add(state.cookies.tokens(&tokens)?);
    Ok((jar, Redirect::temporary(&state.cookies.post_auth_redirect)))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (jar.remove(expired(TOKEN_COOKIE)), Json(json!({ "ok": true })))
}

/// 401 means the client should send the user through `/google/auth` again.
async fn todays_calendar(State(state): State<AppState>, jar: CookieJar) -> Response {
    let tokens = jar.get(TOKEN_COOKIE).and_then(|c| TokenSet::from_cookie_value(c.value()));
    match state.service.todays_events(tokens, Utc::now()).await {
        Ok(read) => {
            let jar = match read.refreshed.as_ref().map(|t| state.cookies.tokens(t)) {
                Some(Ok(cookie)) => jar.add(cookie),
                Some(Err(err)) => return err.into_response(),
                None => jar,
            };
            (jar, Json(json!({ "events": read.events }))).into_response()
        }
        Err(ServiceError::Unauthorized) => (jar.remove(expired(TOKEN_COOKIE)), ApiError::Unauthorized).into_response(),
        Err(err) => ApiError::from_service(err, "calendar_unavailable").into_response(),
    }
}
