//! Google OAuth2 and Calendar API clients.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::config::{ConfigError, GoogleConfig};
use crate::domain::calendar::CalendarEvent;
use crate::domain::token::{TokenResponse, TokenSet};

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum GoogleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Google rejected the grant or the access token.
    #[error("Google rejected the credentials: {0}")]
    Rejected(String),

    #[error("Google API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

struct Credentials<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleConfig) -> Result<Self, GoogleError> {
        Ok(Self { client: http_client()?, config })
    }

    fn credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        Ok(Credentials {
            client_id: self.config.client_id.as_deref().ok_or(ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            client_secret: self.config.client_secret.as_deref().ok_or(ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            redirect_uri: self.config.redirect_uri.as_deref().ok_or(ConfigError::Missing("GOOGLE_REDIRECT_URI"))?,
        })
    }

    /// Authorization URL for an offline, calendar read-only grant.
    pub fn build_auth_url(&self, state: &str) -> Result<String, ConfigError> {
        let creds = self.credentials()?;
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&include_granted_scopes=true&state={}",
            self.config.auth_url,
            urlencoding::encode(creds.client_id),
            urlencoding::encode(creds.redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code for tokens.
    #[instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str, now: DateTime<Utc>) -> Result<TokenSet, GoogleError> {
        let creds = self.credentials()?;
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", creds.client_id),
                ("client_secret", creds.client_secret),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", creds.redirect_uri),
            ])
            .send()
            .await?;
        let body: TokenResponse = token_response(response).await?;
        Ok(TokenSet::from_response(body, now))
    }

    /// Refresh an expired access token.
    #[instrument(skip(self, tokens), level = "info")]
    pub async fn refresh(&self, tokens: &TokenSet, now: DateTime<Utc>) -> Result<TokenSet, GoogleError> {
        let creds = self.credentials()?;
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| GoogleError::Rejected("no refresh token".to_string()))?;
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", creds.client_id),
                ("client_secret", creds.client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        let body = token_response(response).await?;
        Ok(tokens.refreshed(body, now))
    }
}

async fn token_response(response: reqwest::Response) -> Result<TokenResponse, GoogleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    // invalid_grant and friends come back as 400/401.
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
        Err(GoogleError::Rejected(body))
    } else {
        Err(GoogleError::Api { status, body })
    }
}

fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)).build()
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl EventTime {
    fn value(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        let all_day = event.start.as_ref().is_some_and(|s| s.date_time.is_none() && s.date.is_some());
        Self {
            id: event.id,
            summary: event.summary.unwrap_or_default(),
            start: event.start.and_then(EventTime::value).unwrap_or_default(),
            end: event.end.and_then(EventTime::value),
            all_day,
            location: event.location.filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GoogleError> {
        Ok(Self { client: http_client()?, base_url: base_url.into() })
    }

    /// Events on the primary calendar overlapping `[time_min, time_max)`, by start time.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, GoogleError> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", "50".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GoogleError::Rejected("access token rejected".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Api { status, body });
        }
        let list: EventList = response.json().await?;
        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }
}
