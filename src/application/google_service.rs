//! Google sign-in and today's calendar, driven by the token cookie.

use chrono::{DateTime, Days, Local, TimeZone, Utc};

use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::calendar::CalendarEvent;
use crate::domain::token::TokenSet;
use crate::infrastructure::google::{CalendarClient, GoogleError, GoogleOAuthClient};

/// Events for today plus the token set to write back when it was refreshed.
#[derive(Debug)]
pub struct CalendarRead {
    pub events: Vec<CalendarEvent>,
    pub refreshed: Option<TokenSet>,
}

#[derive(Clone)]
pub struct GoogleService {
    oauth: GoogleOAuthClient,
    calendar: CalendarClient,
}

impl GoogleService {
    pub fn new(oauth: GoogleOAuthClient, calendar: CalendarClient) -> Self {
        Self { oauth, calendar }
    }

    pub fn authorization_url(&self, state: &str) -> ServiceResult<String> {
        Ok(self.oauth.build_auth_url(state)?)
    }

    pub async fn complete_sign_in(&self, code: &str) -> ServiceResult<TokenSet> {
        let tokens = self.oauth.exchange_code(code, Utc::now()).await.map_err(from_google)?;
        tracing::info!(has_refresh_token = tokens.refresh_token.is_some(), "google sign-in completed");
        Ok(tokens)
    }

    /// Reads today's events. Missing or unusable tokens are `Unauthorized`;
    /// an access token near expiry is refreshed once up front.
    pub async fn todays_events(&self, tokens: Option<TokenSet>, now: DateTime<Utc>) -> ServiceResult<CalendarRead> {
        let mut tokens = tokens.ok_or(ServiceError::Unauthorized)?;
        let mut refreshed = None;
        if tokens.needs_refresh(now) {
            if tokens.refresh_token.is_none() {
                return Err(ServiceError::Unauthorized);
            }
            tokens = self.oauth.refresh(&tokens, now).await.map_err(refresh_failed)?;
            tracing::info!("google access token refreshed");
            refreshed = Some(tokens.clone());
        }

        let (start, end) = local_day_bounds(now.with_timezone(&Local));
        let events = self
            .calendar
            .list_events(&tokens.access_token, start, end)
            .await
            .map_err(from_google)?;
        Ok(CalendarRead { events, refreshed })
    }
}

fn from_google(err: GoogleError) -> ServiceError {
    match err {
        GoogleError::Config(e) => ServiceError::Config(e),
        GoogleError::Rejected(reason) => {
            tracing::info!(%reason, "google credentials rejected");
            ServiceError::Unauthorized
        }
        other => {
            tracing::warn!(error = %other, "google request failed");
            ServiceError::Upstream(other.to_string())
        }
    }
}

/// A token that cannot be refreshed is dropped whatever the cause, so the
/// client signs in again instead of retrying with a stale cookie.
fn refresh_failed(err: GoogleError) -> ServiceError {
    match err {
        GoogleError::Config(e) => ServiceError::Config(e),
        other => {
            tracing::warn!(error = %other, "google token refresh failed");
            ServiceError::Unauthorized
        }
    }
}

/// Local midnight today and tomorrow, in UTC.
fn local_day_bounds<Tz: TimeZone>(now: DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let midnight = |day: chrono::NaiveDate| {
        let naive = day.and_time(chrono::NaiveTime::MIN);
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    };
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    (midnight(today), midnight(tomorrow))
}
