//! Google OAuth token set carried in the `g_tokens` cookie.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const TOKEN_COOKIE: &str = "g_tokens";

/// Access tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Body of a successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenSet {
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_in.map(|secs| now + Duration::seconds(secs)),
            scope: response.scope,
            token_type: response.token_type,
        }
    }

    /// Apply a refresh response. Google usually omits the refresh token on
    /// refresh, in which case the current one stays valid.
    pub fn refreshed(&self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        let mut next = Self::from_response(response, now);
        if next.refresh_token.is_none() {
            next.refresh_token = self.refresh_token.clone();
        }
        next
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now + Duration::seconds(EXPIRY_SKEW_SECS))
    }

    pub fn to_cookie_value(&self) -> anyhow::Result<String> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
    }

    /// Decode a cookie value. Anything malformed reads as "no tokens".
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
        let tokens: TokenSet = serde_json::from_slice(&bytes).ok()?;
        (!tokens.access_token.trim().is_empty()).then_some(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap()
    }

    fn response(refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "ya29.access".into(),
            refresh_token: refresh.map(Into::into),
            expires_in: Some(3599),
            scope: Some("https://www.googleapis.com/auth/calendar.readonly".into()),
            token_type: Some("Bearer".into()),
        }
    }

    #[test]
    fn cookie_value_survives_encoding() {
        let tokens = TokenSet::from_response(response(Some("1//refresh")), now());
        let value = tokens.to_cookie_value().unwrap();
        assert!(!value.contains(';') && !value.contains('"') && !value.contains(','));
        assert_eq!(TokenSet::from_cookie_value(&value), Some(tokens));
    }

    #[test]
    fn malformed_or_empty_cookies_read_as_absent() {
        assert_eq!(TokenSet::from_cookie_value("not base64 !"), None);
        assert_eq!(TokenSet::from_cookie_value(&URL_SAFE_NO_PAD.encode(b"{}")), None);
        let blank = URL_SAFE_NO_PAD.encode(br#"{"access_token":"  "}"#);
        assert_eq!(TokenSet::from_cookie_value(&blank), None);
    }

    #[test]
    fn expiry_is_checked_with_skew() {
        let tokens = TokenSet::from_response(response(None), now());
        assert!(!tokens.needs_refresh(now()));
        assert!(tokens.needs_refresh(now() + Duration::seconds(3550)));

        let no_expiry = TokenSet { expires_at: None, ..tokens };
        assert!(!no_expiry.needs_refresh(now() + Duration::days(365)));
    }

    #[test]
    fn refresh_keeps_existing_refresh_token() {
        let tokens = TokenSet::from_response(response(Some("1//refresh")), now());
        let later = now() + Duration::hours(2);
        let next = tokens.refreshed(response(None), later);
        assert_eq!(next.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(next.expires_at, Some(later + Duration::seconds(3599)));

        let rotated = tokens.refreshed(response(Some("1//rotated")), later);
        assert_eq!(rotated.refresh_token.as_deref(), Some("1//rotated"));
    }
}
