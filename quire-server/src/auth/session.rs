//! Session cookie handling
//!
//! The cookie carries only the opaque session key; who is logged in lives in
//! the `sessions` table.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use quire_core::config::SessionConfig;

/// How session cookies are named and issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_hours: i64,
    pub secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            ttl_hours: config.ttl_hours,
            secure: config.secure,
        }
    }
}

impl SessionSettings {
    /// Session lifetime for the database row.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    /// Session key sent by the client, if any.
    pub fn read_key(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.cookie_name && !c.value().is_empty())
            .map(|c| c.value().to_owned())
    }

    /// `Set-Cookie` value issuing `key`.
    pub fn issue(&self, key: &str) -> Option<HeaderValue> {
        let cookie = Cookie::build((self.cookie_name.clone(), key.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(CookieDuration::hours(self.ttl_hours))
            .build();
        HeaderValue::from_str(&cookie.to_string()).ok()
    }

    /// `Set-Cookie` value telling the browser to forget the session.
    pub fn clear(&self) -> Option<HeaderValue> {
        let cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::ZERO)
            .build();
        HeaderValue::from_str(&cookie.to_string()).ok()
    }
}

/// Append a `Set-Cookie` header, skipping values that failed to encode.
pub fn attach(headers: &mut HeaderMap, value: Option<HeaderValue>) {
    if let Some(value) = value {
        headers.append(SET_COOKIE, value);
    }
}
