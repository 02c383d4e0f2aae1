use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::warn;

use crate::router::AppState;

const FLASH_COOKIE: &str = "_flashes";
const FLASH_TTL: Duration = Duration::minutes(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
        }
    }
}

/// One-shot notification shown by the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Per-request view of the encrypted session and flash cookies.
///
/// Handlers thread it through by value and return it alongside their
/// response so cookie changes reach the client.
pub struct Session {
    jar: PrivateCookieJar,
    cookie_name: Arc<str>,
    secure: bool,
}

impl Session {
    /// Username stored by a successful login, if any.
    pub fn username(&self) -> Option<String> {
        self.jar
            .get(&self.cookie_name)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }

    pub fn login(mut self, username: &str) -> Self {
        let cookie = self.build_cookie(self.cookie_name.to_string(), username.to_string());
        self.jar = self.jar.add(cookie);
        self
    }

    pub fn logout(mut self) -> Self {
        if self.jar.get(&self.cookie_name).is_some() {
            self.jar = self.jar.remove(clear_cookie(self.cookie_name.to_string()));
        }
        self
    }

    /// Queue a flash message behind any already pending.
    pub fn flash(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        let mut flashes = self.pending_flashes();
        flashes.push(Flash {
            level,
            message: message.into(),
        });
        match serde_json::to_string(&flashes) {
            Ok(value) => {
                let mut cookie = self.build_cookie(FLASH_COOKIE.to_string(), value);
                cookie.set_max_age(FLASH_TTL);
                self.jar = self.jar.add(cookie);
            }
            Err(e) => warn!(error = %e, "failed to encode flash messages"),
        }
        self
    }

    /// Drain pending flash messages, clearing the cookie that carried them.
    pub fn take_flashes(mut self) -> (Self, Vec<Flash>) {
        if self.jar.get(FLASH_COOKIE).is_none() {
            return (self, Vec::new());
        }
        let flashes = self.pending_flashes();
        self.jar = self.jar.remove(clear_cookie(FLASH_COOKIE.to_string()));
        (self, flashes)
    }

    fn pending_flashes(&self) -> Vec<Flash> {
        self.jar
            .get(FLASH_COOKIE)
            .and_then(|c| serde_json::from_str(c.value()).ok())
            .unwrap_or_default()
    }

    fn build_cookie(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build(Cookie::new(name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

fn clear_cookie(name: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Ok(Self {
            jar,
            cookie_name: state.session_cookie.clone(),
            secure: !state.insecure_cookie,
        })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum_extra::extract::cookie::Key;

    fn session() -> Session {
        Session {
            jar: PrivateCookieJar::from_headers(&HeaderMap::new(), Key::generate()),
            cookie_name: Arc::from("test_session"),
            secure: false,
        }
    }

    #[test]
    fn login_and_logout_round_the_username() {
        let s = session();
        assert_eq!(s.username(), None);

        let s = s.login("alice");
        assert_eq!(s.username().as_deref(), Some("alice"));

        let s = s.logout();
        assert_eq!(s.username(), None);
    }

    #[test]
    fn flashes_queue_in_order_and_drain_once() {
        let s = session()
            .flash(FlashLevel::Success, "first")
            .flash(FlashLevel::Danger, "second");

        let (s, flashes) = s.take_flashes();
        assert_eq!(
            flashes,
            vec![
                Flash {
                    level: FlashLevel::Success,
                    message: "first".to_string()
                },
                Flash {
                    level: FlashLevel::Danger,
                    message: "second".to_string()
                },
            ]
        );

        let (_, again) = s.take_flashes();
        assert!(again.is_empty());
    }

    #[test]
    fn flash_levels_serialize_lowercase() {
        let json = serde_json::to_string(&FlashLevel::Danger).unwrap();
        assert_eq!(json, r#""danger""#);
        assert_eq!(FlashLevel::Success.as_str(), "success");
    }
}
