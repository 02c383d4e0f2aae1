use std::sync::Arc;

use axum::{Router, routing::get};
use axum_extra::extract::cookie::Key;

use crate::handlers::{account, home, probes};
use crate::service::{CacheProbe, CredentialStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: CredentialStore,
    pub cache: Arc<dyn CacheProbe>,
    pub cookie_key: Key,
    pub session_cookie: Arc<str>,
    pub insecure_cookie: bool,
}

impl AppState {
    pub fn new(
        store: CredentialStore,
        cache: Arc<dyn CacheProbe>,
        cookie_key: Key,
        session_cookie: impl Into<Arc<str>>,
        insecure_cookie: bool,
    ) -> Self {
        Self {
            store,
            cache,
            cookie_key,
            session_cookie: session_cookie.into(),
            insecure_cookie,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/test-redis", get(probes::test_redis))
        .route("/test-mongodb", get(probes::test_mongodb))
        .route("/login", get(account::login_form).post(account::login))
        .route("/logout", get(account::logout))
        .route(
            "/register",
            get(account::register_form).post(account::register),
        )
        .route("/user/{username}", get(account::user_profile))
        .with_state(state)
}
