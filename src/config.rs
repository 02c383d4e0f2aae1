use axum_extra::extract::cookie::Key;
use std::env;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;

/// String settings, taken verbatim so an all-digit value stays a string.
const STRING_KEYS: &[(&str, &str)] = &[
    ("SECRET_KEY", "secret_key"),
    ("MONGO_URI", "mongo_uri"),
    ("MONGO_DATABASE", "mongo_database"),
    ("REDIS_URL", "redis_url"),
    ("SESSION_COOKIE_NAME", "session_cookie_name"),
    ("LISTEN_ADDR", "listen_addr"),
    ("LOGLEVEL", "loglevel"),
];

/// Typed settings, parsed by figment.
const TYPED_KEYS: &[&str] = &["INSECURE_COOKIE", "SEED_EXAMPLE_USER"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Master key for the private session and flash cookies.
    pub secret_key: Option<String>,
    pub mongo_uri: String,
    /// Database used when `mongo_uri` does not name one.
    pub mongo_database: String,
    pub redis_url: String,
    pub session_cookie_name: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub insecure_cookie: bool,
    pub seed_example_user: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: None,
            mongo_uri: "mongodb://localhost:27017/user_portal".to_string(),
            mongo_database: "Cluster0".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            session_cookie_name: "user_portal_session".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            insecure_cookie: false,
            seed_example_user: false,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(TYPED_KEYS));

        STRING_KEYS
            .iter()
            .filter_map(|(var, field)| env::var(var).ok().map(|value| (*field, value)))
            .fold(figment, |figment, (field, value)| {
                figment.merge(Serialized::default(field, value))
            })
    }

    /// Load defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::figment().extract()?)
    }

    /// Build the cookie key from `secret_key`, or a random one when unset.
    pub fn cookie_key(&self) -> Result<Key, AppError> {
        match self.secret_key.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) if secret.len() >= 32 => Ok(Key::derive_from(secret.as_bytes())),
            Some(_) => Err(AppError::WeakSecretKey),
            None => {
                warn!("SECRET_KEY not set; sessions will not survive a restart");
                Ok(Key::generate())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_environment() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("MONGO_URI", "mongodb://db.internal:27017/accounts");
            jail.set_env("SESSION_COOKIE_NAME", "portal");
            jail.set_env("INSECURE_COOKIE", "true");
            jail.set_env("SEED_EXAMPLE_USER", "true");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.mongo_uri, "mongodb://db.internal:27017/accounts");
            assert_eq!(cfg.session_cookie_name, "portal");
            assert!(cfg.insecure_cookie);
            assert!(cfg.seed_example_user);
            assert_eq!(cfg.redis_url, "redis://localhost:6379/0");
            Ok(())
        });
    }

    #[test]
    fn all_digit_strings_stay_strings() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let secret = "1234567890".repeat(4);
            jail.set_env("SESSION_COOKIE_NAME", "12345");
            jail.set_env("SECRET_KEY", &secret);
            jail.set_env("MONGO_DATABASE", "2024");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.session_cookie_name, "12345");
            assert_eq!(cfg.secret_key.as_deref(), Some(secret.as_str()));
            assert_eq!(cfg.mongo_database, "2024");
            assert!(cfg.cookie_key().is_ok());
            Ok(())
        });
    }

    #[test]
    fn empty_secret_key_counts_as_unset() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("SECRET_KEY", "");

            let cfg: Config = Config::figment().extract()?;
            assert!(cfg.cookie_key().is_ok());
            Ok(())
        });
    }

    #[test]
    fn short_secret_key_is_rejected() {
        let cfg = Config {
            secret_key: Some("too-short".to_string()),
            ..Config::default()
        };
        assert!(matches!(cfg.cookie_key(), Err(AppError::WeakSecretKey)));
    }

    #[test]
    fn same_secret_derives_same_key() {
        let cfg = Config {
            secret_key: Some("x".repeat(48)),
            ..Config::default()
        };
        let a = cfg.cookie_key().expect("key");
        let b = cfg.cookie_key().expect("key");
        assert_eq!(a.master(), b.master());
    }
}
