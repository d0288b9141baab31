// src/config.rs

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::filters::DEFAULT_PAGE_SIZE;
use crate::state::CloudinaryConfig;

const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be a valid number")]
    Invalid(&'static str),
}

/// Settings read from the environment (after `.env` is loaded).
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Shared cache store. Without it the process keeps its own moka cache.
    pub redis_url: Option<String>,
    pub cache_capacity: u64,
    pub jwt_secret: String,
    pub cloudinary: CloudinaryConfig,
    pub products_per_page: i64,
    pub port: u16,
    pub frontend_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            redis_url: optional("REDIS_URL"),
            cache_capacity: parse_or(
                "CACHE_CAPACITY",
                optional("CACHE_CAPACITY"),
                DEFAULT_CACHE_CAPACITY,
            )?,
            jwt_secret: required("JWT_SECRET")?,
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
            },
            products_per_page: parse_or(
                "PRODUCT_PER_PAGE",
                optional("PRODUCT_PER_PAGE"),
                DEFAULT_PAGE_SIZE,
            )?
            .max(1),
            port: parse_or("PORT", optional("PORT"), DEFAULT_PORT)?,
            frontend_url: optional("FRONTEND_URL"),
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 5] = [
        ("DATABASE_URL", "postgres://localhost/shop"),
        ("JWT_SECRET", "secret"),
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_API_KEY", "key"),
        ("CLOUDINARY_API_SECRET", "shh"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.products_per_page, 8);
        assert_eq!(config.cache_capacity, 10_000);
        assert_eq!(config.port, 4000);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn page_size_comes_from_environment() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PRODUCT_PER_PAGE", "12"));
        pairs.push(("REDIS_URL", "redis://127.0.0.1/"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.products_per_page, 12);
        assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1/"));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let result = AppConfig::from_lookup(lookup(&REQUIRED[1..]));
        assert_eq!(result.err(), Some(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn invalid_number_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "http"));
        let result = AppConfig::from_lookup(lookup(&pairs));
        assert_eq!(result.err(), Some(ConfigError::Invalid("PORT")));
    }
}
