//! Client configuration.
//!
//! A `ClientConfig` is built once and owned by the client for its whole
//! lifetime. The API key is held as a `SecretString` so it does not show up
//! in `Debug` output.

use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Hosted Plunk API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.useplunk.com";

pub const API_KEY_ENV: &str = "PLUNK_API_KEY";
pub const BASE_URL_ENV: &str = "PLUNK_BASE_URL";

/// Base URL and bearer credential used for every call.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    api_key: SecretString,
}

impl ClientConfig {
    /// Trailing slashes on `base_url` are stripped so endpoint paths can be
    /// appended directly.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Read `PLUNK_API_KEY` (required) and `PLUNK_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::ConfigError(format!("{API_KEY_ENV} is not set")))?;
        let base_url = lookup(BASE_URL_ENV)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::ConfigError(format!(
                "{BASE_URL_ENV} must be an http(s) URL, got {base_url:?}"
            )));
        }
        Ok(Self::new(base_url, api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}
