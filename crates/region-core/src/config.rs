//! Configuration structures for region clients.
//!
//! This module provides the connection configuration for a region API:
//! where it lives, how to authenticate, and how strictly responses are read.

use crate::client::DecodePolicy;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

/// Environment variable holding the region API base URL.
pub const ENV_API_URL: &str = "REGION_API_URL";
/// Environment variable holding the region API token.
pub const ENV_API_TOKEN: &str = "REGION_API_TOKEN";
/// Environment variable holding the authentication type.
pub const ENV_AUTH_TYPE: &str = "REGION_AUTH_TYPE";
/// Environment variable holding the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REGION_REQUEST_TIMEOUT_SECS";
/// Environment variable holding the decode policy.
pub const ENV_DECODE_POLICY: &str = "REGION_DECODE_POLICY";

/// Configuration for a region client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RegionConfig {
    /// Region API base URL (e.g. `http://region.goodrain.me:8888`)
    #[validate(url)]
    pub api_url: String,

    /// Optional API token, sent as `Authorization: Token <token>`
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Authentication type reported by the console
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_type: String,

    /// Request timeout in seconds; unset means transport defaults
    #[validate(range(min = 1, max = 300))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Whether response failures are swallowed or surfaced
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

impl RegionConfig {
    /// Create a new region configuration.
    ///
    /// # Arguments
    ///
    /// * `api_url` - The region API base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            token: None,
            auth_type: String::new(),
            request_timeout_secs: None,
            decode_policy: DecodePolicy::default(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Load the configuration from `REGION_*` environment variables.
    ///
    /// Environment variables:
    /// - `REGION_API_URL`: region API base URL (required)
    /// - `REGION_API_TOKEN`: API token (optional)
    /// - `REGION_AUTH_TYPE`: authentication type (optional)
    /// - `REGION_REQUEST_TIMEOUT_SECS`: request timeout in seconds (optional)
    /// - `REGION_DECODE_POLICY`: `lenient` or `strict` (default: `lenient`)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RegionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| Error::ConfigError(format!("{ENV_API_URL} is not set")))?;

        let mut config = Self::new(api_url)?;

        if let Some(token) = lookup(ENV_API_TOKEN) {
            debug!(var = ENV_API_TOKEN, "applying region API token");
            config = config.with_token(token);
        }

        if let Some(auth_type) = lookup(ENV_AUTH_TYPE) {
            debug!(var = ENV_AUTH_TYPE, auth_type = %auth_type, "applying auth type");
            config = config.with_auth_type(auth_type);
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                Error::ConfigError(format!("invalid {ENV_REQUEST_TIMEOUT_SECS}: {e}"))
            })?;
            debug!(var = ENV_REQUEST_TIMEOUT_SECS, secs, "applying request timeout");
            config = config.with_timeout(secs);
        }

        if let Some(raw) = lookup(ENV_DECODE_POLICY) {
            let policy: DecodePolicy = raw.parse()?;
            debug!(var = ENV_DECODE_POLICY, policy = %policy, "applying decode policy");
            config = config.with_decode_policy(policy);
        }

        config.validate()?;
        debug!(api_url = %config.api_url, "loaded region configuration from environment");
        Ok(config)
    }

    /// Set the API token. An empty token means no `Authorization` header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Set the authentication type.
    #[must_use]
    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = auth_type.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = Some(seconds);
        self
    }

    /// Set the decode policy.
    #[must_use]
    pub const fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Get the request timeout as a Duration, if set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse and validate the API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::ConfigError(format!("Invalid region API URL: {e}")))
    }
}

impl fmt::Debug for RegionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("auth_type", &self.auth_type)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("decode_policy", &self.decode_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_region_config_new() {
        let config = RegionConfig::new("http://region.goodrain.me:8888").unwrap();
        assert_eq!(config.api_url, "http://region.goodrain.me:8888");
        assert!(config.token.is_none());
        assert!(config.timeout().is_none());
        assert_eq!(config.decode_policy, DecodePolicy::Lenient);
    }

    #[test]
    fn test_region_config_invalid_url() {
        let result = RegionConfig::new("not-a-url");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_region_config_builder() {
        let config = RegionConfig::new("http://region:8888")
            .unwrap()
            .with_token("secret")
            .with_auth_type("token")
            .with_timeout(15)
            .with_decode_policy(DecodePolicy::Strict);

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.auth_type, "token");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert!(config.decode_policy.is_strict());
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let config = RegionConfig::new("http://region:8888")
            .unwrap()
            .with_token("");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_parse_api_url() {
        let config = RegionConfig::new("https://region.example.com:8443").unwrap();
        let url = config.parse_api_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("region.example.com"));
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn test_token_is_never_serialized() {
        let config = RegionConfig::new("http://region:8888")
            .unwrap()
            .with_token("secret");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let deserialized: RegionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.api_url, config.api_url);
        assert!(deserialized.token.is_none());
    }

    #[test]
    fn test_timeout_validation_range() {
        let mut config = RegionConfig::new("http://region:8888").unwrap();
        config.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());

        config.request_timeout_secs = Some(301);
        assert!(config.validate().is_err());

        config.request_timeout_secs = Some(30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_full() {
        let config = RegionConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://region:8888"),
            (ENV_API_TOKEN, "abc"),
            (ENV_AUTH_TYPE, "token"),
            (ENV_REQUEST_TIMEOUT_SECS, "20"),
            (ENV_DECODE_POLICY, "strict"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://region:8888");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.auth_type, "token");
        assert_eq!(config.request_timeout_secs, Some(20));
        assert_eq!(config.decode_policy, DecodePolicy::Strict);
    }

    #[test]
    fn test_from_lookup_missing_url() {
        let err = RegionConfig::from_lookup(lookup_from(&[(ENV_API_TOKEN, "abc")])).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let err = RegionConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://region:8888"),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        let err = RegionConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://region:8888"),
            (ENV_REQUEST_TIMEOUT_SECS, "900"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = RegionConfig::new("http://region:8888")
            .unwrap()
            .with_token("do-not-print");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("http://region:8888"));
    }
}
