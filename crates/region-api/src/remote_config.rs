//! Remote configuration published by a region.
//!
//! The region serves a two-level JSON object at `/v1/config`: section name to
//! key to value. [`RemoteConfig`] keeps the whole map and offers typed views
//! of the `k8s` and `db` sections.

use crate::client::{JSON_CONTENT_TYPE, USER_AGENT};
use crate::Result;
use region_core::{ClientConfig, Error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Path of the configuration endpoint, relative to the region API base URL.
pub const CONFIG_PATH: &str = "/v1/config";

/// Fetch the configuration published by the region at `base_url`.
///
/// Uses a one-off HTTP client, so it works before any [`crate::RegionClient`]
/// exists. An empty `token` sends no `Authorization` header.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if `base_url` is empty (no request is made),
/// the request fails, the region answers with a non-2xx status, or the body is
/// not a JSON object of objects.
pub async fn load_remote_config(base_url: &str, token: Option<&str>) -> Result<RemoteConfig> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(Error::ConfigError(
            "region API URL can not be empty".to_string(),
        ));
    }

    let url = format!("{}{CONFIG_PATH}", base_url.trim_end_matches('/'));
    let http = ClientConfig::new()
        .build_http_client(USER_AGENT)
        .map_err(|err| Error::ConfigError(err.to_string()))?;

    let mut request = http.get(&url).header(CONTENT_TYPE, JSON_CONTENT_TYPE);
    if let Some(token) = token.filter(|token| !token.is_empty()) {
        request = request.header(AUTHORIZATION, format!("Token {token}"));
    }

    let response = request
        .send()
        .await
        .map_err(|err| Error::ConfigError(format!("Failed to fetch {url}: {err}")))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| Error::ConfigError(format!("Failed to read {url}: {err}")))?;

    debug!(url = %url, status = status.as_u16(), "fetched region configuration");

    if !status.is_success() {
        return Err(Error::ConfigError(format!(
            "region API returned {} for {CONFIG_PATH}: {}",
            status.as_u16(),
            String::from_utf8_lossy(&body)
        )));
    }

    let config = RemoteConfig::from_slice(&body)?;
    info!(sections = config.len(), "loaded region configuration");
    Ok(config)
}

/// Configuration sections published by a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteConfig {
    sections: BTreeMap<String, Map<String, Value>>,
}

impl RemoteConfig {
    /// Parse a configuration body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] unless the body is a JSON object whose
    /// values are all objects.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|err| Error::ConfigError(format!("wrong region api: {err}")))
    }

    /// All keys of one section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.sections.get(name)
    }

    /// A single value, addressed by section and key.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.section(section)?.get(key)
    }

    /// Section names in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the region published no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Take ownership of the raw sections.
    #[must_use]
    pub fn into_sections(self) -> BTreeMap<String, Map<String, Value>> {
        self.sections
    }

    /// Typed view of the `k8s` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the section exists but has the wrong
    /// shape.
    pub fn k8s(&self) -> Result<Option<K8sSection>> {
        self.typed_section(K8sSection::NAME)
    }

    /// Typed view of the `db` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the section exists but has the wrong
    /// shape.
    pub fn db(&self) -> Result<Option<DbSection>> {
        self.typed_section(DbSection::NAME)
    }

    fn typed_section<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.section(name)
            .map(|section| {
                serde_json::from_value(Value::Object(section.clone())).map_err(|err| {
                    Error::ConfigError(format!("invalid `{name}` section: {err}"))
                })
            })
            .transpose()
    }
}

/// The `k8s` section: where the region's cluster API lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sSection {
    /// Cluster API URL.
    #[serde(default)]
    pub url: String,
    /// Cluster API flavour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apitype: Option<String>,
}

impl K8sSection {
    /// Section name in [`RemoteConfig`].
    pub const NAME: &'static str = "k8s";
}

/// The `db` section: the region's database connection.
#[derive(Debug, Default, Deserialize)]
pub struct DbSection {
    /// Database engine.
    #[serde(rename = "ENGINE", default)]
    pub engine: Option<String>,
    /// Database name.
    #[serde(rename = "NAME", default)]
    pub name: Option<String>,
    /// Database host.
    #[serde(rename = "HOST", default)]
    pub host: Option<String>,
    /// Database port, published as either a string or a number.
    #[serde(rename = "PORT", default, deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    /// Database user.
    #[serde(rename = "USER", default)]
    pub user: Option<String>,
    #[serde(rename = "PASSWORD", default, deserialize_with = "deserialize_secret")]
    password: Option<SecretString>,
}

impl DbSection {
    /// Section name in [`RemoteConfig`].
    pub const NAME: &'static str = "db";

    /// Database password.
    #[must_use]
    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(PortValue::Text(raw)) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid port `{raw}`: {err}"))),
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn sample() -> RemoteConfig {
        RemoteConfig::from_slice(
            json!({
                "k8s": {"url": "http://127.0.0.1:8181", "apitype": "kubernetes api"},
                "db": {
                    "ENGINE": "django.db.backends.mysql",
                    "NAME": "region",
                    "HOST": "127.0.0.1",
                    "PORT": "3306",
                    "USER": "writer",
                    "PASSWORD": "hunter2"
                }
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn typed_sections() {
        let config = sample();
        assert_eq!(config.len(), 2);
        assert_eq!(config.section_names().collect::<Vec<_>>(), vec!["db", "k8s"]);

        let k8s = config.k8s().unwrap().unwrap();
        assert_eq!(k8s.url, "http://127.0.0.1:8181");
        assert_eq!(k8s.apitype.as_deref(), Some("kubernetes api"));

        let db = config.db().unwrap().unwrap();
        assert_eq!(db.port, Some(3306));
        assert_eq!(db.user.as_deref(), Some("writer"));
        assert_eq!(db.password().unwrap().expose_secret(), "hunter2");
    }

    #[test]
    fn db_password_not_in_debug_output() {
        let db = sample().db().unwrap().unwrap();
        assert!(!format!("{db:?}").contains("hunter2"));
    }

    #[test]
    fn numeric_port_accepted() {
        let config = RemoteConfig::from_slice(br#"{"db":{"PORT":5432}}"#).unwrap();
        assert_eq!(config.db().unwrap().unwrap().port, Some(5432));
    }

    #[test]
    fn bad_port_is_config_error() {
        let config = RemoteConfig::from_slice(br#"{"db":{"PORT":"mysql"}}"#).unwrap();
        assert!(matches!(config.db(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn missing_section_is_none() {
        let config = RemoteConfig::from_slice(br#"{"region":{"name":"rbd"}}"#).unwrap();
        assert!(config.k8s().unwrap().is_none());
        assert_eq!(config.get("region", "name"), Some(&json!("rbd")));
        assert_eq!(config.get("region", "zone"), None);
    }

    #[test]
    fn single_level_body_rejected() {
        let err = RemoteConfig::from_slice(br#"{"k8s":"http://127.0.0.1"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("wrong region api")));
    }

    #[tokio::test]
    async fn empty_base_url_rejected_before_request() {
        let err = load_remote_config("  ", Some("token")).await.unwrap_err();
        assert_eq!(
            err,
            Error::ConfigError("region API URL can not be empty".to_string())
        );
    }
}
