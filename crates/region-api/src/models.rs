//! Region API models shared by the client and its callers.

use chrono::{DateTime, Utc};
use region_core::{ServiceAlias, TenantId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Representation of a tenant service as returned in service listings.
///
/// Every field is optional; the region API omits whatever it does not know.
/// Keys are camelCase on the wire, snake_case spellings are accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service alias, unique within the tenant.
    #[serde(default, alias = "service_alias", skip_serializing_if = "Option::is_none")]
    pub service_alias: Option<ServiceAlias>,
    /// Service id.
    #[serde(default, alias = "service_id", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Owning tenant id.
    #[serde(default, alias = "tenant_id", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    /// Owning tenant name.
    #[serde(default, alias = "tenant_name", skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    /// Service key in the application market.
    #[serde(default, alias = "service_key", skip_serializing_if = "Option::is_none")]
    pub service_key: Option<String>,
    /// Service version.
    #[serde(default, alias = "service_version", skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
    /// Container image.
    #[serde(default, alias = "image_name", skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// CPU allocation (millicores).
    #[serde(default, alias = "container_cpu", skip_serializing_if = "Option::is_none")]
    pub container_cpu: Option<i64>,
    /// Memory allocation (MiB).
    #[serde(default, alias = "container_memory", skip_serializing_if = "Option::is_none")]
    pub container_memory: Option<i64>,
    /// Number of replicas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// Deployed build version.
    #[serde(default, alias = "deploy_version", skip_serializing_if = "Option::is_none")]
    pub deploy_version: Option<String>,
    /// Service category (application, cache, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Last known status (running, closed, ...).
    #[serde(default, alias = "current_status", skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity of a single service, taken from the `bean` of a service lookup.
///
/// Missing fields, and fields that are not JSON strings, become empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSummary {
    /// Service alias.
    #[serde(deserialize_with = "string_or_empty")]
    pub service_alias: ServiceAlias,
    /// Service id.
    #[serde(deserialize_with = "string_or_empty")]
    pub service_id: String,
    /// Owning tenant id.
    #[serde(deserialize_with = "string_or_empty")]
    pub tenant_id: TenantId,
    /// Owning tenant name.
    #[serde(deserialize_with = "string_or_empty")]
    pub tenant_name: String,
}

fn string_or_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(T::from(value)),
        _ => Ok(T::default()),
    }
}

impl ServiceSummary {
    /// Key of the alias entry in [`ServiceSummary::into_map`].
    pub const SERVICE_ALIAS: &'static str = "serviceAlias";
    /// Key of the service id entry in [`ServiceSummary::into_map`].
    pub const SERVICE_ID: &'static str = "serviceId";
    /// Key of the tenant id entry in [`ServiceSummary::into_map`].
    pub const TENANT_ID: &'static str = "tenantId";
    /// Key of the tenant name entry in [`ServiceSummary::into_map`].
    pub const TENANT_NAME: &'static str = "tenantName";

    /// Convert into the string-keyed mapping callers of the region API expect.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, String> {
        HashMap::from([
            (Self::SERVICE_ALIAS.to_string(), self.service_alias.into_inner()),
            (Self::SERVICE_ID.to_string(), self.service_id),
            (Self::TENANT_ID.to_string(), self.tenant_id.into_inner()),
            (Self::TENANT_NAME.to_string(), self.tenant_name),
        ])
    }
}

/// One line of an event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MessageData {
    /// Log message.
    pub message: String,
    /// Human-readable timestamp as rendered by the region.
    pub time: String,
    /// Unix timestamp.
    pub utime: i64,
}

/// Minimum level of event log entries to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    /// Everything, including debug output.
    Debug,
    /// Informational entries and errors.
    #[default]
    Info,
    /// Errors only.
    Error,
    /// A level this client does not know; passed through verbatim.
    Other(String),
}

impl LogLevel {
    /// Wire representation of the level.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Error => "error",
            Self::Other(level) => level,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LogLevel {
    fn from(level: String) -> Self {
        match level.as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "error" => Self::Error,
            _ => Self::Other(level),
        }
    }
}

impl From<&str> for LogLevel {
    fn from(level: &str) -> Self {
        Self::from(level.to_string())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Other(level) => level,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// A pod backing a service, as recorded by the region.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pod {
    /// Record id.
    #[serde(rename = "ID", default)]
    pub id: u64,
    /// When the pod record was created.
    #[serde(rename = "CreatedAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Owning service id.
    #[serde(default)]
    pub service_id: String,
    /// Replication controller id.
    #[serde(rename = "rc_id", default)]
    pub replication_id: String,
    /// Replication controller type.
    #[serde(rename = "rc_type", default)]
    pub replication_type: String,
    /// Pod name.
    #[serde(default)]
    pub pod_name: String,
    /// Pod IP address.
    #[serde(default)]
    pub pod_ip: String,
}

/// Body of start and stop requests.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventRequest<'a> {
    /// Event correlation id.
    pub event_id: &'a str,
}

/// Body of event log requests.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventLogRequest<'a> {
    /// Event correlation id.
    pub event_id: &'a str,
    /// Minimum log level.
    pub level: &'a str,
}
