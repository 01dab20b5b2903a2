//! Asynchronous region API client implementation.
//!
//! Every operation funnels through [`RegionClient::execute`], which attaches
//! the JSON content type and the token header. The fluent handles
//! ([`Tenants`], [`Tenant`], [`Services`]) only carry the tenant id used to
//! build paths.

use crate::envelope::{decode_bean, decode_list};
use crate::models::{
    EventLogRequest, EventRequest, LogLevel, MessageData, Pod, Service, ServiceSummary,
};
use crate::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use region_core::client::ClientConfig;
use region_core::{DecodePolicy, Error, RegionConfig, TenantId};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

pub(crate) const USER_AGENT: &str = concat!("region-api/", env!("CARGO_PKG_VERSION"));
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// Builder for [`RegionClient`].
#[derive(Debug, Clone)]
pub struct RegionClientBuilder {
    base_url: Url,
    token: Option<SecretString>,
    auth_type: String,
    decode_policy: DecodePolicy,
    http_config: ClientConfig,
}

impl RegionClientBuilder {
    /// Create a builder for the specified base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|err| Error::ConfigError(format!("Invalid region API URL `{raw}`: {err}")))?;

        Ok(Self {
            base_url,
            token: None,
            auth_type: String::new(),
            decode_policy: DecodePolicy::default(),
            http_config: ClientConfig::new(),
        })
    }

    /// Create a builder pre-populated from a [`RegionConfig`].
    pub fn from_config(config: &RegionConfig) -> Result<Self> {
        let mut builder = Self::new(&config.api_url)?
            .with_auth_type(config.auth_type.clone())
            .with_decode_policy(config.decode_policy);

        if let Some(token) = &config.token {
            builder = builder.with_token(token.clone());
        }

        if let Some(timeout) = config.timeout() {
            builder = builder.with_timeout(timeout);
        }

        Ok(builder)
    }

    /// Configure the API token. An empty token sends no `Authorization` header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then(|| SecretString::from(token));
        self
    }

    /// Record the authentication type.
    #[must_use]
    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = auth_type.into();
        self
    }

    /// Choose whether response failures are swallowed or surfaced.
    #[must_use]
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Apply a whole-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RegionClient> {
        let http = self.http_config.build_http_client(USER_AGENT)?;

        Ok(RegionClient {
            http,
            base_url: self.base_url,
            token: self.token,
            auth_type: self.auth_type,
            decode_policy: self.decode_policy,
        })
    }
}

/// Raw outcome of a region API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn an unsuccessful status into an error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::from_status(self.status, self.text()))
        }
    }
}

/// Asynchronous region API client.
#[derive(Debug)]
pub struct RegionClient {
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
    auth_type: String,
    decode_policy: DecodePolicy,
}

impl RegionClient {
    /// Construct a client directly from the base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        RegionClientBuilder::new(base_url)?.build()
    }

    /// Start a builder for the given base URL.
    pub fn builder(base_url: impl AsRef<str>) -> Result<RegionClientBuilder> {
        RegionClientBuilder::new(base_url)
    }

    /// Construct a client from a [`RegionConfig`].
    pub fn from_config(config: &RegionConfig) -> Result<Self> {
        RegionClientBuilder::from_config(config)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the configured authentication type.
    #[must_use]
    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }

    /// Returns true if requests carry an `Authorization` header.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Return the decode policy.
    #[must_use]
    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode_policy
    }

    /// Entry point of the tenant accessor chain.
    #[must_use]
    pub fn tenants(&self) -> Tenants<'_> {
        Tenants { client: self }
    }

    /// Shortcut for `tenants().get(tenant_id)`.
    #[must_use]
    pub fn tenant(&self, tenant_id: impl Into<TenantId>) -> Tenant<'_> {
        self.tenants().get(tenant_id)
    }

    /// Send a request to `base_url + path` and return the raw status and body.
    ///
    /// The status is not interpreted; a 404 or 500 is returned like a 200.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransportError`] if the URL cannot be formed, the
    /// request cannot be sent, or the body cannot be read.
    pub async fn execute(
        &self,
        path: &str,
        method: Method,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let url = self.url_for(path)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token.expose_secret()));
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!(%method, path, status = status.as_u16(), "region API request completed");

        Ok(RawResponse { status, body })
    }

    async fn execute_json<B>(&self, path: &str, method: Method, body: &B) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(|err| {
            Error::TransportError(format!("Failed to encode request body: {err}"))
        })?;
        self.execute(path, method, Some(payload)).await
    }

    /// Applies the decode policy to a status: strict clients reject non-2xx.
    fn check_status(&self, response: RawResponse) -> Result<RawResponse> {
        if self.decode_policy.is_strict() {
            response.error_for_status()
        } else {
            Ok(response)
        }
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined)
            .map_err(|err| Error::TransportError(format!("Invalid region API path `{path}`: {err}")))
    }
}

/// Accessor over the tenants of a region.
#[derive(Debug, Clone, Copy)]
pub struct Tenants<'a> {
    client: &'a RegionClient,
}

impl<'a> Tenants<'a> {
    /// Handle for a single tenant. No request is made.
    #[must_use]
    pub fn get(&self, tenant_id: impl Into<TenantId>) -> Tenant<'a> {
        Tenant {
            client: self.client,
            tenant_id: tenant_id.into(),
        }
    }
}

/// Handle for one tenant.
#[derive(Debug, Clone)]
pub struct Tenant<'a> {
    client: &'a RegionClient,
    tenant_id: TenantId,
}

impl<'a> Tenant<'a> {
    /// The tenant id.
    #[must_use]
    pub fn id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Services owned by this tenant.
    #[must_use]
    pub fn services(&self) -> Services<'a> {
        Services {
            client: self.client,
            tenant_id: self.tenant_id.clone(),
        }
    }
}

/// Operations on the services of one tenant.
///
/// How failures are reported depends on the client's [`DecodePolicy`]; see
/// each method.
#[derive(Debug, Clone)]
pub struct Services<'a> {
    client: &'a RegionClient,
    tenant_id: TenantId,
}

impl Services<'_> {
    /// The tenant these services belong to.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// List the tenant's services.
    ///
    /// Lenient: any transport or decode failure is logged and yields an
    /// empty list, so "no services" and "request failed" look alike.
    pub async fn list(&self) -> Result<Vec<Service>> {
        let path = self.collection_path();
        let result = match self.client.execute(&path, Method::GET, None).await {
            Ok(response) => self
                .client
                .check_status(response)
                .and_then(|response| decode_list::<Service>(&response.body)),
            Err(err) => Err(err),
        };

        result.or_else(|err| self.recover(err, "list services", None, Vec::new()))
    }

    /// Fetch the identity of one service.
    ///
    /// A 404 yields `None` under every policy. Lenient: transport and decode
    /// failures are logged and also yield `None`.
    pub async fn get(&self, name: impl AsRef<str>) -> Result<Option<ServiceSummary>> {
        let name = name.as_ref();
        let path = self.service_path(name);

        let response = match self.client.execute(&path, Method::GET, None).await {
            Ok(response) => response,
            Err(err) => return self.recover(err, "get service", Some(name), None),
        };

        if response.status == StatusCode::NOT_FOUND {
            debug!(tenant = %self.tenant_id, service = name, "service not found");
            return Ok(None);
        }

        self.client
            .check_status(response)
            .and_then(|response| decode_bean::<ServiceSummary>(&response.body))
            .map(Some)
            .or_else(|err| self.recover(err, "get service", Some(name), None))
    }

    /// Fetch the pods backing a service.
    ///
    /// Transport failures are always returned. Lenient: decode failures are
    /// logged and yield an empty list.
    pub async fn pods(&self, name: impl AsRef<str>) -> Result<Vec<Pod>> {
        let name = name.as_ref();
        let path = format!("{}/pods", self.service_path(name));
        let response = self.client.execute(&path, Method::GET, None).await?;

        self.client
            .check_status(response)
            .and_then(|response| decode_list::<Pod>(&response.body))
            .or_else(|err| self.recover(err, "list pods", Some(name), Vec::new()))
    }

    /// Ask the region to start a service.
    ///
    /// Transport failures are always returned. Lenient: the status is not
    /// inspected, so business-level rejections go unnoticed.
    pub async fn start(&self, name: impl AsRef<str>, event_id: impl AsRef<str>) -> Result<()> {
        self.lifecycle(name.as_ref(), "start", event_id.as_ref()).await
    }

    /// Ask the region to stop a service.
    ///
    /// Same failure semantics as [`Services::start`].
    pub async fn stop(&self, name: impl AsRef<str>, event_id: impl AsRef<str>) -> Result<()> {
        self.lifecycle(name.as_ref(), "stop", event_id.as_ref()).await
    }

    /// Fetch the log trail of an event.
    ///
    /// Transport failures are always returned. Lenient: decode failures are
    /// logged and yield an empty list.
    pub async fn event_log(
        &self,
        name: impl AsRef<str>,
        event_id: impl AsRef<str>,
        level: impl Into<LogLevel>,
    ) -> Result<Vec<MessageData>> {
        let name = name.as_ref();
        let level = level.into();
        let path = format!("{}/event-log", self.service_path(name));
        let body = EventLogRequest {
            event_id: event_id.as_ref(),
            level: level.as_str(),
        };

        let response = self.client.execute_json(&path, Method::POST, &body).await?;

        self.client
            .check_status(response)
            .and_then(|response| decode_list::<MessageData>(&response.body))
            .or_else(|err| self.recover(err, "fetch event log", Some(name), Vec::new()))
    }

    async fn lifecycle(&self, name: &str, action: &'static str, event_id: &str) -> Result<()> {
        let path = format!("{}/{action}", self.service_path(name));
        let response = self
            .client
            .execute_json(&path, Method::POST, &EventRequest { event_id })
            .await?;

        if !response.is_success() {
            debug!(
                tenant = %self.tenant_id,
                service = name,
                action,
                status = response.status.as_u16(),
                "region API did not accept lifecycle request"
            );
        }

        self.client.check_status(response).map(|_| ())
    }

    /// Swallow `err` into `fallback` under the lenient policy.
    fn recover<T>(
        &self,
        err: Error,
        operation: &'static str,
        service: Option<&str>,
        fallback: T,
    ) -> Result<T> {
        if self.client.decode_policy.is_strict() {
            return Err(err);
        }

        if err.should_log() {
            error!(tenant = %self.tenant_id, service, operation, error = %err, "region API call failed");
        } else {
            warn!(tenant = %self.tenant_id, service, operation, error = %err, "region API call failed");
        }

        Ok(fallback)
    }

    fn collection_path(&self) -> String {
        format!("/v2/tenants/{}/services", self.tenant_id)
    }

    fn service_path(&self, name: &str) -> String {
        format!("{}/{name}", self.collection_path())
    }
}

/// Service operations of a tenant, as a seam for callers that want to
/// substitute the region API in their own tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceOperations: Send + Sync {
    /// See [`Services::list`].
    async fn list(&self) -> Result<Vec<Service>>;

    /// See [`Services::get`].
    async fn get(&self, name: &str) -> Result<Option<ServiceSummary>>;

    /// See [`Services::pods`].
    async fn pods(&self, name: &str) -> Result<Vec<Pod>>;

    /// See [`Services::start`].
    async fn start(&self, name: &str, event_id: &str) -> Result<()>;

    /// See [`Services::stop`].
    async fn stop(&self, name: &str, event_id: &str) -> Result<()>;

    /// See [`Services::event_log`].
    async fn event_log(
        &self,
        name: &str,
        event_id: &str,
        level: &LogLevel,
    ) -> Result<Vec<MessageData>>;
}

#[async_trait]
impl ServiceOperations for Services<'_> {
    async fn list(&self) -> Result<Vec<Service>> {
        Services::list(self).await
    }

    async fn get(&self, name: &str) -> Result<Option<ServiceSummary>> {
        Services::get(self, name).await
    }

    async fn pods(&self, name: &str) -> Result<Vec<Pod>> {
        Services::pods(self, name).await
    }

    async fn start(&self, name: &str, event_id: &str) -> Result<()> {
        Services::start(self, name, event_id).await
    }

    async fn stop(&self, name: &str, event_id: &str) -> Result<()> {
        Services::stop(self, name, event_id).await
    }

    async fn event_log(
        &self,
        name: &str,
        event_id: &str,
        level: &LogLevel,
    ) -> Result<Vec<MessageData>> {
        Services::event_log(self, name, event_id, level.clone()).await
    }
}
