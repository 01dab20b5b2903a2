//! Region API client and data models.
//!
//! Provides typed structures and an asynchronous client for the
//! region-management API: tenant services, start/stop, pods, event logs and
//! the region's remote configuration.
//!
//! ```no_run
//! # async fn demo() -> region_api::Result<()> {
//! use region_api::RegionClient;
//!
//! let client = RegionClient::builder("http://region.goodrain.me:8888")?
//!     .with_token("console-token")
//!     .build()?;
//!
//! let services = client.tenant("tenant-a").services().list().await?;
//! for service in services {
//!     println!("{:?}", service.service_alias);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod envelope;
pub mod models;
pub mod region;
pub mod remote_config;

pub use client::{
    RawResponse, RegionClient, RegionClientBuilder, ServiceOperations, Services, Tenant, Tenants,
};
pub use models::{LogLevel, MessageData, Pod, Service, ServiceSummary};
pub use region_core::{DecodePolicy, Error, RegionConfig, ServiceAlias, TenantId};
pub use remote_config::{load_remote_config, DbSection, K8sSection, RemoteConfig};

/// Convenient result alias that reuses the shared region error type.
pub type Result<T> = region_core::Result<T>;
