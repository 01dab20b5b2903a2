//! Process-wide region client registration.
//!
//! Components that cannot thread a [`RegionClient`] through their call graph
//! can register one here at startup. The first successful registration wins;
//! later calls leave it untouched and hand back the original client.

use crate::client::RegionClient;
use crate::Result;
use region_core::{Error, RegionConfig};
use std::sync::OnceLock;
use tracing::{info, warn};

static REGION: OnceLock<RegionClient> = OnceLock::new();

/// Register the process-wide client built from `config`.
///
/// If a client is already registered, `config` is ignored and the existing
/// client is returned. Reconfiguration is not supported.
///
/// # Errors
///
/// Returns an error if no client is registered yet and `config` does not
/// produce a valid client. The registration stays empty in that case.
pub fn init(config: &RegionConfig) -> Result<&'static RegionClient> {
    if let Some(existing) = REGION.get() {
        warn!(
            api_url = %config.api_url,
            registered = %existing.base_url(),
            "region client already registered, ignoring new configuration"
        );
        return Ok(existing);
    }

    let client = RegionClient::from_config(config)?;
    let base_url = client.base_url().to_string();

    // A concurrent caller may have won between the check and here.
    if REGION.set(client).is_ok() {
        info!(api_url = %base_url, "registered region client");
    }

    REGION
        .get()
        .ok_or_else(|| Error::ConfigError("region client registration failed".to_string()))
}

/// Register the process-wide client from its three connection parameters.
///
/// # Errors
///
/// See [`init`].
pub fn configure(
    api_url: impl Into<String>,
    token: impl Into<String>,
    auth_type: impl Into<String>,
) -> Result<&'static RegionClient> {
    if let Some(existing) = REGION.get() {
        warn!(registered = %existing.base_url(), "region client already registered");
        return Ok(existing);
    }

    let config = RegionConfig::new(api_url)?
        .with_token(token)
        .with_auth_type(auth_type);
    init(&config)
}

/// The registered client, if any.
#[must_use]
pub fn get() -> Option<&'static RegionClient> {
    REGION.get()
}

/// Returns true once a client has been registered.
#[must_use]
pub fn is_initialized() -> bool {
    REGION.get().is_some()
}
