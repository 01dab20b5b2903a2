//! # region-core
//!
//! Core types and utilities for talking to a region-management API.
//!
//! This crate provides the shared error type, HTTP client tuning, region
//! connection configuration and strongly-typed identifiers used by the
//! `region-api` client.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`ids`] - Strongly-typed string identifiers for tenants and services
//! - [`config`] - Region connection configuration
//! - [`client`] - HTTP client tuning and decode policy

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;

// Re-export commonly used types
pub use client::{ClientConfig, DecodePolicy};
pub use config::RegionConfig;
pub use error::{Error, Result};
pub use ids::{ServiceAlias, TenantId};
