//! HTTP client for the Packeta parcel-delivery REST API.
//!
//! [`PacketaApiClient`] owns the base URL and bearer token and turns each
//! [`CarrierApi`](packeta_core::CarrierApi) operation into exactly one HTTP
//! request. Failures of any kind come back as one
//! [`CarrierError`](packeta_core::CarrierError).

pub mod client;
pub mod config;
pub mod zpl;

pub use client::PacketaApiClient;
pub use config::{ConfigurationError, PacketaConfig, PacketaOptions};
