//! HTTP collaborators of the conditions workflow.
//!
//! - `client`: the rowing conditions backend (`ApiClient`, `ConditionsSource`)
//! - `geocoder`: reverse geocoding (`NominatimClient`, `LocationResolver`)
//! - `geolocation`: approximate device position (`IpLocator`, `DeviceLocator`)
//!
//! None of these retry. Failures are reported as `ApiError`, except the
//! resolver, which degrades to a coordinate label.

pub mod client;
pub mod error;
pub mod geocoder;
pub mod geolocation;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{build_http_client, ApiClient, ConditionsSource};
pub use error::ApiError;
pub use geocoder::{LocationResolver, NominatimClient};
pub use geolocation::{DeviceLocator, IpLocator};
