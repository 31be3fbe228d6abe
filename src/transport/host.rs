//! # Host Link Boundary
//!
//! The wireless stack is provided by the host (BlueZ, a browser, a mobile
//! OS). This module describes the three primitives the session needs from it:
//!
//! 1. `request_device(filters)`: discovery, possibly showing a picker
//! 2. `connect(device)`: open the link
//! 3. `write_channel(link, service, characteristic)`: resolve the writable endpoint
//!
//! and the single primitive a channel must offer: an acknowledged `write`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// One discovery filter. A device matches a filter list if it matches any entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    /// Device advertises this GATT service.
    Service(Uuid),
    /// Device name starts with this prefix.
    NamePrefix(String),
}

impl DeviceFilter {
    pub fn matches(&self, name: Option<&str>, services: &[Uuid]) -> bool {
        match self {
            Self::Service(uuid) => services.contains(uuid),
            Self::NamePrefix(prefix) => name.is_some_and(|n| n.starts_with(prefix.as_str())),
        }
    }
}

/// A device returned by discovery, with whatever it advertised.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice<D> {
    pub name: Option<String>,
    pub services: Vec<Uuid>,
    pub handle: D,
}

/// Failures reported by a host adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No wireless support on this host.
    #[error("link technology unavailable")]
    Unsupported,

    /// The user dismissed the device picker.
    #[error("cancelled by user")]
    Cancelled,

    /// Discovery found nothing that matched.
    #[error("no device found")]
    NotFound,

    /// The link dropped.
    #[error("link lost")]
    LinkLost,

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

/// Discovery and connection primitives of a host wireless stack.
#[async_trait]
pub trait DeviceHost: Send + Sync {
    /// Opaque device handle returned by discovery.
    type Device: Send;
    /// Open link to a device.
    type Link: Send;
    /// Writable endpoint bound to one characteristic.
    type Channel: WriteChannel;

    async fn request_device(
        &self,
        filters: &[DeviceFilter],
    ) -> Result<DiscoveredDevice<Self::Device>, HostError>;

    async fn connect(&self, device: Self::Device) -> Result<Self::Link, HostError>;

    /// Resolve the write channel. The channel takes ownership of the link.
    async fn write_channel(
        &self,
        link: Self::Link,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<Self::Channel, HostError>;
}

/// An acknowledged, ordered byte sink.
///
/// `write` resolves once the peer acknowledged the payload. Implementations
/// need not support concurrent writes; callers await each one.
#[async_trait]
pub trait WriteChannel: Send {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), HostError>;

    /// Release the link. Must not fail; errors are swallowed by the adapter.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_prefix_filter() {
        let filter = DeviceFilter::NamePrefix("M02".into());
        assert!(filter.matches(Some("M02-1234"), &[]));
        assert!(!filter.matches(Some("XM02"), &[]));
        assert!(!filter.matches(None, &[]));
    }

    #[test]
    fn test_service_filter() {
        let uuid = Uuid::from_u128(0x18f0);
        let filter = DeviceFilter::Service(uuid);
        assert!(filter.matches(None, &[uuid]));
        assert!(!filter.matches(Some("M02"), &[]));
    }
}
