//! # Printer Configuration
//!
//! This module defines the capability profiles of supported thermal printers
//! and the tunables of a device session.
//!
//! ## Supported Printers
//!
//! | Model | Service | Characteristic | Name prefixes | Chunk |
//! |-------|---------|----------------|---------------|-------|
//! | Phomemo M02 | `18f0` | `2af1` | `Phomemo`, `M02` | 20 B |
//!
//! ## Usage
//!
//! ```
//! use verso::printer::PrinterProfile;
//!
//! let profile = PrinterProfile::phomemo_m02();
//! assert!(profile.matches(Some("M02 Pro"), &[]));
//! assert_eq!(profile.max_chunk_bytes, 20);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VersoError;
use crate::transport::DeviceFilter;

/// GATT service advertised by Phomemo printers.
pub const PHOMEMO_SERVICE: Uuid = Uuid::from_u128(0x000018f0_0000_1000_8000_00805f9b34fb);

/// Write characteristic under [`PHOMEMO_SERVICE`].
pub const PHOMEMO_CHARACTERISTIC: Uuid = Uuid::from_u128(0x00002af1_0000_1000_8000_00805f9b34fb);

/// Default ATT payload: MTU 23 minus the 3-byte write header.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 20;

/// Default delay between chunks (milliseconds)
pub const CHUNK_DELAY_MS: u64 = 2;

/// Default time the user has to pick a device (seconds)
pub const DISCOVERY_TIMEOUT_SECS: u64 = 60;

/// Default time allowed to open the link (seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// PRINTER PROFILE
// ============================================================================

/// # Printer Profile
///
/// Immutable descriptor of one supported printer family. Discovery matches a
/// device against a profile when the device advertises `service_uuid` or its
/// name starts with one of `name_prefixes`.
///
/// ## Link Tuning
///
/// - **max_chunk_bytes**: largest payload written per characteristic write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Printer family name
    pub name: String,

    /// Primary GATT service
    pub service_uuid: Uuid,

    /// Writable characteristic under `service_uuid`
    pub characteristic_uuid: Uuid,

    /// Advertised device name prefixes
    #[serde(default)]
    pub name_prefixes: Vec<String>,

    /// Maximum bytes per write
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,
}

fn default_max_chunk_bytes() -> usize {
    DEFAULT_MAX_CHUNK_BYTES
}

impl PrinterProfile {
    /// # Phomemo M02
    ///
    /// 53mm pocket thermal printer, 203 DPI, Bluetooth LE.
    pub fn phomemo_m02() -> Self {
        Self {
            name: "Phomemo M02".to_string(),
            service_uuid: PHOMEMO_SERVICE,
            characteristic_uuid: PHOMEMO_CHARACTERISTIC,
            name_prefixes: vec!["Phomemo".to_string(), "M02".to_string()],
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
        }
    }

    /// Discovery filters for this profile: the service first, then each
    /// name prefix.
    pub fn filters(&self) -> Vec<DeviceFilter> {
        std::iter::once(DeviceFilter::Service(self.service_uuid))
            .chain(
                self.name_prefixes
                    .iter()
                    .map(|prefix| DeviceFilter::NamePrefix(prefix.clone())),
            )
            .collect()
    }

    /// Whether a discovered device passes any of [`filters`](Self::filters).
    pub fn matches(&self, device_name: Option<&str>, services: &[Uuid]) -> bool {
        self.filters()
            .iter()
            .any(|filter| filter.matches(device_name, services))
    }

    /// Check the profile is usable.
    pub fn validate(&self) -> Result<(), VersoError> {
        if self.max_chunk_bytes == 0 {
            return Err(VersoError::InvalidConfiguration(format!(
                "profile '{}': max_chunk_bytes must be at least 1",
                self.name
            )));
        }
        if self.name_prefixes.iter().any(|p| p.is_empty()) {
            return Err(VersoError::InvalidConfiguration(format!(
                "profile '{}': empty name prefix would match every device",
                self.name
            )));
        }
        Ok(())
    }

    /// List all built-in profiles.
    pub fn built_in() -> Vec<Self> {
        vec![Self::phomemo_m02()]
    }

    /// Parse a JSON array of profiles, validating each one.
    pub fn parse_list(json: &str) -> Result<Vec<Self>, VersoError> {
        let profiles: Vec<Self> = serde_json::from_str(json)
            .map_err(|e| VersoError::InvalidConfiguration(format!("profile list: {}", e)))?;
        if profiles.is_empty() {
            return Err(VersoError::InvalidConfiguration(
                "profile list is empty".to_string(),
            ));
        }
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(profiles)
    }

    /// Load a JSON profile list from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<Self>, VersoError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| VersoError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse_list(&json)
    }
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::phomemo_m02()
    }
}

// ============================================================================
// SESSION CONFIGURATION
// ============================================================================

/// Timeouts and pacing for a [`DeviceSession`](crate::session::DeviceSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Upper bound on device discovery (including the user picking a device).
    pub discovery_timeout: Duration,
    /// Upper bound on opening the link and the write channel.
    pub connect_timeout: Duration,
    /// Pause after each acknowledged chunk.
    pub chunk_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(DISCOVERY_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
