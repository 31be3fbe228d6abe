//! # Bluetooth RFCOMM Host (Linux)
//!
//! A [`DeviceHost`] backed by BlueZ command-line tools and an RFCOMM TTY.
//! Phomemo printers expose a serial port profile next to their GATT service,
//! so on Linux the simplest reliable path is:
//!
//! 1. `bluetoothctl devices`: list known devices, pick the first that
//!    matches a filter (service filters cannot match here, names can)
//! 2. `rfcomm bind`: create `/dev/rfcommN` for the device, unless one
//!    is already bound
//! 3. Open the TTY in raw mode and write chunks to it
//!
//! ## Bluetooth Setup (Linux)
//!
//! The printer must be paired once:
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# scan on
//! # Look for "Phomemo" or "M02"
//! [bluetooth]# pair DC:0D:30:XX:XX:XX
//! ```
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode to ensure binary data is
//! transmitted without modification:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::host::{DeviceFilter, DeviceHost, DiscoveredDevice, HostError, WriteChannel};

/// Default RFCOMM device index (`/dev/rfcomm0`)
pub const DEFAULT_RFCOMM_INDEX: u8 = 0;

/// # RFCOMM Host
///
/// Discovers paired printers through `bluetoothctl` and talks to them over
/// an RFCOMM TTY.
#[derive(Debug, Clone)]
pub struct RfcommHost {
    rfcomm_index: u8,
}

impl RfcommHost {
    /// Bind printers to `/dev/rfcomm{index}` when no binding exists yet.
    pub fn new(rfcomm_index: u8) -> Self {
        Self { rfcomm_index }
    }
}

impl Default for RfcommHost {
    fn default() -> Self {
        Self::new(DEFAULT_RFCOMM_INDEX)
    }
}

#[async_trait]
impl DeviceHost for RfcommHost {
    /// MAC address
    type Device = String;
    /// TTY path
    type Link = String;
    type Channel = RfcommChannel;

    async fn request_device(
        &self,
        filters: &[DeviceFilter],
    ) -> Result<DiscoveredDevice<String>, HostError> {
        if !cfg!(unix) {
            return Err(HostError::Unsupported);
        }

        let output = tokio::process::Command::new("bluetoothctl")
            .arg("devices")
            .output()
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => HostError::Unsupported,
                _ => HostError::Failed(format!("Failed to run bluetoothctl: {}", e)),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        check_listing(output.status.success(), &stdout, &stderr)?;
        let devices = parse_bluetoothctl_devices(&stdout);
        debug!(count = devices.len(), "bluetoothctl listed devices");

        devices
            .into_iter()
            .find(|(_, name)| filters.iter().any(|f| f.matches(Some(name), &[])))
            .map(|(mac, name)| DiscoveredDevice {
                name: Some(name),
                services: Vec::new(),
                handle: mac,
            })
            .ok_or(HostError::NotFound)
    }

    async fn connect(&self, mac: String) -> Result<String, HostError> {
        let index = self.rfcomm_index;
        tokio::task::spawn_blocking(move || {
            if let Some(path) = find_rfcomm_for_mac(&mac)? {
                info!(%mac, %path, "reusing existing rfcomm binding");
                return Ok(path);
            }
            setup_rfcomm(&mac, index)
        })
        .await
        .map_err(|e| HostError::Failed(format!("Task error: {}", e)))?
    }

    async fn write_channel(
        &self,
        path: String,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<RfcommChannel, HostError> {
        // SPP has no GATT addressing; the ids only identify the profile.
        debug!(%path, %service, %characteristic, "opening rfcomm channel");

        let file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| HostError::Failed(format!("Failed to open {}: {}", path, e)))?;

        configure_tty_raw(&file)?;

        Ok(RfcommChannel {
            file: Some(tokio::fs::File::from_std(file)),
            path,
        })
    }
}

/// Raw-mode RFCOMM TTY.
#[derive(Debug)]
pub struct RfcommChannel {
    file: Option<tokio::fs::File>,
    path: String,
}

#[async_trait]
impl WriteChannel for RfcommChannel {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), HostError> {
        let file = self.file.as_mut().ok_or(HostError::LinkLost)?;
        file.write_all(bytes).await.map_err(map_write_error)?;
        // A flush is the closest thing a TTY has to an acknowledgment.
        file.flush().await.map_err(map_write_error)?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                warn!(path = %self.path, error = %e, "flush on close failed");
            }
        }
    }
}

/// Classify a TTY write error. RFCOMM reports a dropped link as EIO or a
/// hang-up style error; everything else is a plain transmit failure.
fn map_write_error(e: io::Error) -> HostError {
    let link_gone = matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    ) || e.raw_os_error() == Some(libc::EIO);

    if link_gone {
        HostError::LinkLost
    } else {
        HostError::Failed(format!("Write failed: {}", e))
    }
}

/// Configure a TTY for raw mode.
///
/// This disables all input/output processing so binary data passes through
/// unmodified.
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control. 0x11 and
/// 0x13 can appear inside UTF-8 text and must not be swallowed.
#[cfg(unix)]
fn configure_tty_raw(file: &fs::File) -> Result<(), HostError> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(HostError::Failed(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(HostError::Failed(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &fs::File) -> Result<(), HostError> {
    Err(HostError::Unsupported)
}

// ============================================================================
// BLUEZ HELPERS
// ============================================================================

/// Parse `bluetoothctl devices` output into `(mac, name)` pairs.
///
/// Lines look like `Device DC:0D:30:12:34:56 M02 Pro`.
pub fn parse_bluetoothctl_devices(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("Device ")?;
            let (mac, name) = rest.split_once(' ')?;
            if !is_valid_mac(mac) {
                return None;
            }
            Some((mac.to_uppercase(), name.trim().to_string()))
        })
        .collect()
}

/// Turn a failed `bluetoothctl devices` run into an error instead of an
/// empty listing.
fn check_listing(success: bool, stdout: &str, stderr: &str) -> Result<(), HostError> {
    if stdout.contains("No default controller") || stderr.contains("No default controller") {
        return Err(HostError::Unsupported);
    }
    if !success {
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(HostError::Failed(format!(
            "bluetoothctl devices failed: {}",
            detail.trim()
        )));
    }
    Ok(())
}

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Extract the device path from an rfcomm listing line bound to `mac`.
///
/// Format: `rfcomm0: DC:0D:30:12:34:56 channel 1 clean`
fn rfcomm_path_for_line(line: &str, mac_upper: &str) -> Option<String> {
    if !line.to_uppercase().contains(mac_upper) {
        return None;
    }
    let dev_name = line.split(':').next()?.trim();
    Some(format!("/dev/{}", dev_name))
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Checks `/proc/net/rfcomm` and falls back to `rfcomm -a`.
fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, HostError> {
    let mac_upper = mac.to_uppercase();

    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        let found = contents
            .lines()
            .filter_map(|line| rfcomm_path_for_line(line, &mac_upper))
            .find(|path| Path::new(path).exists());
        if found.is_some() {
            return Ok(found);
        }
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => HostError::Unsupported,
            _ => HostError::Failed(format!("Failed to run 'rfcomm -a': {}", e)),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter_map(|line| rfcomm_path_for_line(line, &mac_upper))
        .find(|path| Path::new(path).exists()))
}

/// Set up an RFCOMM device for a Bluetooth MAC address.
///
/// Runs:
/// 1. `bluetoothctl connect <MAC>` - connect to device
/// 2. `rfcomm bind <index> <MAC> 1` - create /dev/rfcommN
///
/// **Requires root privileges** for `rfcomm bind`.
fn setup_rfcomm(mac: &str, index: u8) -> Result<String, HostError> {
    let mac_upper = mac.to_uppercase();
    let device_path = format!("/dev/rfcomm{}", index);

    info!(mac = %mac_upper, "connecting");
    let output = Command::new("bluetoothctl")
        .arg("connect")
        .arg(&mac_upper)
        .output()
        .map_err(|e| HostError::Failed(format!("Failed to run bluetoothctl: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.contains("Connection successful") || stdout.contains("already connected") {
        debug!("bluetoothctl connected");
    } else {
        // rfcomm bind below is the real check
        warn!(output = %stdout.trim(), "bluetoothctl connect did not confirm");
    }

    thread::sleep(Duration::from_millis(500));

    info!(%device_path, "binding rfcomm");
    let output = Command::new("rfcomm")
        .arg("bind")
        .arg(index.to_string())
        .arg(&mac_upper)
        .arg("1") // RFCOMM channel 1 (standard for SPP)
        .output()
        .map_err(|e| HostError::Failed(format!("Failed to run rfcomm bind: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Failed(format!(
            "rfcomm bind failed: {}",
            stderr.trim()
        )));
    }

    thread::sleep(Duration::from_millis(500));

    if !Path::new(&device_path).exists() {
        return Err(HostError::Failed(format!(
            "Device {} was not created",
            device_path
        )));
    }

    Ok(device_path)
}

// ============================================================================
// TESTS
// ============================================================================
