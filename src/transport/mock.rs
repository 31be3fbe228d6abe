//! # In-Memory Host
//!
//! A scripted [`DeviceHost`] that records every write instead of printing.
//! Used by the test suite and by the CLI's `--simulate` flag to dry-run a job
//! without hardware.
//!
//! ```
//! use verso::transport::{MockHost, DeviceHost, DeviceFilter, WriteChannel};
//! use uuid::Uuid;
//!
//! # tokio_test_block(async {
//! let host = MockHost::with_device("M02-ABCD");
//! let device = host.request_device(&[DeviceFilter::NamePrefix("M02".into())]).await.unwrap();
//! let link = host.connect(device.handle).await.unwrap();
//! let mut channel = host.write_channel(link, Uuid::nil(), Uuid::nil()).await.unwrap();
//! channel.write(&[0x1B, 0x40]).await.unwrap();
//! assert_eq!(host.written_bytes(), vec![0x1B, 0x40]);
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::host::{DeviceFilter, DeviceHost, DiscoveredDevice, HostError, WriteChannel};

#[derive(Debug)]
struct MockState {
    device: Result<(Option<String>, Vec<Uuid>), HostError>,
    connect_error: Option<HostError>,
    channel_error: Option<HostError>,
    write_failure: Option<(usize, HostError)>,
    discovery_delay: Duration,
    write_delay: Duration,
    filters_seen: Vec<DeviceFilter>,
    channel_ids: Option<(Uuid, Uuid)>,
    writes: Vec<Vec<u8>>,
    attempts: usize,
    in_flight: usize,
    max_in_flight: usize,
    closed: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            device: Err(HostError::NotFound),
            connect_error: None,
            channel_error: None,
            write_failure: None,
            discovery_delay: Duration::ZERO,
            write_delay: Duration::ZERO,
            filters_seen: Vec::new(),
            channel_ids: None,
            writes: Vec::new(),
            attempts: 0,
            in_flight: 0,
            max_in_flight: 0,
            closed: 0,
        }
    }
}

/// Scripted host. Cheap to clone; clones share the recorded state.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<MockState>>,
}

impl MockHost {
    /// A host whose discovery finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A host that discovers one device with the given name.
    pub fn with_device(name: &str) -> Self {
        let host = Self::default();
        host.lock().device = Ok((Some(name.to_string()), Vec::new()));
        host
    }

    /// A host that discovers one unnamed device advertising `services`.
    pub fn with_services(services: Vec<Uuid>) -> Self {
        let host = Self::default();
        host.lock().device = Ok((None, services));
        host
    }

    /// Discovery fails with `error`.
    pub fn discovery_error(self, error: HostError) -> Self {
        self.lock().device = Err(error);
        self
    }

    /// Connecting fails with `error`.
    pub fn connect_error(self, error: HostError) -> Self {
        self.lock().connect_error = Some(error);
        self
    }

    /// Resolving the write channel fails with `error`.
    pub fn channel_error(self, error: HostError) -> Self {
        self.lock().channel_error = Some(error);
        self
    }

    /// The `n`th write (1-based) fails with `error`.
    pub fn fail_write(self, n: usize, error: HostError) -> Self {
        self.lock().write_failure = Some((n, error));
        self
    }

    /// Discovery takes `delay` before answering.
    pub fn discovery_delay(self, delay: Duration) -> Self {
        self.lock().discovery_delay = delay;
        self
    }

    /// Every write takes `delay` before acknowledging.
    pub fn write_delay(self, delay: Duration) -> Self {
        self.lock().write_delay = delay;
        self
    }

    /// Acknowledged writes, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// All acknowledged bytes concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.lock().writes.concat()
    }

    /// Number of write calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// Highest number of writes observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    /// Number of times a channel was closed.
    pub fn closed(&self) -> usize {
        self.lock().closed
    }

    /// Filters passed to the last discovery.
    pub fn filters_seen(&self) -> Vec<DeviceFilter> {
        self.lock().filters_seen.clone()
    }

    /// Service and characteristic of the last resolved channel.
    pub fn channel_ids(&self) -> Option<(Uuid, Uuid)> {
        self.lock().channel_ids
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DeviceHost for MockHost {
    type Device = ();
    type Link = ();
    type Channel = MockChannel;

    async fn request_device(
        &self,
        filters: &[DeviceFilter],
    ) -> Result<DiscoveredDevice<()>, HostError> {
        let delay = {
            let mut state = self.lock();
            state.filters_seen = filters.to_vec();
            state.discovery_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (name, services) = self.lock().device.clone()?;
        if !filters.iter().any(|f| f.matches(name.as_deref(), &services)) {
            return Err(HostError::NotFound);
        }
        Ok(DiscoveredDevice {
            name,
            services,
            handle: (),
        })
    }

    async fn connect(&self, _device: ()) -> Result<(), HostError> {
        match self.lock().connect_error.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn write_channel(
        &self,
        _link: (),
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<MockChannel, HostError> {
        let mut state = self.lock();
        if let Some(e) = state.channel_error.clone() {
            return Err(e);
        }
        state.channel_ids = Some((service, characteristic));
        Ok(MockChannel {
            state: Arc::clone(&self.state),
        })
    }
}

/// Channel handed out by [`MockHost`].
#[derive(Debug)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl WriteChannel for MockChannel {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), HostError> {
        let (delay, failure) = {
            let mut state = lock(&self.state);
            state.attempts += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            let failure = match &state.write_failure {
                Some((n, e)) if *n == state.attempts => Some(e.clone()),
                _ => None,
            };
            (state.write_delay, failure)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        state.in_flight -= 1;
        if let Some(e) = failure {
            return Err(e);
        }
        state.writes.push(bytes.to_vec());
        Ok(())
    }

    async fn close(&mut self) {
        lock(&self.state).closed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_host_finds_nothing() {
        let host = MockHost::empty();
        let result = host
            .request_device(&[DeviceFilter::NamePrefix("M02".into())])
            .await;
        assert_eq!(result.unwrap_err(), HostError::NotFound);
    }

    #[tokio::test]
    async fn test_device_must_match_filters() {
        let host = MockHost::with_device("Star TSP650II");
        let result = host
            .request_device(&[DeviceFilter::NamePrefix("M02".into())])
            .await;
        assert_eq!(result.unwrap_err(), HostError::NotFound);
    }

    #[tokio::test]
    async fn test_scripted_write_failure() {
        let host = MockHost::with_device("M02").fail_write(2, HostError::Failed("nak".into()));
        let mut channel = host.write_channel((), Uuid::nil(), Uuid::nil()).await.unwrap();
        assert!(channel.write(b"a").await.is_ok());
        assert!(channel.write(b"b").await.is_err());
        assert!(channel.write(b"c").await.is_ok());
        assert_eq!(host.writes(), vec![b"a".to_vec(), b"c".to_vec()]);
        assert_eq!(host.attempts(), 3);
    }
}
