//! # Device Session
//!
//! The single owner of the link to a physical printer.
//!
//! ## State Machine
//!
//! ```text
//!        discover_and_connect              send
//! Idle ──► Discovering ──► Connecting ──► Connected ◄──► Sending
//!  ▲            │               │             │             │
//!  │            └───────────────┴─────────────┴─────────────┘
//!  │                 failure / cancel / disconnect / link loss
//!  └──────────────────────── Disconnecting ◄─┘
//! ```
//!
//! ## Rules
//!
//! - Nothing is written unless the session is `Connected`.
//! - One link operation at a time: a second connect fails with
//!   `AlreadyInProgress`, a second send with `Busy`.
//! - Chunks are written one at a time, each awaited, in offset order.
//! - Nothing is retried. Paper that already moved stays moved.
//! - A cancelled (dropped) connect or send leaves no half-open state behind.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::VersoError;
use crate::ir::CommandStream;
use crate::printer::{PrinterProfile, SessionConfig};
use crate::transport::{DeviceFilter, DeviceHost, HostError, WriteChannel, chunk};

/// Lifecycle state of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Discovering,
    Connecting,
    Connected,
    Sending,
    Disconnecting,
}

struct Inner<C> {
    state: SessionState,
    profile: Option<PrinterProfile>,
    channel: Option<C>,
    /// Operation-in-progress flag for connect and send.
    busy: bool,
    /// Bumped whenever the link is torn down, so in-flight operations can
    /// tell that the session they started on is gone.
    epoch: u64,
}

impl<C> Inner<C> {
    /// Forget the link. The caller owns closing the returned channel.
    fn reset(&mut self, state: SessionState) -> Option<C> {
        self.epoch += 1;
        self.state = state;
        self.profile = None;
        self.channel.take()
    }
}

fn lock<C>(inner: &Mutex<Inner<C>>) -> MutexGuard<'_, Inner<C>> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// # Device Session
///
/// Owns discovery, connection and the transmit channel for one printer.
/// All methods take `&self`; share the session behind an `Arc`.
///
/// ## Example
///
/// ```
/// use verso::job::{PrintJob, encode};
/// use verso::printer::{PrinterProfile, SessionConfig};
/// use verso::session::{DeviceSession, SessionState};
/// use verso::transport::MockHost;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let host = MockHost::with_device("M02-1234");
/// let session = DeviceSession::new(host.clone(), SessionConfig::default());
///
/// session.discover_and_connect(&PrinterProfile::built_in()).await?;
/// session.send(&encode(&PrintJob::self_test())).await?;
/// session.disconnect().await;
///
/// assert_eq!(session.state(), SessionState::Idle);
/// assert!(!host.written_bytes().is_empty());
/// # Ok::<(), verso::VersoError>(())
/// # }).unwrap();
/// ```
pub struct DeviceSession<H: DeviceHost> {
    host: H,
    config: SessionConfig,
    inner: Mutex<Inner<H::Channel>>,
}

impl<H: DeviceHost> DeviceSession<H> {
    pub fn new(host: H, config: SessionConfig) -> Self {
        Self {
            host,
            config,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                profile: None,
                channel: None,
                busy: false,
                epoch: 0,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        lock(&self.inner).state
    }

    /// Profile bound by the last successful connect, while connected.
    pub fn profile(&self) -> Option<PrinterProfile> {
        lock(&self.inner).profile.clone()
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Connected | SessionState::Sending
        )
    }

    // ========================================================================
    // CONNECT
    // ========================================================================

    /// Discover a printer matching one of `candidates` and connect to it.
    ///
    /// Candidates are tried in order: the first profile whose filters match
    /// the discovered device is bound to the session and returned.
    ///
    /// ## Errors
    ///
    /// - `InvalidConfiguration`: no candidates, or an invalid candidate
    /// - `AlreadyInProgress`: another connect is running, or already connected
    /// - `NotSupported`, `UserCancelled`, `NoDeviceFound`: discovery failed
    /// - `ConnectionFailed`: the device was found but the link could not open
    pub async fn discover_and_connect(
        &self,
        candidates: &[PrinterProfile],
    ) -> Result<PrinterProfile, VersoError> {
        if candidates.is_empty() {
            return Err(VersoError::InvalidConfiguration(
                "no printer profiles to discover".to_string(),
            ));
        }
        for profile in candidates {
            profile.validate()?;
        }

        let guard = ConnectGuard::begin(&self.inner)?;
        let filters = discovery_filters(candidates);
        info!(filters = filters.len(), "discovering printer");

        // ===== Discovery =====
        let device =
            match tokio::time::timeout(self.config.discovery_timeout, self.host.request_device(&filters))
                .await
            {
                Ok(Ok(device)) => device,
                Ok(Err(e)) => return Err(discovery_error(e)),
                Err(_) => {
                    warn!(timeout = ?self.config.discovery_timeout, "discovery timed out");
                    return Err(VersoError::NoDeviceFound);
                }
            };

        let profile = candidates
            .iter()
            .find(|p| p.matches(device.name.as_deref(), &device.services))
            .cloned()
            .ok_or(VersoError::NoDeviceFound)?;
        info!(device = ?device.name, profile = %profile.name, "found printer");

        // ===== Connect =====
        guard.advance(SessionState::Connecting)?;

        let link = match tokio::time::timeout(self.config.connect_timeout, self.host.connect(device.handle))
            .await
        {
            Ok(Ok(link)) => link,
            Ok(Err(e)) => return Err(connect_error(e)),
            Err(_) => return Err(VersoError::ConnectionFailed("connect timed out".to_string())),
        };

        let channel = match tokio::time::timeout(
            self.config.connect_timeout,
            self.host
                .write_channel(link, profile.service_uuid, profile.characteristic_uuid),
        )
        .await
        {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => return Err(connect_error(e)),
            Err(_) => {
                return Err(VersoError::ConnectionFailed(
                    "opening write channel timed out".to_string(),
                ));
            }
        };

        if let Err(mut channel) = guard.commit(channel, profile.clone()) {
            channel.close().await;
            return Err(VersoError::ConnectionFailed(
                "session was disconnected while connecting".to_string(),
            ));
        }

        info!(profile = %profile.name, "connected");
        Ok(profile)
    }

    // ========================================================================
    // SEND
    // ========================================================================

    /// Transmit a command stream, chunk by chunk.
    ///
    /// Each chunk write is awaited before the next is issued. The first
    /// failure aborts the rest of the stream; bytes before the failing
    /// chunk may already be on paper.
    ///
    /// ## Errors
    ///
    /// - `NotConnected`: state is not `Connected`; nothing is written
    /// - `Busy`: another send is in progress; nothing is written
    /// - `TransmitFailed`: a write failed; the session stays connected
    /// - `LinkLost`: the link dropped (or was disconnected) mid-send; the
    ///   session is `Idle`
    pub async fn send(&self, stream: &CommandStream) -> Result<(), VersoError> {
        let (mut guard, max_chunk_bytes) = SendGuard::begin(&self.inner)?;
        let result = self.transmit(&mut guard, stream, max_chunk_bytes).await;

        // Torn down while the last write was in flight: the channel is ours
        // to release.
        if guard.is_stale() {
            guard.close().await;
        }
        result
    }

    async fn transmit(
        &self,
        guard: &mut SendGuard<'_, H::Channel>,
        stream: &CommandStream,
        max_chunk_bytes: usize,
    ) -> Result<(), VersoError> {
        let chunks = chunk(stream.as_bytes(), max_chunk_bytes)?;
        let total = chunks.len();
        info!(bytes = stream.len(), chunks = total, "sending");

        for (index, piece) in chunks.enumerate() {
            if guard.is_stale() {
                warn!(offset = piece.offset, "session disconnected mid-send");
                return Err(VersoError::LinkLost);
            }

            debug!(index, offset = piece.offset, len = piece.len(), "writing chunk");
            match guard.channel()?.write(piece.bytes).await {
                Ok(()) => {}
                Err(HostError::LinkLost) => {
                    warn!(offset = piece.offset, "link lost mid-send");
                    guard.close().await;
                    lock(&self.inner).reset(SessionState::Idle);
                    return Err(VersoError::LinkLost);
                }
                Err(e) => {
                    warn!(offset = piece.offset, error = %e, "chunk write failed");
                    return Err(VersoError::TransmitFailed {
                        offset: piece.offset,
                        reason: e.to_string(),
                    });
                }
            }

            if index + 1 < total && !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }

        debug!("send complete");
        Ok(())
    }

    // ========================================================================
    // DISCONNECT
    // ========================================================================

    /// Tear down the link. Idempotent; always ends `Idle`.
    ///
    /// An in-flight connect or send notices at its next suspension point and
    /// gives up.
    pub async fn disconnect(&self) {
        let channel = {
            let mut inner = lock(&self.inner);
            if inner.state != SessionState::Idle {
                info!(from = ?inner.state, "disconnecting");
            }
            inner.reset(SessionState::Disconnecting)
        };

        let _idle = IdleOnDrop(&self.inner);
        if let Some(mut channel) = channel {
            channel.close().await;
        }
    }

    /// Unsolicited link-loss signal from the host. Forces `Idle`.
    pub fn link_lost(&self) {
        let mut inner = lock(&self.inner);
        if inner.state != SessionState::Idle {
            warn!(from = ?inner.state, "link lost");
        }
        // Nothing to flush on a dead link; dropping the channel releases it.
        drop(inner.reset(SessionState::Idle));
    }
}

// ============================================================================
// OPERATION GUARDS
// ============================================================================

/// Holds the busy flag for a connect attempt. Dropping it without a commit
/// (failure, timeout, cancelled future) puts the session back to `Idle`.
struct ConnectGuard<'a, C> {
    inner: &'a Mutex<Inner<C>>,
    epoch: u64,
    committed: bool,
}

impl<'a, C> ConnectGuard<'a, C> {
    fn begin(inner: &'a Mutex<Inner<C>>) -> Result<Self, VersoError> {
        let mut state = lock(inner);
        if state.busy || state.state != SessionState::Idle {
            return Err(VersoError::AlreadyInProgress);
        }
        state.busy = true;
        state.state = SessionState::Discovering;
        Ok(Self {
            inner,
            epoch: state.epoch,
            committed: false,
        })
    }

    fn advance(&self, next: SessionState) -> Result<(), VersoError> {
        let mut state = lock(self.inner);
        if state.epoch != self.epoch {
            return Err(VersoError::ConnectionFailed(
                "session was disconnected while connecting".to_string(),
            ));
        }
        state.state = next;
        Ok(())
    }

    /// Bind the channel. Hands it back if the session was torn down meanwhile.
    fn commit(mut self, channel: C, profile: PrinterProfile) -> Result<(), C> {
        let mut state = lock(self.inner);
        if state.epoch != self.epoch {
            return Err(channel);
        }
        state.state = SessionState::Connected;
        state.profile = Some(profile);
        state.channel = Some(channel);
        self.committed = true;
        Ok(())
    }
}

impl<C> Drop for ConnectGuard<'_, C> {
    fn drop(&mut self) {
        let mut state = lock(self.inner);
        state.busy = false;
        if !self.committed && state.epoch == self.epoch {
            state.state = SessionState::Idle;
            state.profile = None;
        }
    }
}

/// Holds the busy flag and the checked-out channel for one send. On drop the
/// channel goes back to the session, unless the link was torn down.
struct SendGuard<'a, C> {
    inner: &'a Mutex<Inner<C>>,
    epoch: u64,
    channel: Option<C>,
}

impl<'a, C: WriteChannel> SendGuard<'a, C> {
    fn begin(inner: &'a Mutex<Inner<C>>) -> Result<(Self, usize), VersoError> {
        let mut state = lock(inner);
        match state.state {
            SessionState::Connected if !state.busy => {}
            SessionState::Sending => return Err(VersoError::Busy),
            _ => return Err(VersoError::NotConnected),
        }
        let max_chunk_bytes = state
            .profile
            .as_ref()
            .map(|p| p.max_chunk_bytes)
            .ok_or(VersoError::NotConnected)?;
        let channel = state.channel.take().ok_or(VersoError::NotConnected)?;

        state.busy = true;
        state.state = SessionState::Sending;
        let guard = Self {
            inner,
            epoch: state.epoch,
            channel: Some(channel),
        };
        Ok((guard, max_chunk_bytes))
    }

    fn is_stale(&self) -> bool {
        lock(self.inner).epoch != self.epoch
    }

    fn channel(&mut self) -> Result<&mut C, VersoError> {
        self.channel.as_mut().ok_or(VersoError::LinkLost)
    }

    async fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close().await;
        }
    }
}

impl<C> Drop for SendGuard<'_, C> {
    fn drop(&mut self) {
        let mut state = lock(self.inner);
        state.busy = false;
        if state.epoch != self.epoch {
            return;
        }
        match self.channel.take() {
            Some(channel) => {
                state.channel = Some(channel);
                state.state = SessionState::Connected;
            }
            None => {
                state.reset(SessionState::Idle);
            }
        }
    }
}

struct IdleOnDrop<'a, C>(&'a Mutex<Inner<C>>);

impl<C> Drop for IdleOnDrop<'_, C> {
    fn drop(&mut self) {
        lock(self.0).state = SessionState::Idle;
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// One filter list covering every candidate, in candidate order, deduplicated.
fn discovery_filters(candidates: &[PrinterProfile]) -> Vec<DeviceFilter> {
    let mut filters = Vec::new();
    for filter in candidates.iter().flat_map(PrinterProfile::filters) {
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    filters
}

fn discovery_error(e: HostError) -> VersoError {
    match e {
        HostError::Unsupported => VersoError::NotSupported,
        HostError::Cancelled => VersoError::UserCancelled,
        HostError::NotFound => VersoError::NoDeviceFound,
        HostError::LinkLost | HostError::Failed(_) => VersoError::ConnectionFailed(e.to_string()),
    }
}

fn connect_error(e: HostError) -> VersoError {
    match e {
        HostError::Unsupported => VersoError::NotSupported,
        HostError::Cancelled => VersoError::UserCancelled,
        other => VersoError::ConnectionFailed(other.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
