//! Server state and configuration.

use crate::printer::PrinterProfile;
use crate::session::DeviceSession;
use crate::transport::DeviceHost;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

/// Application state shared across handlers.
pub struct AppState<H: DeviceHost> {
    /// The one printer session of this process.
    pub session: DeviceSession<H>,
    /// Candidate profiles for discovery, in priority order.
    pub profiles: Vec<PrinterProfile>,
}

impl<H: DeviceHost> AppState<H> {
    pub fn new(session: DeviceSession<H>, profiles: Vec<PrinterProfile>) -> Self {
        Self { session, profiles }
    }
}
