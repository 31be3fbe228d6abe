//! # Printer Transport Layer
//!
//! This module provides the link between a [`DeviceSession`](crate::session::DeviceSession)
//! and the host's wireless stack.
//!
//! ## Components
//!
//! - [`chunk`]: splits a command stream into write-sized pieces
//! - [`host`]: the discovery/connect/write boundary the session is written against
//! - [`rfcomm`]: BlueZ + RFCOMM TTY host for Linux
//! - [`mock`]: in-memory host for tests and dry runs

pub mod chunk;
pub mod host;
pub mod mock;
pub mod rfcomm;

pub use chunk::{Chunk, Chunks, chunk};
pub use host::{DeviceFilter, DeviceHost, DiscoveredDevice, HostError, WriteChannel};
pub use mock::{MockChannel, MockHost};
pub use rfcomm::{RfcommChannel, RfcommHost};
