//! # Printer Module
//!
//! This module provides printer capability profiles and session tunables.
//!
//! ## Modules
//!
//! - [`config`]: Printer profiles and session configuration

pub mod config;

pub use config::{PrinterProfile, SessionConfig};
