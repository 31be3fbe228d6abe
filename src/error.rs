//! # Error Types
//!
//! This module defines error types used throughout the verso library.
//!
//! Nothing in the library retries on failure. A print job that fails midway
//! may already have advanced paper, so retrying is always an explicit,
//! caller-initiated re-run of the whole job.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for verso operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersoError {
    /// The host has no usable wireless link technology.
    #[error("Bluetooth is not supported on this host")]
    NotSupported,

    /// The user dismissed device discovery.
    #[error("Device selection was cancelled")]
    UserCancelled,

    /// Discovery finished without a device matching any profile.
    #[error("No matching printer found")]
    NoDeviceFound,

    /// A device was found but the link could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A connection attempt is already running, or the session is connected.
    #[error("A connection attempt is already in progress")]
    AlreadyInProgress,

    /// Another send is using the channel.
    #[error("Printer is busy with another job")]
    Busy,

    /// The session is not connected.
    #[error("Printer is not connected")]
    NotConnected,

    /// A chunk write failed. Output before `offset` may already be printed.
    #[error("Transmit failed at byte {offset}: {reason}")]
    TransmitFailed { offset: usize, reason: String },

    /// The link dropped; the session is back to idle.
    #[error("Connection to the printer was lost")]
    LinkLost,

    /// The job has nothing to print.
    #[error("Nothing to print: content is empty")]
    EmptyContent,

    /// A profile or setting is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP server error.
    #[error("Server error: {0}")]
    Server(String),
}

impl From<std::io::Error> for VersoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Stage of a print request in which a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Discovery,
    Connect,
    Encode,
    Send,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discovery => "discovery",
            Self::Connect => "connect",
            Self::Encode => "encode",
            Self::Send => "send",
        })
    }
}

/// A [`VersoError`] tagged with the phase it occurred in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{phase} failed: {source}")]
pub struct JobError {
    pub phase: Phase,
    #[source]
    pub source: VersoError,
}

impl JobError {
    pub fn new(phase: Phase, source: VersoError) -> Self {
        Self { phase, source }
    }

    /// A short, actionable message for display.
    pub fn hint(&self) -> &'static str {
        match &self.source {
            VersoError::NotSupported => "Use a host with a Bluetooth adapter.",
            VersoError::UserCancelled => "Pick a printer to continue.",
            VersoError::NoDeviceFound => {
                "Make sure the printer is turned on and in pairing mode."
            }
            VersoError::ConnectionFailed(_) | VersoError::LinkLost => {
                "Move closer to the printer and reconnect."
            }
            VersoError::AlreadyInProgress | VersoError::Busy => "Wait for the current job to finish.",
            VersoError::NotConnected => "Connect to a printer first.",
            VersoError::TransmitFailed { .. } => {
                "Part of the job may have printed. Reprint it if needed."
            }
            VersoError::EmptyContent => "Generate or enter some text first.",
            VersoError::InvalidConfiguration(_) | VersoError::Io(_) | VersoError::Server(_) => {
                "Check the printer profile configuration."
            }
        }
    }
}
