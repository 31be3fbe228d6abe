//! # Verso - Thermal Poetry Printer Library
//!
//! Verso prints short generated texts (poems, fortunes) on small BLE thermal
//! printers such as the Phomemo M02. It provides:
//!
//! - **Protocol implementation**: ESC/POS command builders
//! - **Print jobs**: a fixed title / body / footer layout, encoded to bytes
//! - **Transport**: MTU-sized chunking and a host abstraction over the radio
//! - **Session**: discover, connect, send, disconnect, one operation at a time
//!
//! ## Quick Start
//!
//! ```no_run
//! use verso::{
//!     orchestrator,
//!     printer::{PrinterProfile, SessionConfig},
//!     session::DeviceSession,
//!     transport::RfcommHost,
//!     PrintJob,
//! };
//! use verso::job::ContentKind;
//!
//! # async fn example() -> Result<(), verso::JobError> {
//! let session = DeviceSession::new(RfcommHost::default(), SessionConfig::default());
//!
//! // Find and bind the printer
//! let profile = orchestrator::connect(&session, &PrinterProfile::built_in()).await?;
//! println!("Connected to {}", profile.name);
//!
//! // Print a poem
//! let job = PrintJob::generated(ContentKind::Poem, "Roses are red");
//! orchestrator::print_now(&session, &job).await?;
//!
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders |
//! | [`ir`] | Op sequence and byte emission |
//! | [`job`] | Print jobs and the encoder |
//! | [`transport`] | Chunking, host traits, RFCOMM and in-memory hosts |
//! | [`session`] | Device session state machine |
//! | [`orchestrator`] | Phase-tagged connect / print flows |
//! | [`printer`] | Printer profiles and session timing |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod error;
pub mod ir;
pub mod job;
pub mod orchestrator;
pub mod printer;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use error::{JobError, Phase, VersoError};
pub use job::{PrintJob, encode};
pub use printer::PrinterProfile;
pub use session::DeviceSession;
