//! # ESC/POS Protocol Implementation
//!
//! This module provides low-level command builders for the ESC/POS dialect
//! spoken by Phomemo thermal printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printer control (init, feed, cut)
//! - [`text`]: Text styling (alignment, print mode)
//!
//! ## Usage Example
//!
//! ```
//! use verso::protocol::{commands, text::{self, Alignment}};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(Alignment::Center));
//! data.extend("HELLO\n".as_bytes());
//! data.extend(commands::cut());
//!
//! assert_eq!(&data[..2], &[0x1B, 0x40]);
//! assert_eq!(&data[data.len() - 2..], &[0x1B, 0x69]);
//! ```

pub mod commands;
pub mod text;
