//! # Intermediate Representation (IR)
//!
//! This module provides the IR layer for print jobs. The IR is a "bytecode"
//! representation that sits between a [`PrintJob`](crate::job::PrintJob)
//! and the raw ESC/POS byte stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────┐     ┌───────────────┐
//! │  PrintJob   │ ──► │     IR      │ ──► │ Codegen  │ ──► │ CommandStream │
//! │(declarative)│     │  (Vec<Op>)  │     │          │     │   (bytes)     │
//! └─────────────┘     └─────────────┘     └──────────┘     └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use verso::ir::{Op, Program};
//! use verso::protocol::text::Alignment;
//!
//! let mut program = Program::with_init();
//! program.push(Op::SetAlign(Alignment::Center));
//! program.push(Op::Text("HELLO".into()));
//! program.push(Op::Newline);
//! program.push(Op::Cut);
//!
//! let stream = program.compile();
//! assert_eq!(&stream.as_bytes()[..5], &[0x1B, 0x40, 0x1B, 0x61, 0x01]);
//! ```

mod codegen;
mod ops;

pub use codegen::CommandStream;
pub use ops::*;
