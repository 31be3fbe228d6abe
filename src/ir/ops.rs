//! # IR Opcodes
//!
//! A print job lowers to a flat, ordered list of [`Op`]s. Control codes and
//! text interleave in the printed stream, so there is no header/body split:
//! the list order is the byte order.

use crate::protocol::text::{Alignment, Style};

/// One printer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    // ========== Printer Control ==========
    /// `ESC @`: back to power-on defaults.
    Init,

    /// `ESC i`: cut (or mark the tear point on cutterless models).
    Cut,

    /// Advance `lines` empty lines.
    Feed { lines: u8 },

    // ========== Modes ==========
    /// Alignment for the following lines.
    SetAlign(Alignment),

    /// Character size for the following text.
    SetStyle(Style),

    // ========== Content ==========
    /// UTF-8 text, no implicit line break.
    Text(String),

    /// `LF`.
    Newline,
}

/// Ops of one job, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// A program that starts by resetting the printer.
    pub fn with_init() -> Self {
        Self {
            ops: vec![Op::Init],
        }
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
