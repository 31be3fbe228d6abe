//! # ESC/POS Printer Control Commands
//!
//! This module implements the mechanical control codes understood by the
//! Phomemo M02 family (and most ESC/POS-compatible thermal printers).
//!
//! ## Protocol Overview
//!
//! Commands are byte sequences introduced by ESC (0x1B). Anything that is not
//! part of a command is printable text, so control codes and UTF-8 text are
//! freely interleaved in a single stream:
//!
//! ```text
//! ESC @  ESC a 1  "HELLO\n"  ESC i
//! └init┘ └center┘ └─text──┘  └cut┘
//! ```
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`, `ESC i`
//! - Three bytes with parameter: `ESC a n`, `ESC ! n` (see [`super::text`])

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// Every control code in this protocol begins with ESC (0x1B). This byte
/// signals the start of a control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Sent at the start of
/// every job so a previous, possibly aborted, job cannot leak styling.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
/// | Decimal | 27 64 |
///
/// ## What Gets Reset
///
/// - Print buffer is cleared
/// - Character size and emphasis reset to normal
/// - Alignment reset to left
///
/// ## Example
///
/// ```
/// use verso::protocol::commands;
///
/// let init = commands::init();
/// assert_eq!(init, vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// CUTTER CONTROL COMMANDS
// ============================================================================

/// # Cut Paper (ESC i)
///
/// Cuts (or, on cutter-less models such as the M02, marks the tear-off point
/// of) the paper at the current position.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC i |
/// | Hex     | 1B 69 |
/// | Decimal | 27 105 |
///
/// ## Behavior
///
/// - Prints any pending data in the line buffer first
/// - Does not feed; use [`feed_lines`] before cutting to clear the print head
#[inline]
pub fn cut() -> Vec<u8> {
    vec![ESC, b'i']
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Feed Blank Lines (LF × n)
///
/// Advances the paper by `n` lines using bare line feeds. Line feeds are used
/// instead of `ESC d n` because every printer in the supported family accepts
/// them, and they keep the stream readable in hex dumps.
///
/// ## Example
///
/// ```
/// use verso::protocol::commands;
///
/// assert_eq!(commands::feed_lines(3), vec![0x0A, 0x0A, 0x0A]);
/// assert!(commands::feed_lines(0).is_empty());
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![LF; n as usize]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(), vec![0x1B, 0x69]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(1), vec![0x0A]);
        assert_eq!(feed_lines(4), vec![0x0A, 0x0A, 0x0A, 0x0A]);
        assert_eq!(feed_lines(0), Vec::<u8>::new());
    }
}
