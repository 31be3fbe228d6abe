//! # ESC/POS Text Styling Commands
//!
//! This module implements the text formatting commands used by the encoder.
//!
//! ## Text Styling Overview
//!
//! | Style | Command | Effect |
//! |-------|---------|--------|
//! | Alignment | ESC a n | Left / center / right justification |
//! | Print mode | ESC ! n | Character size and emphasis bit field |
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```
//!
//! ## Text Encoding
//!
//! Text is sent as UTF-8 inline between control codes. The printer firmware
//! decides how to render code points it has no glyph for; the encoder never
//! special-cases them.

use serde::{Deserialize, Serialize};

use super::commands::ESC;

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Set Text Alignment (ESC a n)
///
/// Sets the alignment for subsequent text lines.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
/// | Decimal | 27 97 n |
///
/// ## Parameters
///
/// - `n = 0`: Left alignment (default)
/// - `n = 1`: Center alignment
/// - `n = 2`: Right alignment
///
/// ## Behavior
///
/// - Affects all subsequent text until changed
/// - Takes effect at start of next line
/// - Reset by ESC @ (initialize)
///
/// ## Example
///
/// ```
/// use verso::protocol::text::{Alignment, align};
///
/// let center = align(Alignment::Center);
/// assert_eq!(center, vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// PRINT MODE (CHARACTER SIZE)
// ============================================================================

/// Character print modes selectable with `ESC ! n`.
///
/// The discriminant is the raw mode byte. Bit 4 (`0x10`) selects double
/// height; the Phomemo firmware renders it as a double-size banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal = 0x00,
    Double = 0x10,
}

/// # Select Print Mode (ESC ! n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC ! n |
/// | Hex     | 1B 21 n |
/// | Decimal | 27 33 n |
///
/// ## Example
///
/// ```
/// use verso::protocol::text::{Style, style};
///
/// assert_eq!(style(Style::Double), vec![0x1B, 0x21, 0x10]);
/// assert_eq!(style(Style::Normal), vec![0x1B, 0x21, 0x00]);
/// ```
pub fn style(style: Style) -> Vec<u8> {
    vec![ESC, b'!', style as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_style() {
        assert_eq!(style(Style::Double), vec![0x1B, 0x21, 0x10]);
        assert_eq!(style(Style::Normal), vec![0x1B, 0x21, 0x00]);
    }

    #[test]
    fn test_alignment_serde_names() {
        let json = serde_json::to_string(&Alignment::Center).unwrap();
        assert_eq!(json, "\"center\"");
        let parsed: Alignment = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(parsed, Alignment::Left);
    }
}
