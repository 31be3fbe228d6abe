//! # Code Generation
//!
//! Converts IR programs to ESC/POS protocol bytes.

use super::ops::{Op, Program};
use crate::protocol::{commands, text};

/// The fully encoded output of one print job.
///
/// Immutable once produced. Control codes and UTF-8 text are interleaved, so
/// the stream is only meaningful as a whole, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandStream(Vec<u8>);

impl CommandStream {
    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the stream, returning the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for CommandStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CommandStream {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Program {
    /// Compile the IR program to ESC/POS bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for op in &self.ops {
            match op {
                // ===== Printer Control =====
                Op::Init => {
                    out.extend(commands::init());
                }
                Op::Cut => {
                    out.extend(commands::cut());
                }
                Op::Feed { lines } => {
                    out.extend(commands::feed_lines(*lines));
                }

                // ===== Style Changes =====
                Op::SetAlign(align) => {
                    out.extend(text::align(*align));
                }
                Op::SetStyle(style) => {
                    out.extend(text::style(*style));
                }

                // ===== Content =====
                Op::Text(s) => {
                    out.extend(s.as_bytes());
                }
                Op::Newline => {
                    out.push(commands::LF);
                }
            }
        }

        out
    }

    /// Compile the IR program into an immutable [`CommandStream`].
    pub fn compile(&self) -> CommandStream {
        CommandStream(self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::text::{Alignment, Style};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_program() {
        let program = Program::default();
        assert!(program.to_bytes().is_empty());
        assert!(program.compile().is_empty());
    }

    #[test]
    fn test_init_only() {
        let program = Program::with_init();
        assert_eq!(program.to_bytes(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_simple_text() {
        let mut program = Program::with_init();
        program.push(Op::Text("Hello".into()));
        program.push(Op::Newline);

        let mut expected = vec![0x1B, 0x40];
        expected.extend(b"Hello\n");
        assert_eq!(program.to_bytes(), expected);
    }

    #[test]
    fn test_styled_text() {
        let mut program = Program::default();
        program.push(Op::SetAlign(Alignment::Center));
        program.push(Op::SetStyle(Style::Double));
        program.push(Op::Text("BIG".into()));
        program.push(Op::SetStyle(Style::Normal));

        assert_eq!(
            program.to_bytes(),
            vec![
                0x1B, 0x61, 0x01, // center
                0x1B, 0x21, 0x10, // double
                b'B', b'I', b'G', //
                0x1B, 0x21, 0x00, // normal
            ]
        );
    }

    #[test]
    fn test_non_ascii_text_is_utf8() {
        let mut program = Program::default();
        program.push(Op::Text("✨".into()));
        assert_eq!(program.to_bytes(), "✨".as_bytes().to_vec());
        assert_eq!(program.to_bytes(), vec![0xE2, 0x9C, 0xA8]);
    }

    #[test]
    fn test_feed_and_cut() {
        let mut program = Program::default();
        program.push(Op::Feed { lines: 2 });
        program.push(Op::Cut);
        assert_eq!(program.to_bytes(), vec![0x0A, 0x0A, 0x1B, 0x69]);
    }

    #[test]
    fn test_command_stream_accessors() {
        let stream = CommandStream::from(vec![1, 2, 3]);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.as_bytes(), &[1, 2, 3]);
        assert_eq!(stream.as_ref(), &[1, 2, 3]);
        assert_eq!(stream.into_bytes(), vec![1, 2, 3]);
    }
}
