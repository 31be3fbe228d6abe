//! # Print Jobs
//!
//! A [`PrintJob`] describes *what* to print; [`encode`] decides *how* the
//! bytes are framed. Every job shares one control-code skeleton:
//!
//! ```text
//! ESC @  ESC a 1  ESC ! 0x10  "✨ TITLE ✨\n"  ESC ! 0x00  ESC a n
//! "\n" body "\n\n"  ESC a 1  footer "\n"  "\n\n\n\n"  ESC i
//! ```
//!
//! New job types only need a `(label, body, alignment)` triple; the skeleton
//! never changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ir::{CommandStream, Op, Program};
use crate::protocol::text::{Alignment, Style};

/// Ornament wrapped around the title of generated content.
pub const SPARKLE: &str = "✨";

/// Ornament wrapped around the self-test banner.
pub const PARTY: &str = "🎉";

/// Closing line printed under generated content.
pub const PARTY_FOOTER: &str = "🎉 Enjoy your party! 🎉";

/// Banner printed at the top of the self-test page.
pub const TEST_BANNER: &str = "THERMAL POETRY PRINTER";

/// Closing line printed under the self-test page.
pub const TEST_FOOTER: &str = "Test completed! ✨";

/// Body of the self-test page.
pub const TEST_BODY: &str = "🎉 THERMAL POETRY PRINTER 🎉

This is a test print to verify
your printer connection is working!

✨ Features:
• AI-generated poems
• Custom fortunes
• Party-ready content
• Easy printing

Enjoy your party! 🎊";

/// Blank lines fed after the footer so the printed area clears the tear bar.
pub const TRAILING_FEED_LINES: u8 = 4;

// ============================================================================
// CONTENT KINDS
// ============================================================================

/// Kind of generated content a job carries. Used as the job's title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    Poem,
    Fortune,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poem => "poem",
            Self::Fortune => "fortune",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poem" => Ok(Self::Poem),
            "fortune" => Ok(Self::Fortune),
            other => Err(format!(
                "Unknown content kind '{}'. Use 'poem' or 'fortune'",
                other
            )),
        }
    }
}

// ============================================================================
// PRINT JOB
// ============================================================================

/// A logical request to print a titled body of text.
///
/// Created per print request and consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    /// Title text; printed upper-cased, double size, centered.
    pub label: String,
    /// Body text, printed verbatim.
    pub body: String,
    /// Alignment of the body.
    pub alignment: Alignment,
    /// Marker placed on both sides of the title.
    pub ornament: String,
    /// Closing decorative line, always centered.
    pub footer: String,
}

impl PrintJob {
    /// A job with the default party decoration.
    pub fn new(label: impl Into<String>, body: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
            alignment,
            ornament: SPARKLE.to_string(),
            footer: PARTY_FOOTER.to_string(),
        }
    }

    /// A job carrying generated content (poem, fortune, ...), centered.
    pub fn generated(kind: ContentKind, text: impl Into<String>) -> Self {
        Self::new(kind.as_str(), text, Alignment::Center)
    }

    /// The built-in printer self-test page.
    pub fn self_test() -> Self {
        Self::new(TEST_BANNER, TEST_BODY, Alignment::Left)
            .ornament(PARTY)
            .footer(TEST_FOOTER)
    }

    /// Replace the title ornament.
    pub fn ornament(mut self, ornament: impl Into<String>) -> Self {
        self.ornament = ornament.into();
        self
    }

    /// Replace the closing line.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// The decorated title line, without the trailing newline.
    pub fn title(&self) -> String {
        format!(
            "{} {} {}",
            self.ornament,
            self.label.to_uppercase(),
            self.ornament
        )
    }

    /// Lower the job to IR.
    pub fn program(&self) -> Program {
        let mut program = Program::with_init();

        // Title banner
        program.push(Op::SetAlign(Alignment::Center));
        program.push(Op::SetStyle(Style::Double));
        program.push(Op::Text(self.title()));
        program.push(Op::Newline);
        program.push(Op::SetStyle(Style::Normal));

        // Body
        program.push(Op::SetAlign(self.alignment));
        program.push(Op::Newline);
        program.push(Op::Text(self.body.clone()));
        program.push(Op::Newline);
        program.push(Op::Newline);

        // Footer, feed, cut
        program.push(Op::SetAlign(Alignment::Center));
        program.push(Op::Text(self.footer.clone()));
        program.push(Op::Newline);
        program.push(Op::Feed {
            lines: TRAILING_FEED_LINES,
        });
        program.push(Op::Cut);

        program
    }
}

/// Encode a job into the printer's control-code stream.
///
/// Pure and total: any body, including empty, multi-line or non-ASCII text,
/// produces a valid stream.
///
/// ## Example
///
/// ```
/// use verso::job::{ContentKind, PrintJob, encode};
///
/// let stream = encode(&PrintJob::generated(ContentKind::Poem, "Roses are red"));
/// let bytes = stream.as_bytes();
/// assert_eq!(&bytes[..8], &[0x1B, 0x40, 0x1B, 0x61, 0x01, 0x1B, 0x21, 0x10]);
/// assert_eq!(&bytes[bytes.len() - 2..], &[0x1B, 0x69]);
/// ```
pub fn encode(job: &PrintJob) -> CommandStream {
    job.program().compile()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn position(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_poem_scenario() {
        let job = PrintJob::generated(ContentKind::Poem, "Roses are red");
        let stream = encode(&job);
        let bytes = stream.as_bytes();

        assert_eq!(
            &bytes[..8],
            &[0x1B, 0x40, 0x1B, 0x61, 0x01, 0x1B, 0x21, 0x10]
        );
        let title = position(bytes, "✨ POEM ✨\n".as_bytes()).unwrap();
        let body = position(bytes, b"Roses are red").unwrap();
        assert!(title < body);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x1B, 0x69]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let job = PrintJob::generated(ContentKind::Fortune, "You will find a sock");
        assert_eq!(encode(&job), encode(&job));
        assert_eq!(encode(&job), encode(&job.clone()));
    }

    #[test]
    fn test_generated_job_is_centered() {
        let job = PrintJob::generated(ContentKind::Fortune, "x");
        assert_eq!(job.alignment, Alignment::Center);
        assert_eq!(job.title(), "✨ FORTUNE ✨");
    }

    #[test]
    fn test_self_test_job_layout() {
        let job = PrintJob::self_test();
        assert_eq!(job.alignment, Alignment::Left);
        assert_eq!(job.title(), "🎉 THERMAL POETRY PRINTER 🎉");

        let bytes = encode(&job).into_bytes();
        // normal style immediately followed by left alignment
        assert!(contains(&bytes, &[0x1B, 0x21, 0x00, 0x1B, 0x61, 0x00]));
        assert!(contains(&bytes, "Test completed! ✨\n".as_bytes()));
    }

    #[test]
    fn test_empty_body_still_encodes() {
        let job = PrintJob::new("blank", "", Alignment::Left);
        let bytes = encode(&job).into_bytes();
        assert_eq!(&bytes[..2], &[0x1B, 0x40]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x1B, 0x69]);
    }

    #[test]
    fn test_non_ascii_body_passes_through() {
        let body = "Ünïcödé 🌹\nzweite Zeile\u{FFFF}";
        let job = PrintJob::generated(ContentKind::Poem, body);
        assert!(contains(encode(&job).as_bytes(), body.as_bytes()));
    }

    #[test]
    fn test_custom_job_reuses_skeleton() {
        let job = PrintJob::new("haiku", "old pond", Alignment::Right);
        let program = job.program();
        let generated = PrintJob::generated(ContentKind::Poem, "old pond").program();
        assert_eq!(program.len(), generated.len());
        assert!(program.ops.contains(&Op::SetAlign(Alignment::Right)));
    }

    #[test]
    fn test_program_ends_with_feed_and_cut() {
        let program = PrintJob::self_test().program();
        let tail: Vec<_> = program.ops[program.len() - 2..].to_vec();
        assert_eq!(
            tail,
            vec![
                Op::Feed {
                    lines: TRAILING_FEED_LINES
                },
                Op::Cut
            ]
        );
    }

    #[test]
    fn test_content_kind_parse() {
        assert_eq!("poem".parse::<ContentKind>(), Ok(ContentKind::Poem));
        assert_eq!("FORTUNE".parse::<ContentKind>(), Ok(ContentKind::Fortune));
        assert!("limerick".parse::<ContentKind>().is_err());
        assert_eq!(ContentKind::Fortune.to_string(), "fortune");
    }
}
