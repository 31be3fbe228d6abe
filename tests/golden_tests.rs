//! # Golden Tests
//!
//! These tests pin the exact bytes the encoder produces for the built-in jobs
//! and check how those bytes reach the printer.
//!
//! ## Test Coverage
//!
//! - **Byte-exact streams**: poem and self-test jobs, assembled by hand from
//!   the control codes they are made of
//! - **Chunking**: chunk counts and reassembly for the same streams
//! - **End to end**: connect, print and disconnect against the in-memory host

use pretty_assertions::assert_eq;
use std::time::Duration;

use verso::job::{ContentKind, PrintJob, TEST_BODY, encode};
use verso::printer::{PrinterProfile, SessionConfig};
use verso::session::{DeviceSession, SessionState};
use verso::transport::{Chunk, HostError, MockHost, chunk};
use verso::{Phase, VersoError, orchestrator};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const INIT: &[u8] = &[0x1B, 0x40];
const CENTER: &[u8] = &[0x1B, 0x61, 0x01];
const LEFT: &[u8] = &[0x1B, 0x61, 0x00];
const DOUBLE: &[u8] = &[0x1B, 0x21, 0x10];
const NORMAL: &[u8] = &[0x1B, 0x21, 0x00];
const CUT: &[u8] = &[0x1B, 0x69];

/// Assemble a stream from its segments.
fn stream(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn reassemble(chunks: &[Chunk<'_>]) -> Vec<u8> {
    chunks.iter().flat_map(|c| c.bytes.iter().copied()).collect()
}

fn fast_session(host: &MockHost) -> DeviceSession<MockHost> {
    let config = SessionConfig {
        chunk_delay: Duration::ZERO,
        ..SessionConfig::default()
    };
    DeviceSession::new(host.clone(), config)
}

// ============================================================================
// BYTE-EXACT STREAMS
// ============================================================================

#[test]
fn test_binary_poem() {
    let job = PrintJob::generated(ContentKind::Poem, "Roses are red");

    let expected = stream(&[
        INIT,
        CENTER,
        DOUBLE,
        "✨ POEM ✨\n".as_bytes(),
        NORMAL,
        CENTER,
        b"\n",
        b"Roses are red",
        b"\n\n",
        CENTER,
        "🎉 Enjoy your party! 🎉\n".as_bytes(),
        b"\n\n\n\n",
        CUT,
    ]);

    assert_eq!(encode(&job).into_bytes(), expected);
    assert_eq!(expected.len(), 80);
}

#[test]
fn test_binary_poem_hex() {
    // Same stream as above, spelled out byte by byte.
    let expected: Vec<u8> = vec![
        0x1B, 0x40, 0x1B, 0x61, 0x01, 0x1B, 0x21, 0x10, // init, center, double
        0xE2, 0x9C, 0xA8, b' ', b'P', b'O', b'E', b'M', b' ', 0xE2, 0x9C, 0xA8, b'\n',
        0x1B, 0x21, 0x00, 0x1B, 0x61, 0x01, b'\n', // normal, body alignment
        b'R', b'o', b's', b'e', b's', b' ', b'a', b'r', b'e', b' ', b'r', b'e', b'd',
        b'\n', b'\n', 0x1B, 0x61, 0x01, // footer is centered
        0xF0, 0x9F, 0x8E, 0x89, b' ', b'E', b'n', b'j', b'o', b'y', b' ', b'y', b'o', b'u',
        b'r', b' ', b'p', b'a', b'r', b't', b'y', b'!', b' ', 0xF0, 0x9F, 0x8E, 0x89, b'\n',
        b'\n', b'\n', b'\n', b'\n', 0x1B, 0x69,
    ];

    let job = PrintJob::generated(ContentKind::Poem, "Roses are red");
    assert_eq!(encode(&job).into_bytes(), expected);
}

#[test]
fn test_binary_self_test() {
    let expected = stream(&[
        INIT,
        CENTER,
        DOUBLE,
        "🎉 THERMAL POETRY PRINTER 🎉\n".as_bytes(),
        NORMAL,
        LEFT,
        b"\n",
        TEST_BODY.as_bytes(),
        b"\n\n",
        CENTER,
        "Test completed! ✨\n".as_bytes(),
        b"\n\n\n\n",
        CUT,
    ]);

    assert_eq!(encode(&PrintJob::self_test()).into_bytes(), expected);
    assert_eq!(expected.len(), 303);
}

#[test]
fn test_fortune_differs_only_in_title_and_body() {
    let poem = encode(&PrintJob::generated(ContentKind::Poem, "a")).into_bytes();
    let fortune = encode(&PrintJob::generated(ContentKind::Fortune, "a")).into_bytes();

    // Same preamble; everything after the title line is identical too.
    assert_eq!(&poem[..8], &fortune[..8]);
    assert_eq!(&poem[poem.len() - 47..], &fortune[fortune.len() - 47..]);
    assert_eq!(fortune.len(), poem.len() + 3);
}

// ============================================================================
// CHUNKING
// ============================================================================

#[test]
fn test_chunk_self_test_stream() {
    let bytes = encode(&PrintJob::self_test()).into_bytes();
    let chunks: Vec<_> = chunk(&bytes, 20).unwrap().collect();

    assert_eq!(chunks.len(), 16);
    assert!(chunks[..15].iter().all(|c| c.len() == 20));
    assert_eq!(chunks[15].len(), 3);
    assert_eq!(reassemble(&chunks), bytes);
}

#[test]
fn test_chunk_poem_stream_exact_fit() {
    let bytes = encode(&PrintJob::generated(ContentKind::Poem, "Roses are red")).into_bytes();
    let chunks: Vec<_> = chunk(&bytes, 20).unwrap().collect();

    assert_eq!(chunks.len(), 4);
    assert!(chunks.iter().all(|c| c.len() == 20));
    assert_eq!(chunks.iter().map(|c| c.offset).collect::<Vec<_>>(), vec![0, 20, 40, 60]);
}

#[test]
fn test_chunk_zero_max_is_rejected() {
    let bytes = encode(&PrintJob::self_test()).into_bytes();
    assert!(matches!(
        chunk(&bytes, 0),
        Err(VersoError::InvalidConfiguration(_))
    ));
}

// ============================================================================
// END TO END
// ============================================================================

#[tokio::test]
async fn test_print_self_test_end_to_end() {
    let host = MockHost::with_device("M02-1234");
    let session = fast_session(&host);

    let profile = orchestrator::connect(&session, &PrinterProfile::built_in())
        .await
        .unwrap();
    assert_eq!(profile.name, "Phomemo M02");
    assert_eq!(session.state(), SessionState::Connected);

    orchestrator::print_test(&session).await.unwrap();

    let writes = host.writes();
    assert_eq!(writes.len(), 16);
    assert!(writes.iter().all(|w| w.len() <= 20));
    assert_eq!(host.written_bytes(), encode(&PrintJob::self_test()).into_bytes());
    assert_eq!(host.max_in_flight(), 1);

    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(host.closed(), 1);
}

#[tokio::test]
async fn test_transmit_failure_on_third_chunk() {
    let host = MockHost::with_device("M02").fail_write(3, HostError::Failed("gatt".into()));
    let session = fast_session(&host);
    orchestrator::connect(&session, &PrinterProfile::built_in())
        .await
        .unwrap();

    let err = orchestrator::print_test(&session).await.unwrap_err();

    assert_eq!(err.phase, Phase::Send);
    assert!(matches!(
        err.source,
        VersoError::TransmitFailed { offset: 40, .. }
    ));
    assert_eq!(host.attempts(), 3);
    assert_eq!(host.writes().len(), 2);
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_reprint_after_transmit_failure_is_caller_driven() {
    let host = MockHost::with_device("M02").fail_write(1, HostError::Failed("gatt".into()));
    let session = fast_session(&host);
    orchestrator::connect(&session, &PrinterProfile::built_in())
        .await
        .unwrap();

    assert!(orchestrator::print_test(&session).await.is_err());
    assert_eq!(host.attempts(), 1);

    // The failure is one-shot; running the job again sends it whole.
    orchestrator::print_test(&session).await.unwrap();
    assert_eq!(host.written_bytes(), encode(&PrintJob::self_test()).into_bytes());
}
