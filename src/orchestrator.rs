//! # Print Job Orchestrator
//!
//! Turns "print this" into encode → send against a [`DeviceSession`], and
//! tags every failure with the phase it came from so the interface can tell
//! the user what to do about it.

use tracing::info;

use crate::error::{JobError, Phase, VersoError};
use crate::job::{PrintJob, encode};
use crate::printer::PrinterProfile;
use crate::session::DeviceSession;
use crate::transport::DeviceHost;

/// Connect `session` to the first printer matching `candidates`.
///
/// Discovery-side failures are tagged [`Phase::Discovery`], link-side
/// failures [`Phase::Connect`].
pub async fn connect<H: DeviceHost>(
    session: &DeviceSession<H>,
    candidates: &[PrinterProfile],
) -> Result<PrinterProfile, JobError> {
    session
        .discover_and_connect(candidates)
        .await
        .map_err(|e| JobError::new(connect_phase(&e), e))
}

/// Print `job` on the connected printer.
///
/// ## Errors
///
/// - [`Phase::Encode`] / `EmptyContent` if the body is empty; nothing is sent
/// - [`Phase::Send`] with the session's error otherwise
pub async fn print_now<H: DeviceHost>(
    session: &DeviceSession<H>,
    job: &PrintJob,
) -> Result<(), JobError> {
    check(job)?;

    let stream = encode(job);
    info!(label = %job.label, bytes = stream.len(), "printing job");

    session
        .send(&stream)
        .await
        .map_err(|e| JobError::new(Phase::Send, e))
}

/// Reject jobs with nothing to print. Needs no printer.
pub fn check(job: &PrintJob) -> Result<(), JobError> {
    if job.body.is_empty() {
        return Err(JobError::new(Phase::Encode, VersoError::EmptyContent));
    }
    Ok(())
}

/// Print the built-in self-test page.
pub async fn print_test<H: DeviceHost>(session: &DeviceSession<H>) -> Result<(), JobError> {
    print_now(session, &PrintJob::self_test()).await
}

fn connect_phase(e: &VersoError) -> Phase {
    match e {
        VersoError::NotSupported | VersoError::UserCancelled | VersoError::NoDeviceFound => {
            Phase::Discovery
        }
        _ => Phase::Connect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ContentKind;
    use crate::printer::SessionConfig;
    use crate::protocol::text::Alignment;
    use crate::transport::{HostError, MockHost};
    use std::time::Duration;

    fn session(host: &MockHost) -> DeviceSession<MockHost> {
        let config = SessionConfig {
            chunk_delay: Duration::ZERO,
            ..SessionConfig::default()
        };
        DeviceSession::new(host.clone(), config)
    }

    #[tokio::test]
    async fn test_empty_body_fails_before_send() {
        let host = MockHost::with_device("M02");
        let session = session(&host);
        connect(&session, &PrinterProfile::built_in()).await.unwrap();

        let job = PrintJob::new("poem", "", Alignment::Center);
        let err = print_now(&session, &job).await.unwrap_err();

        assert_eq!(err.phase, Phase::Encode);
        assert_eq!(err.source, VersoError::EmptyContent);
        assert_eq!(host.attempts(), 0);
    }

    #[test]
    fn test_check_needs_no_session() {
        let err = check(&PrintJob::generated(ContentKind::Poem, "")).unwrap_err();
        assert_eq!(err.phase, Phase::Encode);
        assert!(check(&PrintJob::self_test()).is_ok());
    }

    #[tokio::test]
    async fn test_empty_body_checked_even_when_disconnected() {
        let host = MockHost::empty();
        let session = session(&host);
        let job = PrintJob::generated(ContentKind::Fortune, "");
        let err = print_now(&session, &job).await.unwrap_err();
        assert_eq!(err.source, VersoError::EmptyContent);
    }

    #[tokio::test]
    async fn test_print_now_sends_encoded_job() {
        let host = MockHost::with_device("M02");
        let session = session(&host);
        connect(&session, &PrinterProfile::built_in()).await.unwrap();

        let job = PrintJob::generated(ContentKind::Poem, "Roses are red");
        print_now(&session, &job).await.unwrap();

        assert_eq!(host.written_bytes(), encode(&job).into_bytes());
    }

    #[tokio::test]
    async fn test_print_test_sends_self_test() {
        let host = MockHost::with_device("M02");
        let session = session(&host);
        connect(&session, &PrinterProfile::built_in()).await.unwrap();

        print_test(&session).await.unwrap();

        assert_eq!(
            host.written_bytes(),
            encode(&PrintJob::self_test()).into_bytes()
        );
    }

    #[tokio::test]
    async fn test_send_failures_tagged_send() {
        let host = MockHost::empty();
        let session = session(&host);
        let err = print_test(&session).await.unwrap_err();
        assert_eq!(err.phase, Phase::Send);
        assert_eq!(err.source, VersoError::NotConnected);
    }

    #[tokio::test]
    async fn test_connect_phases() {
        let host = MockHost::empty();
        let err = connect(&session(&host), &PrinterProfile::built_in())
            .await
            .unwrap_err();
        assert_eq!(err.phase, Phase::Discovery);
        assert_eq!(err.source, VersoError::NoDeviceFound);

        let host = MockHost::with_device("M02").connect_error(HostError::Failed("refused".into()));
        let err = connect(&session(&host), &PrinterProfile::built_in())
            .await
            .unwrap_err();
        assert_eq!(err.phase, Phase::Connect);
        assert!(matches!(err.source, VersoError::ConnectionFailed(_)));
    }
}
