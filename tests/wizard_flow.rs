//! End-to-end wizard flows
//!
//! - A full walk through all three steps with a stub submitter
//! - Submission over HTTP to the real endpoint on an ephemeral port
//! - Endpoint failures surfacing as a banner with values kept
//!
//! ```bash
//! cargo test --test wizard_flow -- --nocapture
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use stepform::rest;
use stepform::submit::{Ack, HttpSubmitter, Submitter};
use stepform::wizard::{Banner, FieldValue, FormValues, SubmitFailure, WizardSession};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Records what it was asked to submit
#[derive(Default)]
struct RecordingSubmitter {
    calls: AtomicUsize,
    last: Mutex<Option<FormValues>>,
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, values: &FormValues) -> Result<Ack, SubmitFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(values.clone());
        Ok(Ack::new("Form submitted successfully"))
    }
}

fn fill_personal(session: &mut WizardSession) {
    session.edit("name", "Ada Lovelace").unwrap();
    session.edit("email", "ada@example.com").unwrap();
    session.edit("dob", "1815-12-10").unwrap();
}

fn fill_address(session: &mut WizardSession) {
    session.edit("address1", "12 St James's Square").unwrap();
    session.edit("city", "Austin").unwrap();
    session.edit("state", "Texas").unwrap();
    session.edit("zip", "73301").unwrap();
}

fn fill_account(session: &mut WizardSession) {
    session.edit("username", "ada").unwrap();
    session.edit("password", "Engine1843").unwrap();
    session.edit("confirmPassword", "Engine1843").unwrap();
    session.edit("terms", true).unwrap();
}

fn session_on_final_step() -> WizardSession {
    let mut session = WizardSession::default();
    fill_personal(&mut session);
    session.advance().unwrap();
    fill_address(&mut session);
    session.advance().unwrap();
    fill_account(&mut session);
    session
}

/// Serve the real router on an ephemeral port
async fn spawn_endpoint() -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        rest::serve_listener(listener, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    (format!("http://{}", addr), tx)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_walk_submits_every_value() {
    let submitter = RecordingSubmitter::default();
    let mut session = WizardSession::default();

    // Step 1 rejects blanks and keeps the user on the step
    let failure = session.advance().unwrap_err();
    assert_eq!(session.step(), 1);
    assert_eq!(
        failure.failure("name").unwrap().message,
        "Name is required"
    );

    fill_personal(&mut session);
    session.advance().unwrap();
    assert_eq!(session.step(), 2);
    assert!((session.progress() - 0.5).abs() < f64::EPSILON);

    // Going back keeps what was entered
    session.retreat();
    assert_eq!(session.state().value("email"), &FieldValue::from("ada@example.com"));
    session.advance().unwrap();

    fill_address(&mut session);
    session.advance().unwrap();
    assert_eq!(session.step(), 3);

    fill_account(&mut session);
    let ack = session.submit(&submitter).await.unwrap();

    assert_eq!(ack.message, "Form submitted successfully");
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    let sent = submitter.last.lock().unwrap().clone().unwrap();
    assert_eq!(sent.len(), 13);
    assert_eq!(sent["terms"], FieldValue::Flag(true));
    assert_eq!(sent["phone"], FieldValue::Empty);

    assert_eq!(session.step(), 1);
    assert_eq!(session.state().value("name"), &FieldValue::Empty);
    assert_eq!(
        session.banner(),
        Some(&Banner::Success("Form submitted successfully".to_string()))
    );
}

#[tokio::test]
async fn test_mismatched_passwords_block_submission() {
    let submitter = RecordingSubmitter::default();
    let mut session = session_on_final_step();
    session.edit("confirmPassword", "Engine1844").unwrap();

    let err = session.submit(&submitter).await.unwrap_err();

    assert_eq!(err, SubmitFailure::Invalid(1));
    assert_eq!(
        session.state().error("confirmPassword"),
        Some("Passwords do not match")
    );
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submit_over_http_to_endpoint() {
    let (base, shutdown) = spawn_endpoint().await;
    let submitter = HttpSubmitter::new(
        format!("{}{}", base, rest::SUBMIT_PATH),
        Some(Duration::from_secs(5)),
    )
    .unwrap();

    let mut session = session_on_final_step();
    let ack = session.submit(&submitter).await.unwrap();

    assert_eq!(ack.message, "Form submitted successfully");
    assert_eq!(session.step(), 1);
    assert!(!session.is_in_flight());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_endpoint_rejection_keeps_values() {
    let (base, shutdown) = spawn_endpoint().await;
    let submitter = HttpSubmitter::new(format!("{}/api/missing", base), None).unwrap();

    let mut session = session_on_final_step();
    let err = session.submit(&submitter).await.unwrap_err();

    assert!(matches!(err, SubmitFailure::Rejected { status: 404, .. }));
    assert_eq!(session.step(), 3);
    assert_eq!(session.state().value("username"), &FieldValue::from("ada"));
    assert!(matches!(session.banner(), Some(Banner::Failure(_))));
    assert!(!session.is_in_flight());

    // Retry against the right path succeeds
    let submitter = HttpSubmitter::new(format!("{}{}", base, rest::SUBMIT_PATH), None).unwrap();
    session.submit(&submitter).await.unwrap();
    assert_eq!(session.step(), 1);

    let _ = shutdown.send(());
}
