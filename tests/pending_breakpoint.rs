//! Pending breakpoint lifecycle through the public API
//!
//! These tests drive the engine from plain threads, the way a synchronous
//! front-end does, with in-process fake sessions standing in for the
//! debug adapter.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use bpbind::breakpoint::{DocumentPosition, DocumentRef, LocationKind, LocationResolver};
use bpbind::{
    BreakpointRequest, Engine, Error, PendingState, RemoteSession, Result, SessionBridge,
};
use tokio::sync::Notify;

/// Resolves every reference to main.r, lines 9..=9 (zero-based)
struct MainResolver;

impl LocationResolver for MainResolver {
    fn resolve(&self, document: &DocumentRef) -> Result<DocumentPosition> {
        match document.as_str() {
            "main.r:10" => Ok(DocumentPosition::new("main.r", 9, 9)),
            other => Err(Error::unresolved(other, "unknown document")),
        }
    }
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(PathBuf, u32)>>,
}

#[async_trait]
impl RemoteSession for Recorder {
    async fn add_breakpoint(&self, file: &Path, line: u32) -> Result<()> {
        self.calls.lock().unwrap().push((file.to_path_buf(), line));
        Ok(())
    }
}

/// Session that reports each call and then waits to be released
struct GatedSession {
    called: Mutex<mpsc::Sender<()>>,
    gate: Notify,
}

#[async_trait]
impl RemoteSession for GatedSession {
    async fn add_breakpoint(&self, _file: &Path, _line: u32) -> Result<()> {
        self.called.lock().unwrap().send(()).ok();
        self.gate.notified().await;
        Ok(())
    }
}

fn engine(session: Arc<dyn RemoteSession>) -> Engine {
    Engine::new(
        "r",
        session,
        Arc::new(MainResolver),
        SessionBridge::dedicated().unwrap(),
    )
}

#[test]
fn test_bind_main_r_reports_one_based_line() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine(recorder.clone());

    let bp = engine
        .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("main.r:10")))
        .unwrap();
    assert_eq!(bp.state(), PendingState::Enabled);
    assert!(bp.can_bind());
    assert!(bp.bind());

    assert_eq!(
        *recorder.calls.lock().unwrap(),
        vec![(PathBuf::from("main.r"), 10)]
    );

    let mut bound = bp.enumerate_bound();
    assert_eq!(bound.total(), 1);
    let first = bound.next().unwrap();
    assert_eq!(first.line(), 10);
    assert_eq!(first.file(), Path::new("main.r"));
    assert_eq!(first.state_at_bind(), PendingState::Enabled);
    assert!(first.pending_breakpoint().is_some());

    // A second bind reuses the bound breakpoint
    assert!(bp.bind());
    assert_eq!(recorder.calls.lock().unwrap().len(), 1);
    assert_eq!(bp.enumerate_bound().next().unwrap(), first);
}

#[test]
fn test_other_location_kinds_stay_pending() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine(recorder.clone());

    let request = BreakpointRequest::new("r", LocationKind::FunctionOffset, DocumentRef::new("main"));
    let bp = engine.create_pending_breakpoint(request).unwrap();

    assert!(!bp.can_bind());
    assert!(!bp.bind());
    assert!(bp.enumerate_bound().is_empty());
    assert!(recorder.calls.lock().unwrap().is_empty());

    // Still a live pending breakpoint
    bp.disable().unwrap();
    assert_eq!(bp.state(), PendingState::Disabled);
    bp.enable(true).unwrap();
    assert_eq!(bp.state(), PendingState::Enabled);
    assert!(matches!(bp.enumerate_errors(), Err(Error::NotImplemented(_))));
}

#[test]
fn test_wrong_language_is_rejected() {
    let engine = engine(Arc::new(Recorder::default()));
    let err = engine
        .create_pending_breakpoint(BreakpointRequest::file_line("python", DocumentRef::new("main.r:10")))
        .unwrap_err();
    assert!(matches!(err, Error::LanguageMismatch { .. }));
}

#[test]
fn test_disabled_binding_is_remembered_on_bound_breakpoint() {
    let engine = engine(Arc::new(Recorder::default()));
    let bp = engine
        .create_pending_breakpoint(
            BreakpointRequest::file_line("r", DocumentRef::new("main.r:10")).disabled(),
        )
        .unwrap();
    assert_eq!(bp.state(), PendingState::Disabled);
    assert!(bp.bind());

    bp.enable(true).unwrap();
    let bound = bp.enumerate_bound().next().unwrap();
    assert_eq!(bound.state_at_bind(), PendingState::Disabled);
}

#[test]
fn test_delete_while_bind_in_flight_discards_result() {
    let (called_tx, called_rx) = mpsc::channel();
    let session = Arc::new(GatedSession {
        called: Mutex::new(called_tx),
        gate: Notify::new(),
    });
    let engine = engine(session.clone());
    let bp = engine
        .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("main.r:10")))
        .unwrap();

    let binder = {
        let bp = bp.clone();
        thread::spawn(move || bp.bind())
    };

    called_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("session was never asked to place the breakpoint");

    // The state lock is not held while the session works
    bp.delete();
    assert_eq!(bp.state(), PendingState::Deleted);
    session.gate.notify_one();

    assert!(!binder.join().unwrap());
    assert!(bp.enumerate_bound().is_empty());
    assert!(!bp.bind());
    assert!(matches!(bp.enable(true), Err(Error::ContractViolation(_))));
}

#[test]
fn test_concurrent_binds_produce_one_bound_breakpoint() {
    let recorder = Arc::new(Recorder::default());
    let engine = engine(recorder.clone());
    let bp = engine
        .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("main.r:10")))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let bp = bp.clone();
            thread::spawn(move || bp.bind())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(bp.enumerate_bound().total(), 1);
}
