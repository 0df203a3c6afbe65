//! Binding against a real adapter process
//!
//! Uses the `mock_adapter` binary built alongside the crate, which verifies
//! source breakpoints up to line 1000 and rejects anything past that.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bpbind::breakpoint::{DocumentRef, PathResolver};
use bpbind::common::config::Config;
use bpbind::session::DapSession;
use bpbind::{BreakpointRequest, Engine, Error, PendingState, RemoteSession, SessionBridge};
use tempfile::TempDir;

fn mock_config() -> Config {
    let adapter = env!("CARGO_BIN_EXE_mock_adapter");
    let toml = format!(
        r#"
[adapters.mock]
path = '{}'
language = "r"

[timeouts]
dap_initialize_secs = 5
dap_request_secs = 5
"#,
        adapter
    );
    Config::parse(&toml).unwrap()
}

fn script(dir: &TempDir, name: &str, lines: usize) -> PathBuf {
    let path = dir.path().join(name);
    let body: String = (1..=lines).map(|i| format!("x{} <- {}\n", i, i)).collect();
    std::fs::write(&path, body).unwrap();
    path.canonicalize().unwrap()
}

async fn launch(program: &Path) -> DapSession {
    DapSession::launch(&mock_config(), Some("mock".to_string()), program, Vec::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_launch_reports_capabilities() {
    let dir = TempDir::new().unwrap();
    let program = script(&dir, "main.r", 3);

    let session = launch(&program).await;
    assert_eq!(session.adapter_name(), "mock");
    assert!(session.capabilities().supports_configuration_done_request);

    session.configuration_done().await.unwrap();
    session.terminate().await.unwrap();
}

#[tokio::test]
async fn test_lines_accumulate_per_file() {
    let dir = TempDir::new().unwrap();
    let main = script(&dir, "main.r", 20);
    let util = script(&dir, "util.r", 20);

    let session = launch(&main).await;
    session.add_breakpoint(&main, 10).await.unwrap();
    session.add_breakpoint(&main, 3).await.unwrap();
    session.add_breakpoint(&util, 7).await.unwrap();

    assert_eq!(session.placed_lines(&main).await, vec![3, 10]);
    assert_eq!(session.placed_lines(&util).await, vec![7]);

    session.terminate().await.unwrap();
}

#[tokio::test]
async fn test_unverified_breakpoint_is_an_error() {
    let dir = TempDir::new().unwrap();
    let main = script(&dir, "main.r", 3);

    let session = launch(&main).await;
    let err = session.add_breakpoint(&main, 5000).await.unwrap_err();
    assert!(matches!(err, Error::BreakpointFailed { .. }));
    assert!(err.to_string().contains("past the end"));

    // Placement is still attempted on the next setBreakpoints
    session.add_breakpoint(&main, 2).await.unwrap();
    assert_eq!(session.placed_lines(&main).await, vec![2, 5000]);

    session.terminate().await.unwrap();
}

#[tokio::test]
async fn test_unknown_adapter_fails_to_launch() {
    let dir = TempDir::new().unwrap();
    let main = script(&dir, "main.r", 3);

    let err = DapSession::launch(
        &mock_config(),
        Some("bpbind-no-such-adapter".to_string()),
        &main,
        Vec::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::AdapterNotFound { .. }));
}

#[test]
fn test_engine_binds_through_adapter() {
    let dir = TempDir::new().unwrap();
    let main = script(&dir, "main.r", 12);

    let bridge = SessionBridge::dedicated().unwrap();
    let session = {
        let main = main.clone();
        let config = mock_config();
        bridge
            .block_on(async move {
                DapSession::launch(&config, Some("mock".to_string()), &main, Vec::new()).await
            })
            .unwrap()
    };
    let session = Arc::new(session);
    let engine = Engine::new(
        "r",
        session.clone(),
        Arc::new(PathResolver::with_base(dir.path())),
        bridge.clone(),
    );

    let bp = engine
        .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("main.r:10")))
        .unwrap();
    assert!(bp.bind());

    let bound = bp.enumerate_bound().next().unwrap();
    assert_eq!(bound.line(), 10);
    assert_eq!(bound.file(), main.as_path());
    assert_eq!(bound.state_at_bind(), PendingState::Enabled);

    let placed = {
        let session = session.clone();
        let main = main.clone();
        bridge
            .block_on(async move { Ok(session.placed_lines(&main).await) })
            .unwrap()
    };
    assert_eq!(placed, vec![10]);

    // Deleting after bind leaves the adapter's breakpoint in place
    bp.delete();
    assert!(bp.enumerate_bound().is_empty());

    bridge
        .block_on(async move { session.terminate().await })
        .unwrap();
}
