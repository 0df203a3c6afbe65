//! Remote sessions that breakpoints are bound into
//!
//! A session is shared by every pending breakpoint of an engine and is only
//! ever asked to add breakpoints.

mod bridge;
pub mod dap;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{Error, Result};

pub use bridge::SessionBridge;
pub use dap::DapSession;

/// Thread-safe reference to a remote session
pub type RemoteSessionRef = Arc<dyn RemoteSession>;

/// A running execution context that can place breakpoints
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Place a breakpoint at a one-based line of `file`
    ///
    /// Any error (timeout, disconnect, rejected location) leaves the
    /// breakpoint unbound.
    async fn add_breakpoint(&self, file: &Path, line: u32) -> Result<()>;
}

/// Session used when no debuggee is attached
///
/// Every placement fails, so breakpoints created against it stay pending.
#[derive(Debug, Default)]
pub struct NullSession;

#[async_trait]
impl RemoteSession for NullSession {
    async fn add_breakpoint(&self, _file: &Path, _line: u32) -> Result<()> {
        Err(Error::SessionUnavailable(
            "no debug session is attached".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_session_rejects_every_breakpoint() {
        let err = NullSession
            .add_breakpoint(Path::new("main.r"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SessionUnavailable(_)));
    }
}
