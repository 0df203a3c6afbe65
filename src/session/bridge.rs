//! Blocking bridge from synchronous breakpoint calls to async sessions
//!
//! This is the only place in the crate that blocks a thread on a future.
//! The future is spawned onto the session runtime and the caller parks on a
//! channel until it resolves. If the task is dropped before it finishes
//! (runtime shutdown, panic) the channel closes and the caller gets
//! `Error::SessionCancelled` instead of hanging.

use std::fmt;
use std::future::Future;
use std::sync::{mpsc, Arc};

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

use crate::common::{Error, Result};

/// Runtime owned by a bridge, shut down without blocking when dropped
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Runs remote session futures on behalf of synchronous callers
#[derive(Clone)]
pub struct SessionBridge {
    handle: Handle,
    owned: Option<Arc<OwnedRuntime>>,
}

impl SessionBridge {
    /// Bridge backed by its own single-worker runtime
    pub fn dedicated() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("bpbind-session")
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Bridge onto a runtime owned by someone else
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    /// Run `future` on the session runtime and block until it resolves
    ///
    /// Calling this from inside a current-thread runtime is refused unless
    /// the bridge owns its runtime, since parking that thread could starve
    /// the very future being waited on.
    pub fn block_on<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let in_worker = match Handle::try_current() {
            Err(_) => false,
            Ok(current) => match current.runtime_flavor() {
                RuntimeFlavor::MultiThread => true,
                _ if self.owned.is_some() => false,
                _ => {
                    return Err(Error::Internal(
                        "cannot block on the session from a current-thread runtime".to_string(),
                    ))
                }
            },
        };

        let (tx, rx) = mpsc::sync_channel(1);
        self.handle.spawn(async move {
            let _ = tx.send(future.await);
        });

        let wait = move || rx.recv().unwrap_or_else(|_| Err(Error::SessionCancelled));
        if in_worker {
            tokio::task::block_in_place(wait)
        } else {
            wait()
        }
    }
}

impl fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBridge")
            .field("owns_runtime", &self.owned.is_some())
            .finish()
    }
}
