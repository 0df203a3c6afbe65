//! bpbind - pending breakpoint binding for debug adapters
//!
//! A front-end hands the [`Engine`] breakpoint requests and gets back
//! [`PendingBreakpoint`] handles it can bind, enable, disable and delete.
//! Binding places the breakpoint in a [`RemoteSession`], such as a running
//! Debug Adapter Protocol adapter.

pub mod breakpoint;
pub mod cli;
pub mod commands;
pub mod common;
pub mod dap;
pub mod engine;
pub mod session;

pub use breakpoint::{BoundBreakpoint, BreakpointRequest, PendingBreakpoint, PendingState};
pub use common::{Error, Result};
pub use engine::Engine;
pub use session::{RemoteSession, SessionBridge};
