//! Debug Adapter Protocol (DAP) client
//!
//! Backs the DAP remote session: spawns an adapter over stdio and speaks
//! just enough of the protocol to place source breakpoints.

pub mod client;
pub mod codec;
pub mod types;

pub use client::DapClient;
pub use types::*;
