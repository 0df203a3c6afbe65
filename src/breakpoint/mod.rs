//! Pending and bound breakpoints
//!
//! A [`PendingBreakpoint`] is what the front-end holds on to. Binding it
//! asks the remote session to place the breakpoint and, on success, yields
//! one [`BoundBreakpoint`].

mod bound;
mod location;
mod pending;
mod request;

pub use bound::{BoundBreakpoint, BoundBreakpointEnum};
pub use location::{
    DocumentPosition, DocumentRef, LocationDescriptor, LocationKind, LocationResolver, PathResolver,
};
pub use pending::{PendingBreakpoint, PendingState};
pub use request::{BreakpointRequest, Condition, ConditionStyle, PassCount, PassCountStyle};
