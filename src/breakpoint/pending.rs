//! Pending breakpoint state machine
//!
//! ```text
//!            enable(true)
//!   Disabled ───────────► Enabled
//!      ▲  ◄─────────────    │
//!      │    enable(false)   │
//!      └──── delete() ──────┴──► Deleted (terminal)
//! ```
//!
//! Whether a bound breakpoint exists is tracked separately from the state.
//! `bind` is the only call that reaches the remote session; it blocks on the
//! session bridge with the state lock released, so `delete` can run while a
//! bind is in flight. The bind result is discarded if that happens.

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::common::{Error, Result};
use crate::engine::EngineContext;

use super::bound::{BoundBreakpoint, BoundBreakpointEnum};
use super::location::LocationDescriptor;
use super::request::{BreakpointRequest, Condition, PassCount};

/// Lifecycle state of a pending breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    Enabled,
    Disabled,
    /// Terminal
    Deleted,
}

impl fmt::Display for PendingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug)]
struct Slot {
    state: PendingState,
    condition: Option<Condition>,
    pass_count: Option<PassCount>,
    bound: Option<BoundBreakpoint>,
}

impl Slot {
    fn can_bind(&self, location: &LocationDescriptor) -> bool {
        self.state != PendingState::Deleted && location.kind().is_bindable()
    }
}

pub(crate) struct PendingShared {
    ctx: Arc<EngineContext>,
    request: BreakpointRequest,
    location: LocationDescriptor,
    slot: Mutex<Slot>,
}

impl fmt::Debug for PendingShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingShared")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// A breakpoint the front-end asked for, bound or not
///
/// Cloning yields another handle to the same breakpoint.
#[derive(Clone)]
pub struct PendingBreakpoint {
    shared: Arc<PendingShared>,
}

impl PendingBreakpoint {
    pub(crate) fn new(
        ctx: Arc<EngineContext>,
        request: BreakpointRequest,
        location: LocationDescriptor,
    ) -> Self {
        let state = if request.enabled {
            PendingState::Enabled
        } else {
            PendingState::Disabled
        };
        let slot = Slot {
            state,
            condition: request.condition.clone(),
            pass_count: request.pass_count,
            bound: None,
        };
        Self {
            shared: Arc::new(PendingShared {
                ctx,
                request,
                location,
                slot: Mutex::new(slot),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<PendingShared>) -> Self {
        Self { shared }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.shared.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `bind` could produce a live breakpoint right now
    pub fn can_bind(&self) -> bool {
        self.slot().can_bind(&self.shared.location)
    }

    /// Place the breakpoint in the remote session
    ///
    /// Returns `false` when the breakpoint cannot be bound: wrong location
    /// kind, deleted, or the session failed. None of those are errors; the
    /// breakpoint just stays pending. Binding an already-bound breakpoint
    /// returns `true` without touching the session again.
    pub fn bind(&self) -> bool {
        let location = &self.shared.location;
        let (file, line) = {
            let slot = self.slot();
            if !slot.can_bind(location) {
                tracing::debug!(%location, state = %slot.state, "Breakpoint is not bindable");
                return false;
            }
            if slot.bound.is_some() {
                return true;
            }
            match location.file_and_line() {
                Some((file, line)) => (file.to_path_buf(), line),
                None => return false,
            }
        };

        tracing::debug!(file = %file.display(), line, "Binding breakpoint");
        let session = Arc::clone(&self.shared.ctx.session);
        let target = file.clone();
        let placed = self
            .shared
            .ctx
            .bridge
            .block_on(async move { session.add_breakpoint(&target, line).await });

        if let Err(e) = placed {
            tracing::warn!(file = %file.display(), line, error = %e, "Session did not place breakpoint");
            return false;
        }

        let mut slot = self.slot();
        if slot.state == PendingState::Deleted {
            tracing::debug!(file = %file.display(), line, "Breakpoint deleted while binding, discarding");
            return false;
        }
        if slot.bound.is_none() {
            let bound = BoundBreakpoint::new(
                self.shared.ctx.next_bound_id(),
                Arc::downgrade(&self.shared),
                slot.state,
                file,
                line,
            );
            tracing::info!(bound = %bound, state = %slot.state, "Breakpoint bound");
            slot.bound = Some(bound);
        }
        true
    }

    /// Enable or disable the breakpoint
    ///
    /// Doing this to a deleted breakpoint is a caller bug and is reported
    /// as `Error::ContractViolation`.
    pub fn enable(&self, enable: bool) -> Result<()> {
        let mut slot = self.slot();
        if slot.state == PendingState::Deleted {
            tracing::error!(
                location = %self.shared.location,
                enable,
                "Enable or disable called on a deleted pending breakpoint"
            );
            return Err(Error::ContractViolation(format!(
                "cannot {} deleted breakpoint at {}",
                if enable { "enable" } else { "disable" },
                self.shared.location
            )));
        }
        slot.state = if enable {
            PendingState::Enabled
        } else {
            PendingState::Disabled
        };
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        self.enable(false)
    }

    /// Delete the breakpoint and drop any bound breakpoint; idempotent
    pub fn delete(&self) {
        let mut slot = self.slot();
        if slot.state != PendingState::Deleted {
            tracing::debug!(location = %self.shared.location, "Deleting pending breakpoint");
        }
        slot.bound = None;
        slot.state = PendingState::Deleted;
    }

    pub fn state(&self) -> PendingState {
        self.slot().state
    }

    /// Snapshot of the current bound breakpoints (zero or one)
    pub fn enumerate_bound(&self) -> BoundBreakpointEnum {
        BoundBreakpointEnum::new(self.slot().bound.iter().cloned().collect())
    }

    /// Error breakpoints are not tracked; this always fails
    pub fn enumerate_errors(&self) -> Result<Infallible> {
        Err(Error::NotImplemented("error breakpoint enumeration"))
    }

    /// Replace the condition
    ///
    /// An existing bound breakpoint keeps the condition it was bound with;
    /// only a later bind of a fresh breakpoint would see the new one.
    pub fn set_condition(&self, condition: Option<Condition>) {
        self.slot().condition = condition;
    }

    /// Replace the pass count; same propagation rules as `set_condition`
    pub fn set_pass_count(&self, pass_count: Option<PassCount>) {
        self.slot().pass_count = pass_count;
    }

    pub fn condition(&self) -> Option<Condition> {
        self.slot().condition.clone()
    }

    pub fn pass_count(&self) -> Option<PassCount> {
        self.slot().pass_count
    }

    /// Accepted and ignored
    pub fn virtualize(&self, _virtualize: bool) {}

    /// The request this breakpoint was created from, as it was at creation
    pub fn request(&self) -> &BreakpointRequest {
        &self.shared.request
    }

    pub fn location(&self) -> &LocationDescriptor {
        &self.shared.location
    }
}

impl fmt::Debug for PendingBreakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot();
        f.debug_struct("PendingBreakpoint")
            .field("location", &self.shared.location)
            .field("state", &slot.state)
            .field("bound", &slot.bound.is_some())
            .finish()
    }
}
