//! Bound breakpoints and their enumerator

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use super::pending::{PendingBreakpoint, PendingShared, PendingState};

#[derive(Debug)]
struct BoundInner {
    id: u64,
    owner: Weak<PendingShared>,
    state_at_bind: PendingState,
    file: PathBuf,
    line: u32,
}

/// A breakpoint that has actually been placed in the remote session
///
/// Cloning yields another handle to the same bound breakpoint.
#[derive(Debug, Clone)]
pub struct BoundBreakpoint {
    inner: Arc<BoundInner>,
}

impl BoundBreakpoint {
    pub(crate) fn new(
        id: u64,
        owner: Weak<PendingShared>,
        state_at_bind: PendingState,
        file: PathBuf,
        line: u32,
    ) -> Self {
        Self {
            inner: Arc::new(BoundInner {
                id,
                owner,
                state_at_bind,
                file,
                line,
            }),
        }
    }

    /// Engine-unique identifier
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// State of the owning pending breakpoint when placement succeeded
    pub fn state_at_bind(&self) -> PendingState {
        self.inner.state_at_bind
    }

    pub fn file(&self) -> &Path {
        &self.inner.file
    }

    /// One-based line the session was asked for
    pub fn line(&self) -> u32 {
        self.inner.line
    }

    /// The pending breakpoint this was bound from, while it is still alive
    pub fn pending_breakpoint(&self) -> Option<PendingBreakpoint> {
        self.inner.owner.upgrade().map(PendingBreakpoint::from_shared)
    }
}

impl PartialEq for BoundBreakpoint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for BoundBreakpoint {}

impl fmt::Display for BoundBreakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}:{}", self.inner.id, self.inner.file.display(), self.inner.line)
    }
}

/// Restartable sequence over the bound breakpoints of one pending breakpoint
///
/// The set is captured when the enumerator is created. Deleting the pending
/// breakpoint afterwards does not empty an enumerator that already exists.
#[derive(Debug, Clone, Default)]
pub struct BoundBreakpointEnum {
    items: Vec<BoundBreakpoint>,
    position: usize,
}

impl BoundBreakpointEnum {
    pub(crate) fn new(items: Vec<BoundBreakpoint>) -> Self {
        Self { items, position: 0 }
    }

    /// Number of breakpoints in the snapshot, regardless of position
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rewind to the first element
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

impl Iterator for BoundBreakpointEnum {
    type Item = BoundBreakpoint;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.position).cloned();
        if item.is_some() {
            self.position += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.position;
        (remaining, Some(remaining))
    }
}
