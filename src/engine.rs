//! Debug engine: creates pending breakpoints for one language and session

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::breakpoint::{
    BreakpointRequest, LocationDescriptor, LocationKind, LocationResolver, PendingBreakpoint,
};
use crate::common::{Error, Result};
use crate::session::{RemoteSessionRef, SessionBridge};

/// State shared by every pending breakpoint of an engine
pub(crate) struct EngineContext {
    pub(crate) session: RemoteSessionRef,
    pub(crate) bridge: SessionBridge,
    next_bound_id: AtomicU64,
}

impl EngineContext {
    pub(crate) fn new(session: RemoteSessionRef, bridge: SessionBridge) -> Self {
        Self {
            session,
            bridge,
            next_bound_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn next_bound_id(&self) -> u64 {
        self.next_bound_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Factory for pending breakpoints
pub struct Engine {
    language: String,
    resolver: Arc<dyn LocationResolver>,
    ctx: Arc<EngineContext>,
}

impl Engine {
    pub fn new(
        language: impl Into<String>,
        session: RemoteSessionRef,
        resolver: Arc<dyn LocationResolver>,
        bridge: SessionBridge,
    ) -> Self {
        Self {
            language: language.into(),
            resolver,
            ctx: Arc::new(EngineContext::new(session, bridge)),
        }
    }

    /// Language breakpoint requests must be for
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Build a pending breakpoint from a front-end request
    ///
    /// Fails if the request is for another language or its file/line
    /// location cannot be resolved. Locations of other kinds are accepted
    /// without resolution; they simply never bind.
    pub fn create_pending_breakpoint(&self, request: BreakpointRequest) -> Result<PendingBreakpoint> {
        if request.language != self.language {
            return Err(Error::LanguageMismatch {
                expected: self.language.clone(),
                actual: request.language,
            });
        }

        let location = match request.kind {
            LocationKind::FileLine => {
                LocationDescriptor::file_line(self.resolver.resolve(&request.document)?)?
            }
            kind => LocationDescriptor::unpositioned(kind),
        };

        tracing::debug!(%location, enabled = request.enabled, "Created pending breakpoint");
        Ok(PendingBreakpoint::new(Arc::clone(&self.ctx), request, location))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("language", &self.language)
            .field("bridge", &self.ctx.bridge)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{DocumentPosition, DocumentRef};
    use crate::session::NullSession;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, DocumentPosition>);

    impl LocationResolver for MapResolver {
        fn resolve(&self, document: &DocumentRef) -> Result<DocumentPosition> {
            self.0
                .get(document.as_str())
                .cloned()
                .ok_or_else(|| Error::unresolved(document.as_str(), "unknown document"))
        }
    }

    fn engine() -> Engine {
        let mut docs = HashMap::new();
        docs.insert("doc-1".to_string(), DocumentPosition::new("main.r", 9, 9));
        docs.insert("inverted".to_string(), DocumentPosition::new("main.r", 9, 3));
        Engine::new(
            "r",
            Arc::new(NullSession),
            Arc::new(MapResolver(docs)),
            SessionBridge::dedicated().unwrap(),
        )
    }

    #[test]
    fn test_language_mismatch_fails_construction() {
        let err = engine()
            .create_pending_breakpoint(BreakpointRequest::file_line("python", DocumentRef::new("doc-1")))
            .unwrap_err();
        match err {
            Error::LanguageMismatch { expected, actual } => {
                assert_eq!(expected, "r");
                assert_eq!(actual, "python");
            }
            other => panic!("Expected LanguageMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_location_is_resolved_once_at_construction() {
        let bp = engine()
            .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("doc-1")))
            .unwrap();
        assert_eq!(bp.location().line(), Some(10));
        assert_eq!(bp.location().position().unwrap().end_line, 9);
    }

    #[test]
    fn test_unresolvable_document_fails_construction() {
        let engine = engine();
        assert!(matches!(
            engine.create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("nope"))),
            Err(Error::UnresolvedDocument { .. })
        ));
        assert!(matches!(
            engine.create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("inverted"))),
            Err(Error::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_other_kinds_skip_resolution() {
        let bp = engine()
            .create_pending_breakpoint(BreakpointRequest::new(
                "r",
                LocationKind::CodeAddress,
                DocumentRef::new("0x1000"),
            ))
            .unwrap();
        assert_eq!(bp.location().kind(), LocationKind::CodeAddress);
        assert!(!bp.can_bind());
    }

    #[test]
    fn test_null_session_keeps_breakpoint_pending() {
        let bp = engine()
            .create_pending_breakpoint(BreakpointRequest::file_line("r", DocumentRef::new("doc-1")))
            .unwrap();
        assert!(bp.can_bind());
        assert!(!bp.bind());
        assert!(bp.enumerate_bound().is_empty());
    }
}
