//! Per-breakpoint result lines

use serde::Serialize;

use crate::breakpoint::{LocationKind, PendingBreakpoint, PendingState};
use crate::common::{Error, Result};

/// What happened to one requested location
#[derive(Debug, Serialize)]
pub struct BindReport {
    pub location: String,
    pub kind: LocationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PendingState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub bindable: bool,
    pub bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound_id: Option<u64>,
    /// Condition kept on the pending breakpoint, never sent to the adapter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BindReport {
    /// Report for a breakpoint as it stands now
    pub fn from_pending(location: &str, bp: &PendingBreakpoint) -> Self {
        let bound = bp.enumerate_bound().next();
        Self {
            location: location.to_string(),
            kind: bp.location().kind(),
            state: Some(bp.state()),
            line: bp.location().line(),
            bindable: bp.can_bind(),
            bound: bound.is_some(),
            bound_id: bound.map(|b| b.id()),
            condition: bp.condition().map(|c| c.expression),
            hit_condition: bp.pass_count().map(|p| p.to_string()),
            error: None,
        }
    }

    /// Report for a request the engine refused
    pub fn rejected(location: &str, error: &Error) -> Self {
        Self {
            location: location.to_string(),
            kind: LocationKind::classify(location),
            state: None,
            line: None,
            bindable: false,
            bound: false,
            bound_id: None,
            condition: None,
            hit_condition: None,
            error: Some(error.to_string()),
        }
    }

    fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("rejected: {}", error);
        }
        let state = self.state.map(|s| s.to_string()).unwrap_or_default();
        let mut summary = match (self.bound_id, self.bindable) {
            (Some(id), _) => format!("{}, bound #{}", state, id),
            (None, true) => format!("{}, pending", state),
            (None, false) => format!("{}, pending ({} locations cannot be bound)", state, self.kind),
        };

        let local: Vec<String> = [
            self.condition.as_ref().map(|c| format!("if {}", c)),
            self.hit_condition.as_ref().map(|h| format!("hit {}", h)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !local.is_empty() {
            summary.push_str(&format!(" [{}; not sent to adapter]", local.join(", ")));
        }
        summary
    }
}

/// Print reports as aligned text or as a JSON array
pub fn print(reports: &[BindReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    let width = reports.iter().map(|r| r.location.len()).max().unwrap_or(0);
    for report in reports {
        println!("{:width$}  {}", report.location, report.summary(), width = width);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{
        BreakpointRequest, Condition, DocumentRef, PassCount, PassCountStyle, PathResolver,
    };
    use crate::engine::Engine;
    use crate::session::{NullSession, SessionBridge};
    use std::sync::Arc;

    #[test]
    fn test_condition_and_hit_count_are_reported_as_local_only() {
        let engine = Engine::new(
            "r",
            Arc::new(NullSession),
            Arc::new(PathResolver::new()),
            SessionBridge::dedicated().unwrap(),
        );
        let request = BreakpointRequest::new("r", LocationKind::FunctionOffset, DocumentRef::new("main"))
            .with_condition(Condition::when_true("n > 2"))
            .with_pass_count(PassCount::new(PassCountStyle::EqualOrGreater, 3));
        let bp = engine.create_pending_breakpoint(request).unwrap();

        let report = BindReport::from_pending("main", &bp);
        assert_eq!(report.condition.as_deref(), Some("n > 2"));
        assert_eq!(report.hit_condition.as_deref(), Some(">=3"));
        assert!(report.summary().ends_with("[if n > 2, hit >=3; not sent to adapter]"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["hit_condition"], ">=3");
    }

    #[test]
    fn test_rejected_summary_carries_error() {
        let report = BindReport::rejected(
            "main.r:99",
            &Error::unresolved("main.r:99", "file has only 3 lines"),
        );
        assert!(!report.bound);
        assert_eq!(report.kind, LocationKind::FileLine);
        assert!(report.summary().starts_with("rejected: "));
        assert!(report.summary().contains("only 3 lines"));
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let report = BindReport::rejected("main", &Error::NotImplemented("x"));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kind"], "function_offset");
        assert!(value.get("bound_id").is_none());
        assert!(value.get("state").is_none());
        assert_eq!(value["bound"], false);
    }
}
