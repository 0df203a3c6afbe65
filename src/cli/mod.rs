//! CLI command handling
//!
//! Builds an engine for the requested language, feeds it one breakpoint
//! request per location and prints what became of each.

mod report;

use std::sync::Arc;

use crate::breakpoint::{
    BreakpointRequest, Condition, DocumentRef, LocationKind, PassCount, PassCountStyle,
    PathResolver,
};
use crate::commands::Commands;
use crate::common::{config::Config, Error, Result};
use crate::engine::Engine;
use crate::session::{DapSession, NullSession, SessionBridge};

pub use report::BindReport;

/// Shared knobs for turning CLI locations into requests
struct RequestTemplate {
    language: String,
    condition: Option<String>,
    hit_count: Option<u32>,
}

impl RequestTemplate {
    fn request(&self, location: &str) -> BreakpointRequest {
        let kind = LocationKind::classify(location);
        let mut request = BreakpointRequest::new(self.language.clone(), kind, DocumentRef::new(location));
        if let Some(expr) = &self.condition {
            request = request.with_condition(Condition::when_true(expr.clone()));
        }
        if let Some(count) = self.hit_count {
            request = request.with_pass_count(PassCount::new(PassCountStyle::EqualOrGreater, count));
        }
        request
    }
}

/// Dispatch a CLI command
pub fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Bind {
            program,
            args,
            adapter,
            language,
            condition,
            hit_count,
            json,
            locations,
        } => {
            let adapter_name = adapter.unwrap_or_else(|| config.defaults.adapter.clone());
            let template = RequestTemplate {
                language: language.unwrap_or_else(|| config.language_for(&adapter_name)),
                condition,
                hit_count,
            };

            if template.condition.is_some() || template.hit_count.is_some() {
                tracing::warn!(
                    "Conditions and hit counts stay on the pending breakpoints and are not sent to the adapter"
                );
            }

            let bridge = SessionBridge::dedicated()?;
            let program = program.canonicalize().unwrap_or(program);
            let session = {
                let adapter_name = adapter_name.clone();
                let program = program.clone();
                bridge.block_on(async move {
                    DapSession::launch(&config, Some(adapter_name), &program, args).await
                })?
            };
            let session = Arc::new(session);

            let engine = Engine::new(
                template.language.clone(),
                session.clone(),
                Arc::new(PathResolver::new()),
                bridge.clone(),
            );

            let reports = bind_all(&engine, &template, &locations);
            report::print(&reports, json)?;

            let finish = {
                let session = session.clone();
                bridge.block_on(async move {
                    session.configuration_done().await?;
                    session.terminate().await
                })
            };
            if let Err(e) = finish {
                tracing::warn!(error = %e, "Session did not shut down cleanly");
            }

            outcome(&reports)
        }

        Commands::Check {
            language,
            json,
            locations,
        } => {
            let template = RequestTemplate {
                language: language.unwrap_or_else(|| config.defaults.language.clone()),
                condition: None,
                hit_count: None,
            };
            let engine = Engine::new(
                template.language.clone(),
                Arc::new(NullSession),
                Arc::new(PathResolver::new()),
                SessionBridge::dedicated()?,
            );

            let reports: Vec<BindReport> = locations
                .iter()
                .map(|location| match engine.create_pending_breakpoint(template.request(location)) {
                    Ok(bp) => BindReport::from_pending(location, &bp),
                    Err(e) => BindReport::rejected(location, &e),
                })
                .collect();
            report::print(&reports, json)
        }
    }
}

fn bind_all(engine: &Engine, template: &RequestTemplate, locations: &[String]) -> Vec<BindReport> {
    locations
        .iter()
        .map(|location| match engine.create_pending_breakpoint(template.request(location)) {
            Ok(bp) => {
                bp.bind();
                BindReport::from_pending(location, &bp)
            }
            Err(e) => {
                tracing::warn!(%location, error = %e, "Breakpoint request rejected");
                BindReport::rejected(location, &e)
            }
        })
        .collect()
}

/// Fail the command if any request was refused by the engine
fn outcome(reports: &[BindReport]) -> Result<()> {
    let rejected = reports.iter().filter(|r| r.error.is_some()).count();
    if rejected > 0 {
        return Err(Error::RequestsRejected {
            rejected,
            total: reports.len(),
        });
    }
    Ok(())
}
