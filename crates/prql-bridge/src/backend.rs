//! [`CompilerCore`] backed by the `prqlc` crate

use std::str::FromStr;

use anstream::adapter::strip_str;
use prqlc::ir::rq::RelationalQuery;
use prqlc::pr::ModuleDef;
use prqlc::{ErrorMessage, ErrorMessages, SourceTree, Target};

use crate::compiler::{CompilerCore, CoreResult, Diagnosed, SourceContext};
use crate::config::Configuration;
use crate::diagnostic::{Message, MessageKind, SourceLocation, Span};

/// The PRQL compiler. PL and RQ travel as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrqlcCore;

impl CompilerCore for PrqlcCore {
    type Pl = ModuleDef;
    type Rq = RelationalQuery;

    fn parse(&self, source: &str, ctx: SourceContext<'_>) -> CoreResult<ModuleDef> {
        prqlc::prql_to_pl(source)
            .map(Diagnosed::clean)
            .map_err(|e| convert_errors(e, ctx))
    }

    fn resolve(&self, pl: ModuleDef, ctx: SourceContext<'_>) -> CoreResult<RelationalQuery> {
        prqlc::pl_to_rq(pl)
            .map(Diagnosed::clean)
            .map_err(|e| convert_errors(e, ctx))
    }

    fn generate(
        &self,
        rq: RelationalQuery,
        config: &Configuration,
        ctx: SourceContext<'_>,
    ) -> CoreResult<String> {
        let target = Target::from_str(&config.target)
            .map_err(|e| convert_errors(ErrorMessages::from(e), ctx))?;
        let options = prqlc::Options::default()
            .with_format(config.format)
            .with_signature_comment(config.signature_comment)
            .with_target(target);

        prqlc::rq_to_sql(rq, &options)
            .map(Diagnosed::clean)
            .map_err(|e| convert_errors(e, ctx))
    }

    fn pl_to_source(&self, pl: &ModuleDef) -> CoreResult<String> {
        prqlc::pl_to_prql(pl)
            .map(Diagnosed::clean)
            .map_err(|e| convert_errors(e, SourceContext::default()))
    }

    fn encode_pl(&self, pl: &ModuleDef) -> Result<String, String> {
        serde_json::to_string(pl).map_err(|e| e.to_string())
    }

    fn decode_pl(&self, text: &str) -> Result<ModuleDef, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    fn encode_rq(&self, rq: &RelationalQuery) -> Result<String, String> {
        serde_json::to_string(rq).map_err(|e| e.to_string())
    }

    fn decode_rq(&self, text: &str) -> Result<RelationalQuery, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    fn targets(&self) -> Vec<String> {
        Target::names()
    }

    fn version(&self) -> String {
        prqlc::compiler_version().to_string()
    }
}

/// Compose against the source when we have it, then convert each message
fn convert_errors(errors: ErrorMessages, ctx: SourceContext<'_>) -> Vec<Message> {
    let errors = match ctx.source {
        Some(source) => errors.composed(&SourceTree::from(source)),
        None => errors,
    };
    errors
        .inner
        .into_iter()
        .map(|e| convert_message(e, ctx.color))
        .collect()
}

fn convert_message(e: ErrorMessage, color: bool) -> Message {
    let kind = match e.kind {
        prqlc::MessageKind::Warning => MessageKind::Warning,
        prqlc::MessageKind::Lint => MessageKind::Lint,
        _ => MessageKind::Error,
    };

    Message {
        kind,
        code: e.code,
        reason: e.reason,
        hint: (!e.hints.is_empty()).then(|| e.hints.join("\n")),
        span: e.span.map(|s| Span {
            start: s.start,
            end: s.end,
        }),
        display: e.display.map(|d| {
            if color {
                d
            } else {
                strip_str(&d).to_string()
            }
        }),
        location: e.location.map(|l| SourceLocation {
            start_line: l.start.0,
            start_col: l.start.1,
            end_line: l.end.0,
            end_col: l.end.1,
        }),
    }
}
