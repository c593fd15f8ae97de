//! Stage pipeline driver
//!
//! Runs each stage on its own, or all three in sequence, and packages the
//! outcome as a [`CompileResult`]. Stage boundaries exchange interchange text;
//! [`Driver::compile`] skips the text but is otherwise the same chain.
//!
//! The driver holds no state between calls and takes no locks. A panic inside
//! the core is contained and reported as an error message.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::backend::PrqlcCore;
use crate::compiler::{CompilerCore, CoreResult, SourceContext};
use crate::config::{self, Configuration};
use crate::diagnostic::{Message, has_errors};
use crate::result::CompileResult;

pub struct Driver<C = PrqlcCore> {
    core: C,
}

impl Driver<PrqlcCore> {
    pub fn new() -> Self {
        Self { core: PrqlcCore }
    }
}

impl Default for Driver<PrqlcCore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CompilerCore> Driver<C> {
    pub fn with_core(core: C) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    /// Source text → PL interchange text
    pub fn parse_to_pl(&self, query: &str) -> CompileResult {
        log::debug!("parse_to_pl: {} bytes of source", query.len());
        let mut run = StageRun::default();

        let Some(pl) = run.stage("parse", || {
            self.core.parse(query, SourceContext::new(query, false))
        }) else {
            return run.finish(None);
        };
        let output = run.encode("PL", || self.core.encode_pl(&pl));
        run.finish(output)
    }

    /// PL interchange text → RQ interchange text
    pub fn resolve_to_rq(&self, pl: &str) -> CompileResult {
        log::debug!("resolve_to_rq: {} bytes of PL", pl.len());
        let mut run = StageRun::default();

        let Some(pl) = run.decode("PL", || self.core.decode_pl(pl)) else {
            return run.finish(None);
        };
        let Some(rq) = run.stage("resolve", || {
            self.core.resolve(pl, SourceContext::default())
        }) else {
            return run.finish(None);
        };
        let output = run.encode("RQ", || self.core.encode_rq(&rq));
        run.finish(output)
    }

    /// RQ interchange text → SQL
    pub fn generate_sql(&self, rq: &str, config: Option<&Configuration>) -> CompileResult {
        let config = config::resolve(config);
        log::debug!(
            "generate_sql: {} bytes of RQ, target {}",
            rq.len(),
            config.target
        );
        let mut run = StageRun::default();

        let Some(rq) = run.decode("RQ", || self.core.decode_rq(rq)) else {
            return run.finish(None);
        };
        let ctx = SourceContext {
            source: None,
            color: config.color,
        };
        let output = run.stage("generate", || self.core.generate(rq, &config, ctx));
        run.finish(output)
    }

    /// Source text → SQL, stopping at the first stage that reports an error
    pub fn compile(&self, query: &str, config: Option<&Configuration>) -> CompileResult {
        let config = config::resolve(config);
        log::debug!(
            "compile: {} bytes of source, target {}",
            query.len(),
            config.target
        );
        let ctx = SourceContext::new(query, config.color);
        let mut run = StageRun::default();

        let Some(pl) = run.stage("parse", || self.core.parse(query, ctx)) else {
            return run.finish(None);
        };
        let Some(rq) = run.stage("resolve", || self.core.resolve(pl, ctx)) else {
            return run.finish(None);
        };
        let output = run.stage("generate", || self.core.generate(rq, &config, ctx));
        run.finish(output)
    }

    /// PL interchange text → query source
    pub fn pl_to_prql(&self, pl: &str) -> CompileResult {
        log::debug!("pl_to_prql: {} bytes of PL", pl.len());
        let mut run = StageRun::default();

        let Some(pl) = run.decode("PL", || self.core.decode_pl(pl)) else {
            return run.finish(None);
        };
        let output = run.stage("format", || self.core.pl_to_source(&pl));
        run.finish(output)
    }

    pub fn targets(&self) -> Vec<String> {
        self.core.targets()
    }

    pub fn compiler_version(&self) -> String {
        self.core.version()
    }
}

/// Messages collected over one driver call
#[derive(Default)]
struct StageRun {
    messages: Vec<Message>,
}

impl StageRun {
    /// Run a core stage; `None` once any error has been reported
    fn stage<T>(&mut self, name: &'static str, f: impl FnOnce() -> CoreResult<T>) -> Option<T> {
        match contain_panic(name, f) {
            Ok(diagnosed) => {
                let failed = has_errors(&diagnosed.messages);
                self.messages.extend(diagnosed.messages);
                if failed {
                    log::debug!("{name} stage reported errors");
                    None
                } else {
                    Some(diagnosed.value)
                }
            }
            Err(messages) => {
                log::debug!("{name} stage failed with {} messages", messages.len());
                self.messages.extend(messages);
                None
            }
        }
    }

    /// Decode interchange text; failure is exactly one span-less error
    fn decode<T>(&mut self, ir: &'static str, f: impl FnOnce() -> Result<T, String>) -> Option<T> {
        match contain_panic(ir, || f().map_err(|reason| vec![Message::error(reason)])) {
            Ok(value) => Some(value),
            Err(mut messages) => {
                log::debug!("invalid {ir} interchange text");
                for msg in &mut messages {
                    msg.reason = format!("invalid {ir} interchange: {}", msg.reason);
                }
                self.messages.extend(messages);
                None
            }
        }
    }

    fn encode(&mut self, ir: &'static str, f: impl FnOnce() -> Result<String, String>) -> Option<String> {
        match f() {
            Ok(text) => {
                log::trace!("encoded {ir}: {} bytes", text.len());
                Some(text)
            }
            Err(reason) => {
                self.messages
                    .push(Message::error(format!("could not serialize {ir}: {reason}")));
                None
            }
        }
    }

    fn finish(self, output: Option<String>) -> CompileResult {
        CompileResult::from_parts(output, self.messages)
    }
}

fn contain_panic<T>(
    stage: &'static str,
    f: impl FnOnce() -> Result<T, Vec<Message>>,
) -> Result<T, Vec<Message>> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let reason = panic_reason(payload.as_ref());
        log::warn!("compiler core panicked during {stage}: {reason}");
        Err(vec![Message::error(format!(
            "internal compiler error: {reason}"
        ))])
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
