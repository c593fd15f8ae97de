//! Seam between the stage driver and the compiler core
//!
//! The core owns the grammar, name resolution, lowering and SQL generation, as
//! well as the schema of the PL and RQ interchange text. The driver only sees
//! values and diagnostics through [`CompilerCore`].

use crate::config::Configuration;
use crate::diagnostic::Message;

/// A stage product together with the non-fatal messages produced alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosed<T> {
    pub value: T,
    pub messages: Vec<Message>,
}

impl<T> Diagnosed<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            messages: Vec::new(),
        }
    }

    pub fn with_messages(value: T, messages: Vec<Message>) -> Self {
        Self { value, messages }
    }
}

/// Either a product or every diagnostic the stage found
pub type CoreResult<T> = Result<Diagnosed<T>, Vec<Message>>;

/// What the core may use when rendering diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceContext<'a> {
    /// Text that spans point into, when the caller has it
    pub source: Option<&'a str>,
    /// Keep ANSI colors in `display`
    pub color: bool,
}

impl<'a> SourceContext<'a> {
    pub fn new(source: &'a str, color: bool) -> Self {
        Self {
            source: Some(source),
            color,
        }
    }
}

/// A compiler that can run each stage on its own.
///
/// Implementations must be safe to call from several threads at once and must
/// not keep state between calls.
pub trait CompilerCore: Send + Sync {
    /// Structural AST, prior to name resolution
    type Pl;
    /// Relational query, ready for SQL generation
    type Rq;

    fn parse(&self, source: &str, ctx: SourceContext<'_>) -> CoreResult<Self::Pl>;

    fn resolve(&self, pl: Self::Pl, ctx: SourceContext<'_>) -> CoreResult<Self::Rq>;

    /// `config` is already resolved; `config.target` may still name an unknown dialect.
    fn generate(
        &self,
        rq: Self::Rq,
        config: &Configuration,
        ctx: SourceContext<'_>,
    ) -> CoreResult<String>;

    /// Regenerate query source from PL
    fn pl_to_source(&self, pl: &Self::Pl) -> CoreResult<String>;

    fn encode_pl(&self, pl: &Self::Pl) -> Result<String, String>;
    fn decode_pl(&self, text: &str) -> Result<Self::Pl, String>;
    fn encode_rq(&self, rq: &Self::Rq) -> Result<String, String>;
    fn decode_rq(&self, text: &str) -> Result<Self::Rq, String>;

    /// Every accepted target string
    fn targets(&self) -> Vec<String>;

    fn version(&self) -> String;
}
