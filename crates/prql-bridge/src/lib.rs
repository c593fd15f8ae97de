//! prql-bridge - staged PRQL compilation with structured diagnostics
//!
//! Each stage of the compiler can be run on its own, exchanging PL and RQ as
//! JSON interchange text, or all at once with [`compile`]. Every call returns a
//! [`CompileResult`]: output text, or every diagnostic the failing stage found.
//!
//! ## Quick Start
//!
//! ```ignore
//! use prql_bridge::{compile, Configuration};
//!
//! let res = compile("from albums | select {album_id, title} | take 3", None);
//! assert!(res.messages().is_empty());
//! println!("{}", res.output().unwrap());
//!
//! let config = Configuration::default()
//!     .no_format()
//!     .no_signature()
//!     .with_target("sql.mssql");
//! let res = compile("from albums | take 3", Some(&config));
//! ```
//!
//! ## Stages
//!
//! ```ignore
//! use prql_bridge::{parse_to_pl, resolve_to_rq, generate_sql};
//!
//! let pl = parse_to_pl("from albums | take 3");
//! let rq = resolve_to_rq(pl.output().unwrap());
//! let sql = generate_sql(rq.output().unwrap(), None);
//! ```
//!
//! Failures never panic or abort: check [`CompileResult::messages`], not only
//! whether the output is empty.

pub mod backend;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod driver;
pub mod legacy;
pub mod result;

use thiserror::Error;

// ============ Primary Public API ============

pub use backend::PrqlcCore;
pub use config::{Configuration, DEFAULT_TARGET};
pub use diagnostic::{Message, MessageKind, SourceLocation, Span};
pub use driver::Driver;
pub use result::CompileResult;

/// Compile query source to SQL
pub fn compile(query: &str, config: Option<&Configuration>) -> CompileResult {
    Driver::new().compile(query, config)
}

/// Parse query source into PL interchange text
pub fn parse_to_pl(query: &str) -> CompileResult {
    Driver::new().parse_to_pl(query)
}

/// Resolve PL interchange text into RQ interchange text
pub fn resolve_to_rq(pl: &str) -> CompileResult {
    Driver::new().resolve_to_rq(pl)
}

/// Generate SQL from RQ interchange text
pub fn generate_sql(rq: &str, config: Option<&Configuration>) -> CompileResult {
    Driver::new().generate_sql(rq, config)
}

/// Regenerate query source from PL interchange text
pub fn pl_to_prql(pl: &str) -> CompileResult {
    Driver::new().pl_to_prql(pl)
}

/// Every accepted `target` value, `sql.any` first
pub fn targets() -> Vec<String> {
    Driver::new().targets()
}

pub fn compiler_version() -> String {
    Driver::new().compiler_version()
}

// ============ Errors ============

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{}", diagnostic::render(.0))]
    Compile(Vec<Message>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
