//! Compilation configuration
//!
//! A [`Configuration`] is an immutable value handed to each stage call. There
//! are no process-wide defaults to mutate; [`resolve`] fills in whatever the
//! caller left out.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Take the SQL dialect from the `prql target:` header of the query
pub const DEFAULT_TARGET: &str = "sql.any";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Pretty-print the generated SQL over multiple lines.
    ///
    /// Defaults to true.
    pub format: bool,

    /// `sql.any` or `sql.<dialect>`. Checked by the generate stage, not here.
    pub target: String,

    /// Append a comment naming the compiler and its version.
    ///
    /// Defaults to true.
    pub signature_comment: bool,

    /// Keep ANSI colors in annotated diagnostics.
    ///
    /// Defaults to false.
    pub color: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            format: true,
            target: DEFAULT_TARGET.to_string(),
            signature_comment: true,
            color: false,
        }
    }
}

impl Configuration {
    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn no_format(self) -> Self {
        self.with_format(false)
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_signature_comment(mut self, signature_comment: bool) -> Self {
        self.signature_comment = signature_comment;
        self
    }

    pub fn no_signature(self) -> Self {
        self.with_signature_comment(false)
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Produce the effective configuration for a stage call.
///
/// Absent configuration means defaults. A blank target means [`DEFAULT_TARGET`].
pub fn resolve(config: Option<&Configuration>) -> Configuration {
    let mut effective = config.cloned().unwrap_or_default();
    let target = effective.target.trim();
    effective.target = if target.is_empty() {
        DEFAULT_TARGET.to_string()
    } else {
        target.to_string()
    };
    effective
}
