//! Data model shared by the engine and the browser backends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a rule in the generated (compiled) stylesheet.
///
/// `line` is 1-based, `column` is 0-based, matching the convention of
/// source-map lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedPosition {
    pub line: u32,
    pub column: u32,
}

impl GeneratedPosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for GeneratedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Position in the authored source a generated position maps back to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginalPosition {
    pub source: String,
    pub line: u32,
    pub column: u32,
}

/// One selector group of a style rule, addressed by its position.
///
/// A rule with several comma-separated selectors is a single record whose
/// `selector` is the full `", "`-joined group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRecord {
    pub selector: String,
    pub generated: GeneratedPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalPosition>,
    /// Set when at least one probe of this record could not be evaluated.
    #[serde(default)]
    pub indeterminate: bool,
}

impl SelectorRecord {
    pub fn new(selector: impl Into<String>, generated: GeneratedPosition) -> Self {
        Self {
            selector: selector.into(),
            generated,
            original: None,
            indeterminate: false,
        }
    }
}

/// Outcome of probing one selector against one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// At least one node matched.
    Used,
    /// Evaluated, no node matched.
    Unused,
    /// The selector could not be evaluated on this page.
    Indeterminate,
}

impl Usage {
    pub fn is_used(self) -> bool {
        self == Usage::Used
    }

    /// Maps the probe script's `true | false | null` answer.
    pub fn from_probe(value: Option<bool>) -> Self {
        match value {
            Some(true) => Usage::Used,
            Some(false) => Usage::Unused,
            None => Usage::Indeterminate,
        }
    }
}
