//! The unused-selector report and its JSON form.

use crate::resolver::PositionResolver;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sweep_common::protocol::SelectorRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One unused selector. Position fields are present together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indeterminate: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnusedSelectorReport {
    pub entries: Vec<ReportEntry>,
}

impl UnusedSelectorReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, ReportError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Serialize and write the whole report in one go.
    pub async fn write_to(&self, path: &Path, pretty: bool) -> Result<(), ReportError> {
        let json = self.to_json(pretty)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| ReportError::Write {
                path: path.display().to_string(),
                source,
            })
    }
}

pub struct ReportBuilder<'a> {
    resolver: &'a PositionResolver,
    mark_indeterminate: bool,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(resolver: &'a PositionResolver) -> Self {
        Self {
            resolver,
            mark_indeterminate: false,
        }
    }

    /// Flag entries whose selector could not be evaluated on some page.
    pub fn mark_indeterminate(mut self, mark: bool) -> Self {
        self.mark_indeterminate = mark;
        self
    }

    /// Resolve each survivor and emit one entry per record, in order.
    pub fn build(&self, survivors: Vec<SelectorRecord>) -> UnusedSelectorReport {
        let entries = survivors
            .into_iter()
            .map(|mut record| {
                record.original = self.resolver.resolve(record.generated);
                self.entry(record)
            })
            .collect();
        UnusedSelectorReport { entries }
    }

    fn entry(&self, record: SelectorRecord) -> ReportEntry {
        let indeterminate = (self.mark_indeterminate && record.indeterminate).then_some(true);
        match record.original {
            Some(original) => ReportEntry {
                selector: record.selector,
                source: Some(original.source),
                line: Some(original.line),
                column: Some(original.column),
                indeterminate,
            },
            None => ReportEntry {
                selector: record.selector,
                source: None,
                line: None,
                column: None,
                indeterminate,
            },
        }
    }
}
