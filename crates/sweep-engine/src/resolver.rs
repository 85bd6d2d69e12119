//! Maps generated stylesheet positions back to authored sources.

use sourcemap::SourceMap;
use sweep_common::protocol::{GeneratedPosition, OriginalPosition};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to decode source map: {0}")]
    Decode(#[from] sourcemap::Error),
}

/// Wraps an optional decoded source map for the lifetime of a run.
///
/// Without a map every lookup is absent.
#[derive(Default)]
pub struct PositionResolver {
    map: Option<SourceMap>,
}

impl PositionResolver {
    /// A resolver that never finds a mapping.
    pub fn none() -> Self {
        Self { map: None }
    }

    /// Decode a raw source map document.
    pub fn from_slice(raw: &[u8]) -> Result<Self, ResolveError> {
        let map = SourceMap::from_slice(raw)?;
        tracing::debug!(
            sources = map.get_source_count(),
            tokens = map.get_token_count(),
            "source map decoded"
        );
        Ok(Self { map: Some(map) })
    }

    pub fn is_configured(&self) -> bool {
        self.map.is_some()
    }

    /// Original position of `generated`, if the map has one on that line.
    ///
    /// The closest mapping at or before the column wins; mappings from an
    /// earlier line or without a source are ignored.
    pub fn resolve(&self, generated: GeneratedPosition) -> Option<OriginalPosition> {
        let map = self.map.as_ref()?;
        let line = generated.line.checked_sub(1)?;
        let token = map.lookup_token(line, generated.column)?;
        if token.get_dst_line() != line {
            return None;
        }
        let source = token.get_source()?;
        Some(OriginalPosition {
            source: source.to_string(),
            line: token.get_src_line() + 1,
            column: token.get_src_col(),
        })
    }
}
