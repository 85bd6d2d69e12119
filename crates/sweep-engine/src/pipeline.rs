//! Shared run pipeline: extract -> reduce -> resolve -> report.
//!
//! A run owns the backend and the position resolver for its whole duration.
//! The backend is closed on every exit path.

use crate::backend::{Backend, BackendError};
use crate::cli::OutputHandlers;
use crate::config::RunOptions;
use crate::extractor::SelectorExtractor;
use crate::probe::UsageProbe;
use crate::reducer::{ReduceError, SurvivalReducer};
use crate::report::{ReportBuilder, ReportError, UnusedSelectorReport};
use crate::resolver::{PositionResolver, ResolveError};
use crate::source::{self, SourceError};
use crate::stylesheet::parse_stylesheet;
use sweep_common::protocol::GeneratedPosition;

/// Failure of a run, tagged with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Browser launch failed: {0}")]
    Launch(#[source] BackendError),

    #[error("Stylesheet fetch failed: {0}")]
    Fetch(#[source] SourceError),

    #[error("Stylesheet parse failed: {count} invalid rule(s), first at {position}: {text}")]
    Parse {
        count: usize,
        position: GeneratedPosition,
        text: String,
    },

    #[error("Source map failed: {0}")]
    SourceMapRead(#[source] SourceError),

    #[error("Source map failed: {0}")]
    SourceMap(#[from] ResolveError),

    #[error("Reading links failed: {0}")]
    Links(#[source] SourceError),

    #[error("Probe loop failed: {0}")]
    Probe(#[from] ReduceError),

    #[error("Writing report failed: {0}")]
    Write(#[from] ReportError),

    #[error("Browser close failed: {0}")]
    Close(#[source] BackendError),
}

impl PipelineError {
    /// Short name of the failed stage.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Launch(_) => "launch",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Parse { .. } => "parse",
            PipelineError::SourceMapRead(_) | PipelineError::SourceMap(_) => "sourcemap",
            PipelineError::Links(_) => "links",
            PipelineError::Probe(_) => "probe",
            PipelineError::Write(_) => "write",
            PipelineError::Close(_) => "close",
        }
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub selectors: usize,
    pub pages: usize,
    pub report: UnusedSelectorReport,
}

/// Everything a run needs, created at its start and dropped at its end.
pub struct RunContext<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    options: &'a RunOptions,
    output: OutputHandlers,
}

impl<'a, B: Backend + ?Sized> RunContext<'a, B> {
    pub fn new(backend: &'a mut B, options: &'a RunOptions, output: OutputHandlers) -> Self {
        Self {
            backend,
            options,
            output,
        }
    }

    /// Launch the backend, run every stage, and close the backend whatever
    /// the outcome.
    pub async fn run(self) -> Result<RunSummary, PipelineError> {
        let output = self.output;
        let result = match self.backend.launch().await {
            Ok(()) => execute(&mut *self.backend, self.options, output).await,
            Err(e) => Err(PipelineError::Launch(e)),
        };

        let closed = self.backend.close().await;
        match (result, closed) {
            (Ok(summary), Ok(())) => Ok(summary),
            (Ok(_), Err(e)) => Err(PipelineError::Close(e)),
            (Err(e), Ok(())) => {
                output.failed(&format!("{} stage: {}", e.stage(), e));
                Err(e)
            }
            (Err(e), Err(close_err)) => {
                tracing::warn!("Failed to close browser after error: {}", close_err);
                output.failed(&format!("{} stage: {}", e.stage(), e));
                Err(e)
            }
        }
    }
}

async fn execute<B: Backend + ?Sized>(
    backend: &mut B,
    options: &RunOptions,
    output: OutputHandlers,
) -> Result<RunSummary, PipelineError> {
    let css = source::load_stylesheet(&options.stylesheet)
        .await
        .map_err(PipelineError::Fetch)?;

    let sheet = parse_stylesheet(&css);
    for err in &sheet.errors {
        tracing::warn!(position = %err.position, "skipped invalid rule: {}", err.text);
    }
    if options.strict_parse
        && let Some(first) = sheet.errors.first()
    {
        return Err(PipelineError::Parse {
            count: sheet.errors.len(),
            position: first.position,
            text: first.text.clone(),
        });
    }
    let records = SelectorExtractor::new()
        .nested_groups(options.nested_groups)
        .extract(&sheet);
    let selectors = records.len();
    output.selectors_found(selectors);

    let resolver = match &options.sourcemap {
        Some(path) => {
            let raw = source::load_source_map(path)
                .await
                .map_err(PipelineError::SourceMapRead)?;
            PositionResolver::from_slice(&raw).inspect_err(|e| {
                tracing::error!("Source map {} is unusable: {}", path.display(), e);
            })?
        }
        None => PositionResolver::none(),
    };

    let pages = source::load_links(&options.links)
        .await
        .map_err(PipelineError::Links)?;
    tracing::info!(pages = pages.len(), selectors, "starting scan");

    let probe = UsageProbe::new(options.batch);
    let survivors = SurvivalReducer::new(&probe)
        .stop_when_empty(options.stop_when_empty)
        .reduce(
            backend,
            &pages,
            records,
            |url| output.scanning(url),
            |progress| output.page_done(progress),
        )
        .await?;

    let report = ReportBuilder::new(&resolver)
        .mark_indeterminate(options.mark_indeterminate)
        .build(survivors);

    report
        .write_to(&options.output, options.pretty)
        .await
        .inspect_err(|e| tracing::error!("{}", e))?;
    output.written(&options.output.display().to_string());

    Ok(RunSummary {
        selectors,
        pages: pages.len(),
        report,
    })
}
