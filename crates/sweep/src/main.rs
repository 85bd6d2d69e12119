use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sweep_engine::cli::OutputHandlers;
use sweep_engine::config::{ConfigLoader, RunOptions, SweepConfig};
use sweep_engine::pipeline::RunContext;
use sweep_h::HeadlessBackend;
use tracing_subscriber::EnvFilter;

/// Find CSS selectors that no page in a list ever matches.
#[derive(Parser, Debug)]
#[command(name = "sweep", version, about)]
struct Args {
    /// Stylesheet URL (https://...) or local path
    #[arg(long, short = 's')]
    stylesheet: Option<String>,

    /// Source map of the stylesheet, for original file/line/column
    #[arg(long, short = 'm')]
    sourcemap: Option<PathBuf>,

    /// File with one page URL per line
    #[arg(long, short = 'l')]
    links: Option<PathBuf>,

    /// Where to write the JSON report [default: ./default.json]
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Config file (defaults to ./sweep.yaml, then ~/.sweep/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Launch browser in visible mode (not headless)
    #[arg(long)]
    visible: bool,

    /// Probe one selector per evaluation instead of one batch per page
    #[arg(long)]
    no_batch: bool,

    /// Stop visiting pages once every selector is proven used
    #[arg(long)]
    stop_when_empty: bool,

    /// Add "indeterminate": true to selectors that could not be evaluated
    #[arg(long)]
    mark_indeterminate: bool,

    /// Fail when the stylesheet contains rules that had to be skipped
    #[arg(long)]
    strict: bool,

    /// Also audit selectors inside @media, @supports and similar blocks
    #[arg(long)]
    nested_groups: bool,

    /// Write the report on a single line
    #[arg(long)]
    compact: bool,
}

impl Args {
    /// Command-line values win over the config file.
    fn apply(self, mut config: SweepConfig) -> SweepConfig {
        if let Some(stylesheet) = self.stylesheet {
            config.stylesheet = Some(stylesheet);
        }
        if let Some(sourcemap) = self.sourcemap {
            config.sourcemap = Some(sourcemap);
        }
        if let Some(links) = self.links {
            config.links = Some(links);
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        config.browser.visible |= self.visible;
        config.probe.batch &= !self.no_batch;
        config.probe.stop_when_empty |= self.stop_when_empty;
        config.report.mark_indeterminate |= self.mark_indeterminate;
        config.report.pretty &= !self.compact;
        config.parse.strict |= self.strict;
        config.parse.nested_groups |= self.nested_groups;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries progress only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default()
            .await
            .context("loading default config")?,
    };
    let config = args.apply(config);
    let options = RunOptions::from_config(&config).context("invalid run configuration")?;

    let mut backend = HeadlessBackend::new_with_visibility(config.browser.visible)
        .with_eval_timeout(Duration::from_millis(config.browser.eval_timeout_ms));

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| eprintln!("{}", msg),
    };

    let summary = RunContext::new(&mut backend, &options, output)
        .run()
        .await
        .context("sweep run failed")?;

    tracing::info!(
        selectors = summary.selectors,
        pages = summary.pages,
        unused = summary.report.len(),
        "run complete"
    );
    Ok(())
}
