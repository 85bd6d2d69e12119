use super::loader::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Stylesheet URL or local path.
    #[serde(default)]
    pub stylesheet: Option<String>,
    #[serde(default)]
    pub sourcemap: Option<PathBuf>,
    /// Newline-delimited list of page URLs.
    #[serde(default)]
    pub links: Option<PathBuf>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub parse: ParseConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            stylesheet: None,
            sourcemap: None,
            links: None,
            output: default_output(),
            probe: ProbeConfig::default(),
            browser: BrowserConfig::default(),
            report: ReportConfig::default(),
            parse: ParseConfig::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("./default.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Probe all selectors of a page in one evaluation.
    #[serde(default = "default_batch")]
    pub batch: bool,
    #[serde(default)]
    pub stop_when_empty: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            batch: default_batch(),
            stop_when_empty: false,
        }
    }
}

fn default_batch() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_eval_timeout_ms")]
    pub eval_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            visible: false,
            eval_timeout_ms: default_eval_timeout_ms(),
        }
    }
}

fn default_eval_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub mark_indeterminate: bool,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mark_indeterminate: false,
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Fail the run when the stylesheet contains rules that had to be skipped.
    #[serde(default)]
    pub strict: bool,
    /// Audit style rules nested in `@media`, `@supports` and similar blocks.
    #[serde(default)]
    pub nested_groups: bool,
}

/// Fully-resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub stylesheet: String,
    pub sourcemap: Option<PathBuf>,
    pub links: PathBuf,
    pub output: PathBuf,
    pub batch: bool,
    pub stop_when_empty: bool,
    pub mark_indeterminate: bool,
    pub pretty: bool,
    pub strict_parse: bool,
    pub nested_groups: bool,
}

impl RunOptions {
    pub fn from_config(config: &SweepConfig) -> Result<Self, ConfigError> {
        let stylesheet = config
            .stylesheet
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("stylesheet"))?;
        let links = config.links.clone().ok_or(ConfigError::Missing("links"))?;

        Ok(Self {
            stylesheet,
            sourcemap: config.sourcemap.clone(),
            links,
            output: config.output.clone(),
            batch: config.probe.batch,
            stop_when_empty: config.probe.stop_when_empty,
            mark_indeterminate: config.report.mark_indeterminate,
            pretty: config.report.pretty,
            strict_parse: config.parse.strict,
            nested_groups: config.parse.nested_groups,
        })
    }
}
