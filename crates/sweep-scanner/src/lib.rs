/// The in-page selector probe.
/// This string is injected into every page a backend opens.
pub const PROBE_JS: &str = include_str!("probe.js");

/// Global the probe installs itself under.
pub const PROBE_GLOBAL: &str = "window.__sweepProbe";
