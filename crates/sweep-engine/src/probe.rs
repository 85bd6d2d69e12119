//! Decides whether a selector matches anything on a loaded page.

use crate::backend::PageSession;
use std::borrow::Cow;
use sweep_common::protocol::Usage;

/// Pseudo suffixes that cannot be asserted on a static DOM. A selector whose
/// first `:` segment is one of these is probed by its base element only.
pub const STATE_PSEUDO_CLASSES: &[&str] = &["hover", "before", "after", "active", "focus"];

/// Undo HTML escaping of the child combinator.
pub fn normalize_selector(selector: &str) -> Cow<'_, str> {
    if selector.contains("&gt;") {
        Cow::Owned(selector.replace("&gt;", ">"))
    } else {
        Cow::Borrowed(selector)
    }
}

/// The selector actually sent to `querySelectorAll`.
///
/// `button:hover` probes `button`; `button:nth-child(2)` is left alone.
pub fn probe_target(selector: &str) -> String {
    let normalized = normalize_selector(selector);
    let mut segments = normalized.split(':');
    let base = segments.next().unwrap_or_default();
    match segments.next() {
        Some(pseudo) if STATE_PSEUDO_CLASSES.contains(&pseudo) => base.to_string(),
        _ => normalized.into_owned(),
    }
}

pub struct UsageProbe {
    batch: bool,
}

impl Default for UsageProbe {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UsageProbe {
    pub fn new(batch: bool) -> Self {
        Self { batch }
    }

    /// Probe a single selector. Never fails: an evaluation error is
    /// reported as [`Usage::Indeterminate`].
    pub async fn is_used(&self, page: &mut dyn PageSession, selector: &str) -> Usage {
        let target = probe_target(selector);
        match page.query_any(&target).await {
            Ok(true) => Usage::Used,
            Ok(false) => Usage::Unused,
            Err(e) => {
                tracing::debug!(selector = %target, url = page.url(), "probe failed: {}", e);
                Usage::Indeterminate
            }
        }
    }

    /// Probe every selector against one page, preserving order.
    pub async fn probe_all(&self, page: &mut dyn PageSession, selectors: &[&str]) -> Vec<Usage> {
        if selectors.is_empty() {
            return Vec::new();
        }

        if !self.batch {
            let mut out = Vec::with_capacity(selectors.len());
            for selector in selectors {
                out.push(self.is_used(page, selector).await);
            }
            return out;
        }

        let targets: Vec<String> = selectors.iter().map(|s| probe_target(s)).collect();
        match page.query_batch(&targets).await {
            Ok(usages) if usages.len() == targets.len() => usages,
            Ok(usages) => {
                tracing::warn!(
                    url = page.url(),
                    "probe returned {} answers for {} selectors",
                    usages.len(),
                    targets.len()
                );
                vec![Usage::Indeterminate; targets.len()]
            }
            Err(e) => {
                if e.is_page_local() {
                    tracing::warn!(url = page.url(), "batch probe failed: {}", e);
                } else {
                    tracing::error!(url = page.url(), code = e.code(), "batch probe failed: {}", e);
                }
                vec![Usage::Indeterminate; targets.len()]
            }
        }
    }
}
