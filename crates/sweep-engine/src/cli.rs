//! User-facing progress output, kept apart from `tracing` logs.

use crate::reducer::PageProgress;

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

impl OutputHandlers {
    /// Handlers that discard everything.
    pub fn silent() -> Self {
        Self {
            out: |_| {},
            err: |_| {},
        }
    }

    pub fn selectors_found(&self, count: usize) {
        (self.out)(&format!("{} selectors before scanning", count));
    }

    pub fn scanning(&self, url: &str) {
        (self.out)(&format!("scanning... {}", url));
    }

    pub fn page_done(&self, progress: &PageProgress) {
        (self.out)(&format!("unused selectors: {}", progress.remaining));
    }

    pub fn written(&self, path: &str) {
        (self.out)(&format!("{} written successfully.", path));
    }

    pub fn failed(&self, message: &str) {
        (self.err)(&format!("Error: {}", message));
    }
}
