use async_trait::async_trait;
pub use sweep_common::error::backend_error::BackendError;
use sweep_common::protocol::Usage;

/// The Backend trait is the interface every browser driver implements.
///
/// A backend owns one browser process for the duration of a run and hands
/// out one [`PageSession`] per page URL.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to open pages.
    async fn is_ready(&self) -> bool;

    /// Load `url` in a fresh page and return a handle to it once loaded.
    async fn open_page(&mut self, url: &str) -> Result<Box<dyn PageSession>, BackendError>;
}

/// A loaded page whose live DOM can be queried.
#[async_trait]
pub trait PageSession: Send {
    /// URL the session was opened with.
    fn url(&self) -> &str;

    /// Whether `document.querySelectorAll(selector)` returns at least one node.
    async fn query_any(&mut self, selector: &str) -> Result<bool, BackendError>;

    /// Probe every selector in one round-trip where the backend supports it.
    ///
    /// The default issues one [`query_any`](Self::query_any) per selector and
    /// maps a failed evaluation to [`Usage::Indeterminate`].
    async fn query_batch(&mut self, selectors: &[String]) -> Result<Vec<Usage>, BackendError> {
        let mut out = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let usage = match self.query_any(selector).await {
                Ok(true) => Usage::Used,
                Ok(false) => Usage::Unused,
                Err(_) => Usage::Indeterminate,
            };
            out.push(usage);
        }
        Ok(out)
    }

    /// Release the page.
    async fn close(self: Box<Self>) -> Result<(), BackendError>;
}
