use crate::cdp::CdpClient;
use crate::inject::{self, EVAL_TIMEOUT, EvalError};
use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::Duration;
use sweep_engine::backend::{Backend, BackendError, PageSession};
use sweep_engine::protocol::Usage;
use tracing::info;

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    visible: bool,
    eval_timeout: Duration,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            client: None,
            visible: false,
            eval_timeout: EVAL_TIMEOUT,
        }
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            visible,
            ..Self::new()
        }
    }

    pub fn with_eval_timeout(mut self, timeout: Duration) -> Self {
        self.eval_timeout = timeout;
        self
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(self.visible)
            .await
            .map_err(|e| BackendError::Launch(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn open_page(&mut self, url: &str) -> Result<Box<dyn PageSession>, BackendError> {
        let client = self.client.as_ref().ok_or(BackendError::NotReady)?;

        info!("Navigating to: {}", url);
        let page = client
            .open_page(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Ok(Box::new(HeadlessPage {
            page,
            url: url.to_string(),
            eval_timeout: self.eval_timeout,
        }))
    }
}

/// One loaded Chromium tab.
pub struct HeadlessPage {
    page: Page,
    url: String,
    eval_timeout: Duration,
}

fn map_eval_error(err: EvalError, selector: Option<&str>) -> BackendError {
    match err {
        EvalError::Timeout => BackendError::TimeoutWithContext {
            operation: "selector probe".into(),
        },
        EvalError::Context(msg) => BackendError::Navigation(msg),
        EvalError::Other(msg) => match selector {
            Some(selector) if inject::is_selector_syntax_error(&msg) => {
                BackendError::SelectorInvalid {
                    selector: selector.to_string(),
                }
            }
            _ => BackendError::ScriptError(msg),
        },
    }
}

#[async_trait]
impl PageSession for HeadlessPage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn query_any(&mut self, selector: &str) -> Result<bool, BackendError> {
        inject::query_selector(&self.page, selector, self.eval_timeout)
            .await
            .map_err(|e| map_eval_error(e, Some(selector)))
    }

    async fn query_batch(&mut self, selectors: &[String]) -> Result<Vec<Usage>, BackendError> {
        let answers = inject::probe_selectors(&self.page, selectors, self.eval_timeout)
            .await
            .map_err(|e| map_eval_error(e, None))?;
        Ok(answers.into_iter().map(Usage::from_probe).collect())
    }

    async fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.page
            .close()
            .await
            .map_err(|e| BackendError::Other(format!("Failed to close page: {}", e)))
    }
}
