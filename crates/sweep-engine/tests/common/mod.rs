#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use sweep_engine::backend::{Backend, BackendError, PageSession};
use sweep_engine::protocol::Usage;

/// Scripted backend: each URL maps to the selectors its DOM matches.
#[derive(Default)]
pub struct MockBackend {
    pub pages: HashMap<String, HashSet<String>>,
    /// Selectors the fake DOM engine rejects.
    pub invalid: HashSet<String>,
    /// URLs that fail to load.
    pub broken: HashSet<String>,
    /// Answer `query_batch` in one call instead of the trait default.
    pub native_batch: bool,
    pub launched: bool,
    pub closed: bool,
    pub opened: Vec<String>,
    pub queries: Arc<Mutex<Vec<String>>>,
    pub batch_calls: Arc<Mutex<usize>>,
    pub open_pages: Arc<Mutex<usize>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, matching: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            matching.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn invalid(mut self, selector: &str) -> Self {
        self.invalid.insert(selector.to_string());
        self
    }

    pub fn broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    pub fn native_batch(mut self) -> Self {
        self.native_batch = true;
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        self.launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.launched && !self.closed
    }

    async fn open_page(&mut self, url: &str) -> Result<Box<dyn PageSession>, BackendError> {
        if !self.launched {
            return Err(BackendError::NotReady);
        }
        self.opened.push(url.to_string());
        if self.broken.contains(url) {
            return Err(BackendError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED {}", url)));
        }

        {
            let mut open = self.open_pages.lock().unwrap();
            assert_eq!(*open, 0, "pages must not be held concurrently");
            *open += 1;
        }

        let page = MockPage {
            url: url.to_string(),
            matching: self.pages.get(url).cloned().unwrap_or_default(),
            invalid: self.invalid.clone(),
            queries: Arc::clone(&self.queries),
            open_pages: Arc::clone(&self.open_pages),
        };
        if self.native_batch {
            Ok(Box::new(BatchPage {
                inner: page,
                batch_calls: Arc::clone(&self.batch_calls),
            }))
        } else {
            Ok(Box::new(page))
        }
    }
}

pub struct MockPage {
    url: String,
    matching: HashSet<String>,
    invalid: HashSet<String>,
    queries: Arc<Mutex<Vec<String>>>,
    open_pages: Arc<Mutex<usize>>,
}

impl MockPage {
    fn evaluate(&self, selector: &str) -> Option<bool> {
        self.queries.lock().unwrap().push(selector.to_string());
        if self.invalid.contains(selector) {
            return None;
        }
        Some(self.matching.contains(selector))
    }
}

#[async_trait]
impl PageSession for MockPage {
    fn url(&self) -> &str {
        &self.url
    }

    async fn query_any(&mut self, selector: &str) -> Result<bool, BackendError> {
        self.evaluate(selector)
            .ok_or_else(|| BackendError::SelectorInvalid {
                selector: selector.to_string(),
            })
    }

    async fn close(self: Box<Self>) -> Result<(), BackendError> {
        *self.open_pages.lock().unwrap() -= 1;
        Ok(())
    }
}

/// Page that answers a whole batch in one evaluation.
pub struct BatchPage {
    inner: MockPage,
    batch_calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl PageSession for BatchPage {
    fn url(&self) -> &str {
        self.inner.url()
    }

    async fn query_any(&mut self, selector: &str) -> Result<bool, BackendError> {
        self.inner.query_any(selector).await
    }

    async fn query_batch(&mut self, selectors: &[String]) -> Result<Vec<Usage>, BackendError> {
        *self.batch_calls.lock().unwrap() += 1;
        Ok(selectors
            .iter()
            .map(|s| Usage::from_probe(self.inner.evaluate(s)))
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<(), BackendError> {
        Box::new(self.inner).close().await
    }
}
