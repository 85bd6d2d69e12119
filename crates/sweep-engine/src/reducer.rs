//! Page-by-page narrowing of the set of unused selectors.

use crate::backend::{Backend, BackendError};
use crate::probe::UsageProbe;
use sweep_common::protocol::{SelectorRecord, Usage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("Failed to load page {url}: {source}")]
    PageLoad {
        url: String,
        #[source]
        source: BackendError,
    },
}

/// Reported after every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based index of the page in the input list.
    pub index: usize,
    pub url: String,
    /// Records removed by this page.
    pub removed: usize,
    /// Size of the working set after this page.
    pub remaining: usize,
}

pub struct SurvivalReducer<'a> {
    probe: &'a UsageProbe,
    stop_when_empty: bool,
}

impl<'a> SurvivalReducer<'a> {
    pub fn new(probe: &'a UsageProbe) -> Self {
        Self {
            probe,
            stop_when_empty: false,
        }
    }

    /// Skip the remaining pages once nothing is left to prove used.
    pub fn stop_when_empty(mut self, stop: bool) -> Self {
        self.stop_when_empty = stop;
        self
    }

    /// Drive `pages` through the probe strictly in order, one page at a time.
    ///
    /// The working set only ever shrinks. `on_page` is called once per page
    /// that was probed; `on_visit` right before a page is loaded.
    pub async fn reduce<B, V, P>(
        &self,
        backend: &mut B,
        pages: &[String],
        initial: Vec<SelectorRecord>,
        mut on_visit: V,
        mut on_page: P,
    ) -> Result<Vec<SelectorRecord>, ReduceError>
    where
        B: Backend + ?Sized,
        V: FnMut(&str),
        P: FnMut(&PageProgress),
    {
        let mut working = initial;

        for (index, url) in pages.iter().enumerate() {
            if self.stop_when_empty && working.is_empty() {
                tracing::info!("working set is empty, skipping {} page(s)", pages.len() - index);
                break;
            }

            on_visit(url);
            let mut page = backend
                .open_page(url)
                .await
                .map_err(|source| ReduceError::PageLoad {
                    url: url.clone(),
                    source,
                })?;

            let selectors: Vec<&str> = working.iter().map(|r| r.selector.as_str()).collect();
            let usages = self.probe.probe_all(&mut *page, &selectors).await;

            if let Err(e) = page.close().await {
                tracing::warn!(url = %url, "failed to close page: {}", e);
            }

            let before = working.len();
            working = retain_unused(working, &usages);
            let progress = PageProgress {
                index: index + 1,
                url: url.clone(),
                removed: before - working.len(),
                remaining: working.len(),
            };
            tracing::debug!(?progress, "page probed");
            on_page(&progress);
        }

        Ok(working)
    }
}

/// Keep records whose usage is not [`Usage::Used`], flagging the ones that
/// could not be evaluated.
fn retain_unused(records: Vec<SelectorRecord>, usages: &[Usage]) -> Vec<SelectorRecord> {
    // probe_all returns one usage per selector, even when the page failed.
    debug_assert_eq!(records.len(), usages.len());
    records
        .into_iter()
        .zip(usages.iter().copied())
        .filter_map(|(mut record, usage)| match usage {
            Usage::Used => None,
            Usage::Unused => Some(record),
            Usage::Indeterminate => {
                record.indeterminate = true;
                Some(record)
            }
        })
        .collect()
}
