mod common;

use common::MockBackend;
use pretty_assertions::assert_eq;
use sweep_engine::backend::Backend;
use sweep_engine::probe::UsageProbe;
use sweep_engine::protocol::{GeneratedPosition, SelectorRecord};
use sweep_engine::reducer::{PageProgress, ReduceError, SurvivalReducer};

fn records(selectors: &[&str]) -> Vec<SelectorRecord> {
    selectors
        .iter()
        .enumerate()
        .map(|(i, s)| SelectorRecord::new(*s, GeneratedPosition::new(i as u32 + 1, 0)))
        .collect()
}

fn names(records: &[SelectorRecord]) -> Vec<&str> {
    records.iter().map(|r| r.selector.as_str()).collect()
}

fn pages(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

async fn launched(backend: MockBackend) -> MockBackend {
    let mut backend = backend;
    backend.launch().await.unwrap();
    backend
}

#[tokio::test]
async fn removes_selectors_matched_on_any_page() {
    let mut backend = launched(
        MockBackend::new()
            .page("https://site.test/1", &[".a"])
            .page("https://site.test/2", &[".b"]),
    )
    .await;
    let probe = UsageProbe::default();

    let survivors = SurvivalReducer::new(&probe)
        .reduce(
            &mut backend,
            &pages(&["https://site.test/1", "https://site.test/2"]),
            records(&[".a", ".b", ".c"]),
            |_| {},
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(names(&survivors), vec![".c"]);
}

#[tokio::test]
async fn working_set_never_grows_and_later_pages_see_fewer_selectors() {
    let mut backend = launched(
        MockBackend::new()
            .page("p1", &[".a", ".b"])
            .page("p2", &[".a", ".c"])
            .page("p3", &[]),
    )
    .await;
    let probe = UsageProbe::new(false);
    let mut progress: Vec<PageProgress> = Vec::new();

    let survivors = SurvivalReducer::new(&probe)
        .reduce(
            &mut backend,
            &pages(&["p1", "p2", "p3"]),
            records(&[".a", ".b", ".c", ".d"]),
            |_| {},
            |p| progress.push(p.clone()),
        )
        .await
        .unwrap();

    assert_eq!(names(&survivors), vec![".d"]);
    let remaining: Vec<usize> = progress.iter().map(|p| p.remaining).collect();
    assert_eq!(remaining, vec![2, 1, 1]);
    assert!(remaining.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(progress[0].removed, 2);
    assert_eq!(progress[2].index, 3);

    // p1 probes four selectors, p2 the two left, p3 the last one.
    assert_eq!(backend.queried().len(), 4 + 2 + 1);
    assert_eq!(backend.opened, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn zero_pages_keep_everything() {
    let mut backend = launched(MockBackend::new()).await;
    let probe = UsageProbe::default();
    let initial = records(&[".a", ".b"]);

    let survivors = SurvivalReducer::new(&probe)
        .reduce(&mut backend, &[], initial.clone(), |_| {}, |_| {})
        .await
        .unwrap();

    assert_eq!(survivors, initial);
    assert!(backend.queried().is_empty());
}

#[tokio::test]
async fn invalid_selectors_fail_open_to_unused() {
    let mut backend = launched(
        MockBackend::new()
            .page("p1", &[".a"])
            .invalid("a[href"),
    )
    .await;
    let probe = UsageProbe::new(false);

    let survivors = SurvivalReducer::new(&probe)
        .reduce(
            &mut backend,
            &pages(&["p1"]),
            records(&[".a", "a[href", ".z"]),
            |_| {},
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(names(&survivors), vec!["a[href", ".z"]);
    assert!(survivors[0].indeterminate);
    assert!(!survivors[1].indeterminate);
}

#[tokio::test]
async fn pseudo_state_selectors_probe_their_base() {
    let mut backend = launched(MockBackend::new().page("p1", &["button"])).await;
    let probe = UsageProbe::default();

    let survivors = SurvivalReducer::new(&probe)
        .reduce(
            &mut backend,
            &pages(&["p1"]),
            records(&["button:hover", "button:nth-child(2)", "ul &gt; li"]),
            |_| {},
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(
        backend.queried(),
        vec!["button", "button:nth-child(2)", "ul > li"]
    );
    assert_eq!(names(&survivors), vec!["button:nth-child(2)", "ul &gt; li"]);
}

#[tokio::test]
async fn batched_and_single_probing_agree() {
    let build = || {
        MockBackend::new()
            .page("p1", &[".a", "div"])
            .page("p2", &[".c"])
            .invalid(".bad(")
    };
    let initial = records(&[".a", ".b", ".c", "div:focus", ".bad("]);
    let urls = pages(&["p1", "p2"]);

    let mut single = launched(build()).await;
    let single_probe = UsageProbe::new(false);
    let from_single = SurvivalReducer::new(&single_probe)
        .reduce(&mut single, &urls, initial.clone(), |_| {}, |_| {})
        .await
        .unwrap();

    let mut batched = launched(build().native_batch()).await;
    let batch_probe = UsageProbe::new(true);
    let from_batch = SurvivalReducer::new(&batch_probe)
        .reduce(&mut batched, &urls, initial, |_| {}, |_| {})
        .await
        .unwrap();

    assert_eq!(from_single, from_batch);
    assert_eq!(names(&from_batch), vec![".b", ".bad("]);
    assert_eq!(*batched.batch_calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn page_load_failure_aborts_with_url() {
    let mut backend = launched(
        MockBackend::new()
            .page("p1", &[])
            .broken("p2"),
    )
    .await;
    let probe = UsageProbe::default();

    let err = SurvivalReducer::new(&probe)
        .reduce(
            &mut backend,
            &pages(&["p1", "p2", "p3"]),
            records(&[".a"]),
            |_| {},
            |_| {},
        )
        .await
        .unwrap_err();

    let ReduceError::PageLoad { url, .. } = err;
    assert_eq!(url, "p2");
    assert_eq!(backend.opened, vec!["p1", "p2"]);
}

#[tokio::test]
async fn stop_when_empty_skips_remaining_pages() {
    let mut backend = launched(MockBackend::new().page("p1", &[".a"])).await;
    let probe = UsageProbe::default();
    let mut visited = Vec::new();

    let survivors = SurvivalReducer::new(&probe)
        .stop_when_empty(true)
        .reduce(
            &mut backend,
            &pages(&["p1", "p2", "p3"]),
            records(&[".a"]),
            |url| visited.push(url.to_string()),
            |_| {},
        )
        .await
        .unwrap();

    assert!(survivors.is_empty());
    assert_eq!(visited, vec!["p1"]);
}
