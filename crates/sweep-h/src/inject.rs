use chromiumoxide::Page;
use std::future::Future;
use std::time::Duration;
use sweep_scanner::{PROBE_GLOBAL, PROBE_JS};

/// Default timeout for JavaScript evaluation (10 seconds).
/// This prevents hanging when dialogs (alert/confirm/prompt) block the JS thread.
pub const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

/// Whether an evaluation error is the DOM engine rejecting a selector.
pub fn is_selector_syntax_error(err: &str) -> bool {
    err.contains("SyntaxError") || err.contains("is not a valid selector")
}

/// Retry an async operation that may fail due to context errors during page navigation.
/// Returns immediately on success or non-context errors; retries only on context errors.
async fn retry_on_context_error<T, F, Fut>(
    operation_name: &str,
    mut operation: F,
) -> Result<T, EvalError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EvalError>>,
{
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "{} context error (attempt {}/{}), retrying...",
                    operation_name,
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(other) => return Err(other),
        }
    }

    Err(EvalError::Context(last_error.unwrap_or_else(|| {
        format!("{} failed after retries", operation_name)
    })))
}

pub async fn inject_probe(page: &Page, timeout: Duration) -> Result<(), EvalError> {
    retry_on_context_error("Probe injection", || try_inject_probe(page, timeout)).await
}

/// Internal function that attempts probe injection once.
async fn try_inject_probe(page: &Page, timeout: Duration) -> Result<(), EvalError> {
    let check = format!("typeof {} !== 'undefined'", PROBE_GLOBAL);
    let is_loaded = evaluate_with_timeout(page, &check, timeout).await?;

    if is_loaded.as_bool() != Some(true) {
        evaluate_with_timeout(page, PROBE_JS, timeout).await?;
    }

    Ok(())
}

pub fn probe_expression(selectors: &[String]) -> Result<String, serde_json::Error> {
    Ok(format!(
        "{}.probe({})",
        PROBE_GLOBAL,
        serde_json::to_string(selectors)?
    ))
}

pub fn match_expression(selector: &str) -> Result<String, serde_json::Error> {
    Ok(format!(
        "document.querySelectorAll({}).length > 0",
        serde_json::to_string(selector)?
    ))
}

/// Probe every selector in one evaluation. `None` marks a selector the
/// page rejected.
pub async fn probe_selectors(
    page: &Page,
    selectors: &[String],
    timeout: Duration,
) -> Result<Vec<Option<bool>>, EvalError> {
    let expression = probe_expression(selectors).map_err(|e| EvalError::Other(e.to_string()))?;
    tracing::debug!("Probing {} selectors", selectors.len());

    let expression = expression.as_str();
    let value = retry_on_context_error("Selector probe", move || async move {
        inject_probe(page, timeout).await?;
        evaluate_with_timeout(page, expression, timeout).await
    })
    .await?;

    serde_json::from_value(value)
        .map_err(|e| EvalError::Other(format!("Unexpected probe result: {}", e)))
}

/// Evaluate a single `querySelectorAll` without the injected probe, so that
/// engine errors surface to the caller.
pub async fn query_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<bool, EvalError> {
    let expression = match_expression(selector).map_err(|e| EvalError::Other(e.to_string()))?;
    let expression = expression.as_str();
    let value = retry_on_context_error("Selector query", move || {
        evaluate_with_timeout(page, expression, timeout)
    })
    .await?;

    value
        .as_bool()
        .ok_or_else(|| EvalError::Other(format!("Expected boolean, got {}", value)))
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
    timeout: Duration,
) -> Result<serde_json::Value, EvalError> {
    let eval_result = tokio::time::timeout(timeout, page.evaluate(expression)).await;

    match eval_result {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(remote_object)) => remote_object
            .into_value::<serde_json::Value>()
            .map_err(|e| EvalError::Other(format!("Failed to get result: {}", e))),
    }
}
