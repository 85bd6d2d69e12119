/// Errors raised by a browser backend or one of its page sessions.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BackendError {
    // ============================================================
    // Navigation Errors
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    // ============================================================
    // Execution Errors
    // ============================================================
    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Timeout: {operation}")]
    TimeoutWithContext { operation: String },

    // ============================================================
    // System Errors
    // ============================================================
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Not ready")]
    NotReady,

    #[error("Other: {0}")]
    Other(String),
}

impl BackendError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::ScriptError(_) => "SCRIPT_ERROR",
            BackendError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            BackendError::TimeoutWithContext { .. } => "TIMEOUT",
            BackendError::Launch(_) => "LAUNCH_ERROR",
            BackendError::NotReady => "NOT_READY",
            BackendError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error leaves the browser usable for the next page.
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            BackendError::ScriptError(_)
                | BackendError::SelectorInvalid { .. }
                | BackendError::TimeoutWithContext { .. }
        )
    }
}
