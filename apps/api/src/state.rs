use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::config::Config;
use crate::view::controller::ViewController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one view controller for the session.
    pub controller: Arc<ViewController>,
    /// Pluggable analyzer. Default: GeminiResumeAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub config: Config,
}
