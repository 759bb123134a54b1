use crate::config::Config;
use crate::report::generator::ReportGenerator;
use crate::report::store::ReportStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Wraps the optional completion service. Unconfigured means demo-mode reports.
    pub generator: ReportGenerator,
    /// Process-wide report history; Redis-backed when `REDIS_URL` is set.
    pub store: ReportStore,
    pub config: Config,
}
