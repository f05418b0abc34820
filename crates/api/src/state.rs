use std::sync::Arc;

use formrelay_engine::SurveyService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; all inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The survey lifecycle service.
    pub service: Arc<SurveyService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
