use std::sync::Arc;

use crate::config::Config;
use crate::services::Academy;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub academy: Arc<Academy>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<Academy> {
    fn from_ref(state: &AppState) -> Self {
        state.academy.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
