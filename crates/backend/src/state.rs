use std::path::PathBuf;
use std::sync::Arc;

use crate::dashboards::d400_client_report::DataProvider;
use crate::shared::config::{get_static_dir, Config};

/// Состояние, общее для всех обработчиков
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn DataProvider>,
    /// Directory with the built frontend (`index.html`, wasm bundle)
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(provider: Arc<dyn DataProvider>, config: &Config) -> Self {
        Self {
            provider,
            static_dir: get_static_dir(config),
        }
    }
}
