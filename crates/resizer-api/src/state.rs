//! Application state shared by all handlers.

use resizer_core::Config;
use resizer_storage::StorageSet;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: StorageSet,
}

impl AppState {
    pub fn new(config: Config, storage: StorageSet) -> Self {
        Self { config, storage }
    }
}
