//! Shared application state handed to every handler.

use std::sync::Arc;

use tabsplit_scan::ReceiptScanner;
use tabsplit_store::Store;

use crate::config::ApiConfig;

/// Everything a handler may need. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Sessions, participants, items, assignments and receipt images
    pub store: Store,

    /// Vision model, or a stub in tests
    pub scanner: Arc<dyn ReceiptScanner>,

    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Store, scanner: Arc<dyn ReceiptScanner>, config: ApiConfig) -> Self {
        AppState {
            store,
            scanner,
            config: Arc::new(config),
        }
    }
}
