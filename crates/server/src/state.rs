//! Application state shared across handlers.

use parcel_core::ContentLayout;
use parcel_core::config::AppConfig;
use parcel_notify::Notifier;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Content root resolver.
    pub layout: ContentLayout,
    /// Upload notification strategy.
    pub notifier: Notifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The configuration is expected to be validated already.
    pub fn new(config: AppConfig, notifier: Notifier) -> Self {
        let layout = ContentLayout::new(config.server.content_root.clone());
        Self {
            config: Arc::new(config),
            layout,
            notifier,
        }
    }
}
