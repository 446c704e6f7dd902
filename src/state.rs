use std::sync::Arc;

use crate::{config::AppConfig, notify::NotificationService, store::EventStore};

/// Shared handles injected into every handler. Constructed once in `main`
/// (or a test harness); there are no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub notifier: Arc<NotificationService>,
    pub config: Arc<AppConfig>,
}
