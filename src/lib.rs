pub mod app;
pub mod auth;
pub mod config;
pub mod deadline;
pub mod error;
pub mod model;
pub mod report;
pub mod session;
pub mod store;
pub mod submit;

use crate::auth::AdminAuth;
use crate::config::AppConfig;
use crate::session::SessionRegistry;
use crate::store::RsvpStore;

/// Shared state behind every handler: the static event configuration, the
/// CSV-backed response store, per-visitor form sessions and admin auth.
pub struct AppState {
    pub config: AppConfig,
    pub store: RsvpStore,
    pub sessions: SessionRegistry,
    pub auth: AdminAuth,
}

impl AppState {
    pub fn new(config: AppConfig, admin_password: String) -> Self {
        let store = RsvpStore::new(&config.storage.path);
        Self {
            config,
            store,
            sessions: SessionRegistry::new(),
            auth: AdminAuth::new(admin_password),
        }
    }
}
