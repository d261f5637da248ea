//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;

use board_engine::{EntityId, SettingsStore};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::settings::LocalStorage;

/// App-wide values provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    config: StoredValue<AppConfig>,
    /// Bumped to make every loader run again
    pub reload_trigger: ReadSignal<u32>,
    set_reload_trigger: WriteSignal<u32>,
    /// Project shown on the board
    pub current_project: ReadSignal<Option<EntityId>>,
    set_current_project: WriteSignal<Option<EntityId>>,
}

impl AppContext {
    pub fn new(config: AppConfig, current_project: Option<EntityId>) -> Self {
        let (reload_trigger, set_reload_trigger) = signal(0u32);
        let (current_project, set_current_project) = signal(current_project);
        Self {
            config: StoredValue::new(config),
            reload_trigger,
            set_reload_trigger,
            current_project,
            set_current_project,
        }
    }

    pub fn banner_timeout_ms(&self) -> u32 {
        self.config.with_value(|c| c.banner_timeout_ms)
    }

    /// Fresh client; picks up a token stored since the last call
    pub fn api(&self) -> ApiClient {
        let base_url = self.config.with_value(|c| c.api_base_url.clone());
        ApiClient::new(base_url, LocalStorage.token())
    }

    /// Trigger a reload of everything
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    pub fn open_project(&self, project_id: EntityId) {
        self.set_current_project.set(Some(project_id));
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
