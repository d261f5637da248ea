#![allow(warnings)]
//! Kanban Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod logging;
mod settings;
mod store;

use app::App;
use leptos::prelude::*;

use config::AppConfig;
use settings::LocalStorage;

fn main() {
    console_error_panic_hook::set_once();
    let (config, rejected) = AppConfig::load(&LocalStorage);
    logging::init(&config);
    for err in rejected {
        log::warn!("[SETTINGS] Ignoring API URL override: {}", err);
    }
    log::info!("[APP] Starting, API at {}", config.api_base_url);
    mount_to_body(move || view! { <App config=config /> });
}
