//! Browser console sink for the rolling logger

use log::Level;
use rolling_logger::{Entry, Sink};

pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn write(&self, entry: &Entry) {
        let line = wasm_bindgen::JsValue::from(entry.to_string());
        match entry.level {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }
}

pub fn init(config: &crate::config::AppConfig) {
    if let Err(err) = rolling_logger::init(config.log_level, config.log_capacity, Box::new(ConsoleSink)) {
        web_sys::console::warn_1(&err.to_string().into());
    }
}
