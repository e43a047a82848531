/// Tab Shepherd - Chrome Extension for automatic tab grouping
/// Built with Rust + WASM + Yew

mod archive;
mod background;
mod error;
mod grouping;
mod message;
mod restore;
mod rules;
mod tab_data;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the options page
#[wasm_bindgen]
pub fn start_options() {
    yew::Renderer::<ui::options::Options>::new().render();
}

// --- Background coordinator entry points ---
// The service worker is a thin JS shim: it registers the chrome.* listeners
// and forwards every event here.

/// Load (or seed) the grouping rules. Call once when the worker starts.
#[wasm_bindgen]
pub async fn background_init() {
    background::init().await;
}

/// chrome.tabs.onCreated
#[wasm_bindgen]
pub async fn on_tab_created(tab: JsValue) {
    background::tab_created(tab).await;
}

/// chrome.tabs.onUpdated
#[wasm_bindgen]
pub async fn on_tab_updated(change_info: JsValue, tab: JsValue) {
    background::tab_updated(change_info, tab).await;
}

/// chrome.tabs.onActivated
#[wasm_bindgen]
pub async fn on_tab_activated(active_info: JsValue) {
    background::tab_activated(active_info).await;
}

/// chrome.tabGroups.onRemoved
#[wasm_bindgen]
pub async fn on_group_removed(group: JsValue) {
    background::group_removed(group).await;
}

/// chrome.storage.onChanged, filtered to the groupingPatterns key
#[wasm_bindgen]
pub fn on_rules_changed(new_rules: JsValue) {
    background::rules_changed(new_rules);
}

/// chrome.runtime.onMessage
#[wasm_bindgen]
pub async fn on_runtime_message(message: JsValue) {
    background::runtime_message(message).await;
}
