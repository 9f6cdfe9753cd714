mod app;
mod components;
mod config;
mod error;
mod location;
mod logging;
mod map;
mod storage;
mod tracker;
mod workout;

use leptos::prelude::*;

use app::App;
use config::TrackerConfig;

fn main() {
    console_error_panic_hook::set_once();

    let (config, config_error) = TrackerConfig::load();
    logging::init(&config.log_level);
    if let Some(e) = config_error {
        tracing::warn!("{}, using defaults", e);
    }

    leptos::mount::mount_to_body(move || view! { <App config=config /> });
}
