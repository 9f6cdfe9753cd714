use leptos::prelude::*;
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;

use crate::components::reset_button::ResetButton;
use crate::components::workout_form::WorkoutForm;
use crate::components::workout_list::WorkoutList;
use crate::config::TrackerConfig;
use crate::location::{BrowserLocator, Locator};
use crate::map::{LeafletMap, MapView};
use crate::storage::{BrowserStorage, WorkoutStore};
use crate::tracker::{Tracker, WorkoutInput};
use crate::workout::{Workout, WorkoutId};

/// Id of the element Leaflet renders into.
const MAP_CONTAINER_ID: &str = "map";

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn reload_page() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().reload();
    }
}

#[component]
pub fn App(config: TrackerConfig) -> impl IntoView {
    let store = WorkoutStore::new(BrowserStorage::open(), config.storage_key.clone());
    let tracker = StoredValue::new_local(Tracker::<LeafletMap, BrowserStorage>::new(
        store,
        config.zoom,
    ));
    // Bumped after every change to the tracker so views re-read it
    let revision = Trigger::new();

    let reset_delay_ms = config.form_reset_delay_ms;

    // Locate the user, then build the map around them
    Effect::new(move |_| {
        let config = config.clone();
        spawn_local(async move {
            let center = match BrowserLocator.current_position().await {
                Ok(center) => center,
                Err(e) => {
                    warn!("{}", e);
                    return;
                }
            };
            let map = match LeafletMap::initialize(MAP_CONTAINER_ID, center, &config) {
                Ok(map) => map,
                Err(e) => {
                    warn!("{}", e);
                    return;
                }
            };

            map.on_click(Box::new(move |at| {
                tracker.update_value(|t| t.show_form(at));
                revision.notify();
            }));
            tracker.update_value(|t| t.attach_map(map));
        });
    });

    let form_open = Signal::derive(move || {
        revision.track();
        tracker.with_value(|t| t.form().is_open())
    });

    let workouts = Signal::derive(move || {
        revision.track();
        tracker.with_value(|t| t.workouts().to_vec())
    });

    let on_submit = Callback::new(move |input: WorkoutInput| {
        let outcome = tracker.try_update_value(|t| t.submit(&input).map(|_| ()));
        match outcome {
            Some(Ok(())) => {
                revision.notify();
                true
            }
            Some(Err(e)) => {
                alert(&e.to_string());
                false
            }
            None => false,
        }
    });

    let on_select = Callback::new(move |id: WorkoutId| {
        let visits = tracker
            .try_update_value(|t| t.select(&id).map(Workout::visit_count))
            .flatten();
        match visits {
            Some(n) => debug!("Selected workout {} ({} visits)", id, n),
            None => warn!("Workout {} is not in the list", id),
        }
    });

    let on_reset = Callback::new(move |_: ()| {
        match tracker.try_update_value(|t| t.reset()) {
            Some(Ok(())) => reload_page(),
            Some(Err(e)) => {
                warn!("Reset failed: {}", e);
                alert(&e.to_string());
            }
            None => {}
        }
    });

    view! {
        <div class="sidebar">
            <h1 class="logo">"Workout Map"</h1>
            <WorkoutList workouts=workouts on_select=on_select>
                <WorkoutForm
                    open=form_open
                    on_submit=on_submit
                    reset_delay_ms=reset_delay_ms
                />
            </WorkoutList>
            <ResetButton on_reset=on_reset />
            <p class="copyright">
                "Map data \u{A9} OpenStreetMap contributors. Click the map to log a workout."
            </p>
        </div>
        <div id=MAP_CONTAINER_ID></div>
    }
}
