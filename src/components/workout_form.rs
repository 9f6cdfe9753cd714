use std::time::Duration;

use leptos::ev::SubmitEvent;
use leptos::html;
use leptos::prelude::*;

use crate::tracker::WorkoutInput;
use crate::workout::ActivityKind;

/// The new-workout form. It sits as the first item of the workout list and
/// is only visible while a map click has it open.
#[component]
pub fn WorkoutForm(
    /// Whether a map click has opened the form.
    #[prop(into)]
    open: Signal<bool>,
    /// Called with the typed fields; returns `true` when a workout was recorded.
    on_submit: Callback<WorkoutInput, bool>,
    /// How long the form stays `display: none` after a successful submit.
    reset_delay_ms: u64,
) -> impl IntoView {
    let (kind, set_kind) = signal(ActivityKind::Running);
    let (distance, set_distance) = signal(String::new());
    let (duration, set_duration) = signal(String::new());
    let (cadence, set_cadence) = signal(String::new());
    let (elevation_gain, set_elevation_gain) = signal(String::new());
    let (suppressed, set_suppressed) = signal(false);
    let distance_ref = NodeRef::<html::Input>::new();

    // Focus the distance field whenever a map click opens the form
    Effect::new(move |_| {
        if open.get() {
            if let Some(input) = distance_ref.get() {
                let _ = input.focus();
            }
        }
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let input = WorkoutInput {
            kind: kind.get_untracked(),
            distance: distance.get_untracked(),
            duration: duration.get_untracked(),
            cadence: cadence.get_untracked(),
            elevation_gain: elevation_gain.get_untracked(),
        };
        if !on_submit.run(input) {
            return;
        }

        set_distance.set(String::new());
        set_duration.set(String::new());
        set_cadence.set(String::new());
        set_elevation_gain.set(String::new());

        // Skip the slide-out transition, then restore the layout
        set_suppressed.set(true);
        set_timeout(
            move || set_suppressed.set(false),
            Duration::from_millis(reset_delay_ms),
        );
    };

    let row_class = move |shown_for: ActivityKind| {
        if kind.get() == shown_for {
            "form__row"
        } else {
            "form__row form__row--hidden"
        }
    };

    view! {
        <form
            class=move || if open.get() { "form" } else { "form hidden" }
            style:display=move || if suppressed.get() { "none" } else { "grid" }
            on:submit=submit
        >
            <div class="form__row">
                <label class="form__label">"Type"</label>
                <select
                    class="form__input form__input--type"
                    prop:value=move || kind.get().as_str()
                    on:change=move |ev| {
                        if let Ok(k) = event_target_value(&ev).parse::<ActivityKind>() {
                            set_kind.set(k);
                        }
                    }
                >
                    <option value="running">"Running"</option>
                    <option value="cycling">"Cycling"</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">"Distance"</label>
                <input
                    class="form__input form__input--distance"
                    placeholder="km"
                    node_ref=distance_ref
                    prop:value=move || distance.get()
                    on:input=move |ev| set_distance.set(event_target_value(&ev))
                />
            </div>
            <div class="form__row">
                <label class="form__label">"Duration"</label>
                <input
                    class="form__input form__input--duration"
                    placeholder="min"
                    prop:value=move || duration.get()
                    on:input=move |ev| set_duration.set(event_target_value(&ev))
                />
            </div>
            <div class=move || row_class(ActivityKind::Running)>
                <label class="form__label">"Cadence"</label>
                <input
                    class="form__input form__input--cadence"
                    placeholder="step/min"
                    prop:value=move || cadence.get()
                    on:input=move |ev| set_cadence.set(event_target_value(&ev))
                />
            </div>
            <div class=move || row_class(ActivityKind::Cycling)>
                <label class="form__label">"Elev Gain"</label>
                <input
                    class="form__input form__input--elevation"
                    placeholder="meters"
                    prop:value=move || elevation_gain.get()
                    on:input=move |ev| set_elevation_gain.set(event_target_value(&ev))
                />
            </div>
            <button class="form__btn">"OK"</button>
        </form>
    }
}
