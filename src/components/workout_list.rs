//! The sidebar list of logged workouts.

use chrono::Local;
use leptos::prelude::*;

use crate::workout::{Activity, Workout, WorkoutId};

/// Renders `children` (the form) first, then one row per workout, newest first.
#[component]
pub fn WorkoutList(
    /// Workouts in creation order.
    #[prop(into)]
    workouts: Signal<Vec<Workout>>,
    /// Called with the id of the row the user clicked.
    on_select: Callback<WorkoutId>,
    children: Children,
) -> impl IntoView {
    view! {
        <ul class="workouts">
            {children()}
            <For
                each=move || workouts.get().into_iter().rev()
                key=|workout| workout.id().clone()
                children=move |workout| view! { <WorkoutRow workout=workout on_select=on_select /> }
            />
        </ul>
    }
}

#[component]
pub fn WorkoutRow(workout: Workout, on_select: Callback<WorkoutId>) -> impl IntoView {
    let kind = workout.kind();
    let metric = workout.metric();
    let (extra_icon, extra_value, extra_unit) = match workout.activity() {
        Activity::Running { cadence, .. } => ("\u{1F9B6}\u{1F3FC}", *cadence, "spm"),
        Activity::Cycling { elevation_gain, .. } => ("\u{26F0}", *elevation_gain, "m"),
    };
    let logged_at = workout
        .created_at()
        .with_timezone(&Local)
        .format("Logged %Y-%m-%d %H:%M")
        .to_string();
    let id = workout.id().clone();
    let data_id = id.as_str().to_string();

    view! {
        <li
            class=format!("workout workout--{}", kind.as_str())
            data-id=data_id
            title=logged_at
            on:click=move |_| on_select.run(id.clone())
        >
            <h2 class="workout__title">{workout.description().to_string()}</h2>
            <div class="workout__details">
                <span class="workout__icon">{kind.icon()}</span>
                <span class="workout__value">{workout.distance_km()}</span>
                <span class="workout__unit">"km"</span>
            </div>
            <div class="workout__details">
                <span class="workout__icon">"\u{23F1}"</span>
                <span class="workout__value">{workout.duration_min()}</span>
                <span class="workout__unit">"min"</span>
            </div>
            <div class="workout__details">
                <span class="workout__icon">"\u{26A1}\u{FE0F}"</span>
                <span class="workout__value">{format!("{:.1}", metric.value())}</span>
                <span class="workout__unit">{metric.unit()}</span>
            </div>
            <div class="workout__details">
                <span class="workout__icon">{extra_icon}</span>
                <span class="workout__value">{extra_value}</span>
                <span class="workout__unit">{extra_unit}</span>
            </div>
        </li>
    }
}
