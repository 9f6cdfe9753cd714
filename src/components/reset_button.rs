use leptos::prelude::*;

/// Clears every saved workout after the user confirms.
#[component]
pub fn ResetButton(on_reset: Callback<()>) -> impl IntoView {
    let confirm_and_reset = move |_| {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Delete all saved workouts?").ok())
            .unwrap_or(false);
        if confirmed {
            on_reset.run(());
        }
    };

    view! {
        <button class="btn btn-reset" on:click=confirm_and_reset>
            "Reset workouts"
        </button>
    }
}
