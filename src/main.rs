mod api;
mod components;
mod models;
mod session;
mod state;
mod timer;
mod ws;

use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::browser::BrowserPage;
use components::interview::InterviewPage;
use state::{AppState, Route};

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Load the case list on mount
    state.load_cases();

    view! {
        {move || match state.route.get() {
            Route::Browser => view! { <BrowserPage /> }.into_any(),
            Route::Interview { case_id } => {
                view! { <InterviewPage case_id=case_id /> }.into_any()
            }
        }}
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
