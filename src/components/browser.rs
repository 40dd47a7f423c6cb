use leptos::prelude::*;

use crate::models::Case;
use crate::state::AppState;

/// Case browser: gallery of case cards, a search dialog, and a
/// confirmation dialog that hands the chosen case to the session page.
#[component]
pub fn BrowserPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (detail, set_detail) = signal(None::<Case>);
    let (search_open, set_search_open) = signal(false);

    view! {
        <div class="browser-page">
            <header class="app-bar">
                <h1>"Case Interview Dojo"</h1>
                <button class="btn ghost" on:click=move |_| set_search_open.set(true)>
                    "Search"
                </button>
            </header>

            <main class="gallery-wrap">
                {move || {
                    state
                        .cases_error
                        .get()
                        .map(|err| view! { <div class="error-banner">{err}</div> })
                }}
                {move || {
                    let cases = state.cases.get();
                    if cases.is_empty() && state.cases_error.get().is_none() {
                        view! { <div class="empty-state">"No cases available."</div> }
                            .into_any()
                    } else {
                        view! {
                            <div class="case-gallery">
                                <For
                                    each=move || state.cases.get()
                                    key=|c| c.id.clone()
                                    let:case_item
                                >
                                    {
                                        let open = case_item.clone();
                                        view! {
                                            <div
                                                class="case-card"
                                                on:click=move |_| set_detail.set(Some(open.clone()))
                                            >
                                                <h3>{case_item.company.clone()}</h3>
                                                <p>{case_item.description.client_description.clone()}</p>
                                            </div>
                                        }
                                    }
                                </For>
                            </div>
                        }
                            .into_any()
                    }
                }}
            </main>

            {move || {
                search_open
                    .get()
                    .then(|| view! { <SearchDialog set_detail=set_detail set_open=set_search_open /> })
            }}

            {move || {
                detail
                    .get()
                    .map(|case| view! { <CaseDetailDialog case=case set_detail=set_detail /> })
            }}
        </div>
    }
}

/// Lists every case by company; choosing one opens its detail dialog.
#[component]
fn SearchDialog(
    set_detail: WriteSignal<Option<Case>>,
    set_open: WriteSignal<bool>,
) -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="dialog-overlay">
            <div class="dialog">
                <h2>"All Cases"</h2>
                <p class="dialog-subtitle">"Select a case to view details"</p>
                <ul class="search-list">
                    <For
                        each=move || state.cases.get()
                        key=|c| c.id.clone()
                        let:case_item
                    >
                        {
                            let chosen = case_item.clone();
                            view! {
                                <li on:click=move |_| {
                                    set_detail.set(Some(chosen.clone()));
                                    set_open.set(false);
                                }>
                                    {case_item.company.clone()}
                                </li>
                            }
                        }
                    </For>
                </ul>
                <div class="dialog-actions">
                    <button class="btn outline" on:click=move |_| set_open.set(false)>
                        "Close"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// Confirmation dialog: goal and situation, Cancel or Proceed.
#[component]
fn CaseDetailDialog(case: Case, set_detail: WriteSignal<Option<Case>>) -> impl IntoView {
    let state = expect_context::<AppState>();
    let case_id = case.id.clone();

    view! {
        <div class="dialog-overlay">
            <div class="dialog">
                <h2>{case.name.clone()}</h2>
                <p class="dialog-subtitle">{case.description.client_goal.clone()}</p>
                <p>{case.description.situation_description.clone()}</p>
                <div class="dialog-actions">
                    <button class="btn outline" on:click=move |_| set_detail.set(None)>
                        "Cancel"
                    </button>
                    <button
                        class="btn primary"
                        on:click=move |_| {
                            set_detail.set(None);
                            state.open_interview(case_id.clone());
                        }
                    >
                        "Proceed"
                    </button>
                </div>
            </div>
        </div>
    }
}
