use leptos::prelude::*;

use crate::components::chat::ChatPanel;
use crate::components::editor::NotesEditor;
use crate::session::{Phase, SessionEvent};
use crate::state::AppState;
use crate::timer::{format_clock, format_minutes_left};

/// Interview session page: case brief (or notes editor) on the left,
/// chat with the interviewer on the right.
#[component]
pub fn InterviewPage(case_id: String) -> impl IntoView {
    let state = expect_context::<AppState>();

    state.start_session(case_id);
    state.start_ticker();
    on_cleanup(move || state.teardown());

    let in_interview = move || state.session.with(|s| s.phase == Phase::Interview);

    view! {
        <div class="interview-page">
            <header class="app-bar">
                <button class="btn link" on:click=move |_| state.back_to_browser()>
                    <h2>"Case Interview Chat"</h2>
                </button>
                {move || {
                    let (active, remaining, warning) = state
                        .session
                        .with(|s| {
                            (
                                s.phase != Phase::Interview && s.follow_up_timer.is_active(),
                                s.follow_up_timer.remaining(),
                                s.follow_up_timer.is_warning(),
                            )
                        });
                    active
                        .then(|| {
                            view! {
                                <div class="timer-box">
                                    <span class="timer-label">"Timer"</span>
                                    <div class=move || {
                                        if warning { "timer warning" } else { "timer" }
                                    }>{format_clock(remaining)}</div>
                                </div>
                            }
                        })
                }}
                {move || {
                    let (active, remaining, warning) = state
                        .session
                        .with(|s| {
                            (
                                s.phase == Phase::Interview && s.interview_timer.is_active(),
                                s.interview_timer.remaining(),
                                s.interview_timer.is_warning(),
                            )
                        });
                    active
                        .then(|| {
                            view! {
                                <div class="timer-box row">
                                    <span class="timer-label">"Interview Timer:"</span>
                                    <span class=move || {
                                        if warning { "timer warning" } else { "timer" }
                                    }>{format_minutes_left(remaining)}</span>
                                </div>
                            }
                        })
                }}
            </header>

            <div class="panels">
                <section class="left-panel">
                    {move || {
                        if in_interview() {
                            view! { <NotesEditor /> }.into_any()
                        } else if state.is_loading.get() {
                            view! {
                                <div class="spinner-wrap">
                                    <div class="spinner"></div>
                                </div>
                            }
                                .into_any()
                        } else {
                            view! { <CaseBrief /> }.into_any()
                        }
                    }}
                </section>

                <section class="right-panel">
                    {move || in_interview().then(|| view! { <QuestionNav /> })}
                    <ChatPanel />
                </section>
            </div>

            {move || {
                state
                    .session
                    .with(|s| s.show_proceed_dialog)
                    .then(|| view! { <ProceedDialog /> })
            }}
        </div>
    }
}

/// The case brief as collapsible sections.
#[component]
fn CaseBrief() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        {move || {
            state
                .current_case
                .get()
                .map(|case| {
                    let d = case.description;
                    view! {
                        <div class="case-brief">
                            <details open>
                                <summary>"Client Goal"</summary>
                                <p>{d.client_goal}</p>
                            </details>
                            <details>
                                <summary>"Client Description"</summary>
                                <p>{d.client_description}</p>
                            </details>
                            <details>
                                <summary>"Situation Description"</summary>
                                <p>{d.situation_description}</p>
                            </details>
                            {d.company_study
                                .map(|study| {
                                    view! {
                                        <details>
                                            <summary>"Company Study"</summary>
                                            <p>{study}</p>
                                        </details>
                                    }
                                })}
                            <details>
                                <summary>"Hints"</summary>
                                <ul class="hints-list">
                                    {d.global_hints
                                        .into_iter()
                                        .map(|hint| view! { <li>{hint}</li> })
                                        .collect_view()}
                                </ul>
                            </details>
                        </div>
                    }
                })
        }}
    }
}

/// Breadcrumb navigation over the case's questions, plus the current
/// question text. Interview mode only.
#[component]
fn QuestionNav() -> impl IntoView {
    let state = expect_context::<AppState>();

    let questions = move || {
        state
            .current_case
            .get()
            .map(|c| c.description.questions)
            .unwrap_or_default()
    };
    let index = Memo::new(move |_| state.session.with(|s| s.question_index));

    view! {
        {move || {
            let qs = questions();
            (!qs.is_empty())
                .then(|| {
                    let crumbs = (0..qs.len())
                        .map(|i| {
                            view! {
                                <button
                                    class=move || {
                                        if index.get() == i {
                                            "crumb current"
                                        } else {
                                            "crumb"
                                        }
                                    }
                                    on:click=move |_| {
                                        state.dispatch(SessionEvent::QuestionSelected(i))
                                    }
                                >
                                    {format!("Question {}", i + 1)}
                                </button>
                            }
                        })
                        .collect_view();
                    let text = move || {
                        questions()
                            .get(index.get())
                            .map(|q| q.text.clone())
                            .unwrap_or_default()
                    };
                    view! {
                        <div class="question-nav">
                            <div class="breadcrumbs">
                                <button
                                    class="crumb nav"
                                    on:click=move |_| state.dispatch(SessionEvent::PrevQuestion)
                                >
                                    "<"
                                </button>
                                {crumbs}
                                <button
                                    class="crumb nav"
                                    on:click=move |_| state.dispatch(SessionEvent::NextQuestion)
                                >
                                    ">"
                                </button>
                            </div>
                            <div class="question-text">
                                <h3>{move || format!("Question {}", index.get() + 1)}</h3>
                                <p>{text}</p>
                            </div>
                        </div>
                    }
                })
        }}
    }
}

/// Confirmation gate before swapping into the notes editor.
#[component]
fn ProceedDialog() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="dialog-overlay">
            <div class="dialog">
                <h2>"Proceed to Interview?"</h2>
                <div class="dialog-actions">
                    <button
                        class="btn success"
                        on:click=move |_| state.dispatch(SessionEvent::ProceedConfirmed)
                    >
                        "Yes"
                    </button>
                    <button
                        class="btn outline"
                        on:click=move |_| state.dispatch(SessionEvent::ProceedDismissed)
                    >
                        "No"
                    </button>
                </div>
            </div>
        </div>
    }
}
