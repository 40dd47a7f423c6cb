use leptos::ev;
use leptos::html::Div;
use leptos::prelude::*;

use crate::session::{Link, Phase, Sender, SessionEvent};
use crate::state::AppState;

/// Chat panel: message history, follow-up controls, and input.
#[component]
pub fn ChatPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    let container = NodeRef::<Div>::new();
    // Keep the newest message in view.
    Effect::new(move |_| {
        state.session.with(|s| s.messages.len());
        if let Some(el) = container.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    view! {
        <div class="chat-panel">
            <div class="messages-container" node_ref=container>
                {move || {
                    state
                        .is_loading
                        .get()
                        .then(|| view! { <div class="chat-hint">"Loading initial chat..."</div> })
                }}
                {move || {
                    let show = state
                        .session
                        .with(|s| s.error.clone().filter(|_| s.phase != Phase::FollowUpActive));
                    show.map(|err| view! { <div class="error-banner">{err}</div> })
                }}
                <div class="message-list">
                    <For
                        each=move || state.session.with(|s| s.messages.clone())
                        key=|m| m.seq
                        let:msg
                    >
                        <MessageBubble sender=msg.sender text=msg.text.clone() />
                    </For>
                </div>
            </div>
            <ChatControls />
        </div>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(sender: Sender, text: String) -> impl IntoView {
    let css_class = match sender {
        Sender::User => "message user",
        Sender::Ai => "message ai",
    };

    view! {
        <div class=css_class>
            <span class="message-text">{text}</span>
        </div>
    }
}

/// Follow-up controls plus the input row.
#[component]
fn ChatControls() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let placeholder = move || {
        if state.is_loading.get() {
            "Loading..."
        } else {
            state.session.with(|s| match s.phase {
                Phase::FollowUpActive if s.link == Link::Open => "Ask follow-up question...",
                Phase::FollowUpActive => "Connecting...",
                _ => "Select an option above...",
            })
        }
    };

    let input_disabled = move || {
        state.is_loading.get() || state.session.with(|s| !s.can_send())
    };

    let send = move || {
        let text = input.get_untracked();
        if text.trim().is_empty() || state.session.with_untracked(|s| s.awaiting_reply) {
            return;
        }
        set_input.set(String::new());
        state.dispatch(SessionEvent::InputSubmitted { text });
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    view! {
        <div class="input-area">
            {move || {
                state
                    .session
                    .with(|s| s.show_follow_up_controls)
                    .then(|| {
                        let follow_up_disabled = move || {
                            state.is_loading.get()
                                || state.session.with(|s| !s.can_start_follow_up())
                        };
                        let proceed_disabled = move || {
                            state.is_loading.get()
                                || state.session.with(|s| s.phase == Phase::LoadFailed)
                        };
                        view! {
                            <div class="follow-up-controls">
                                <button
                                    class="btn primary full"
                                    disabled=follow_up_disabled
                                    on:click=move |_| state.dispatch(SessionEvent::StartFollowUp)
                                >
                                    "Ask Follow-up Questions"
                                </button>
                                <button
                                    class="btn success full"
                                    disabled=proceed_disabled
                                    on:click=move |_| state.dispatch(SessionEvent::ProceedRequested)
                                >
                                    "Directly Proceed to Interview"
                                </button>
                            </div>
                        }
                    })
            }}

            <div class="input-row">
                <input
                    type="text"
                    prop:value=input
                    placeholder=placeholder
                    disabled=input_disabled
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                />
                <button
                    class="btn send-btn"
                    disabled=move || {
                        state.session.with(|s| !s.can_send())
                            || input.get().trim().is_empty()
                    }
                    on:click=move |_| send()
                >
                    {move || {
                        if state.session.with(|s| s.awaiting_reply) { "..." } else { "Send" }
                    }}
                </button>
            </div>

            {move || {
                state
                    .session
                    .with(|s| s.follow_up_timer.is_active())
                    .then(|| {
                        view! {
                            <div class="proceed-row">
                                <button
                                    class="btn success full"
                                    on:click=move |_| {
                                        state.dispatch(SessionEvent::ProceedRequested)
                                    }
                                >
                                    "Proceed to Interview"
                                </button>
                            </div>
                        }
                    })
            }}
        </div>
    }
}
