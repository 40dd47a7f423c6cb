use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::Case;
use crate::session::{Effect, SessionEvent, SessionState};
use crate::ws::{self, SocketEvent, SocketHandle};

/// Which page is showing. The selected case identifier travels here
/// explicitly instead of through any durable cross-page storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Browser,
    Interview { case_id: String },
}

/// Shared application state, provided via Leptos context.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub route: ReadSignal<Route>,
    pub cases: ReadSignal<Vec<Case>>,
    pub cases_error: ReadSignal<Option<String>>,
    pub current_case: ReadSignal<Option<Case>>,
    pub is_loading: ReadSignal<bool>,
    pub session: ReadSignal<SessionState>,

    // --- Write signals (for mutating state) ---
    pub set_route: WriteSignal<Route>,
    pub set_cases: WriteSignal<Vec<Case>>,
    pub set_cases_error: WriteSignal<Option<String>>,
    pub set_current_case: WriteSignal<Option<Case>>,
    pub set_is_loading: WriteSignal<bool>,
    set_session: WriteSignal<SessionState>,

    // --- Owned page resources, outside the reactive graph ---
    socket: StoredValue<Option<SocketHandle>, LocalStorage>,
    ticker: StoredValue<Option<Interval>, LocalStorage>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (route, set_route) = signal(Route::Browser);
        let (cases, set_cases) = signal(Vec::<Case>::new());
        let (cases_error, set_cases_error) = signal(None::<String>);
        let (current_case, set_current_case) = signal(None::<Case>);
        let (is_loading, set_is_loading) = signal(true);
        let (session, set_session) = signal(SessionState::new());

        let state = Self {
            route,
            cases,
            cases_error,
            current_case,
            is_loading,
            session,
            set_route,
            set_cases,
            set_cases_error,
            set_current_case,
            set_is_loading,
            set_session,
            socket: StoredValue::new_local(None),
            ticker: StoredValue::new_local(None),
        };

        provide_context(state);
        state
    }

    /// Load the case list from the backend.
    pub fn load_cases(&self) {
        let state = *self;
        spawn_local(async move {
            match api::fetch_cases().await {
                Ok(cases) => state.set_cases.set(cases),
                Err(e) => {
                    log::error!("Failed to fetch cases: {e}");
                    state.set_cases_error.set(Some(e));
                }
            }
        });
    }

    /// Navigate to the session page for one case, with fresh session state.
    pub fn open_interview(&self, case_id: String) {
        self.set_session.set(SessionState::new());
        self.set_current_case.set(None);
        self.set_route.set(Route::Interview { case_id });
    }

    pub fn back_to_browser(&self) {
        self.set_route.set(Route::Browser);
    }

    /// Fetch the case, then the opening interviewer message. Runs once
    /// on session page mount.
    pub fn start_session(&self, case_id: String) {
        let state = *self;
        if case_id.is_empty() {
            self.dispatch(SessionEvent::LoadFailed {
                reason: "No case selected. Please go back and select a case.".to_string(),
            });
            self.set_is_loading.set(false);
            return;
        }
        self.set_is_loading.set(true);
        spawn_local(async move {
            match api::fetch_case(&case_id).await {
                Ok(case) => {
                    state.dispatch(SessionEvent::CaseLoaded {
                        question_count: case.description.questions.len(),
                    });
                    state.set_current_case.set(Some(case));
                    match api::initiate_chat(&case_id).await {
                        Ok(turn) => state.dispatch(SessionEvent::GreetingLoaded { turn }),
                        Err(e) => {
                            log::error!("Failed to initiate chat: {e}");
                            state.dispatch(SessionEvent::LoadFailed { reason: e });
                        }
                    }
                }
                Err(e) => {
                    log::error!("Failed to fetch case: {e}");
                    state.dispatch(SessionEvent::LoadFailed { reason: e });
                }
            }
            state.set_is_loading.set(false);
        });
    }

    /// Start delivering one tick per second to the session.
    pub fn start_ticker(&self) {
        let state = *self;
        let interval = Interval::new(1_000, move || state.dispatch(SessionEvent::Tick));
        self.ticker.set_value(Some(interval));
    }

    /// Release the page's owned resources: the ticker and, if still
    /// open, the socket (closed with a normal-closure code first).
    pub fn teardown(&self) {
        self.ticker.update_value(|slot| {
            slot.take();
        });
        self.socket.update_value(|slot| {
            if let Some(socket) = slot.take() {
                socket.close_quiet();
            }
        });
    }

    /// Feed one event through the session reducer and run the effects
    /// it requests.
    pub fn dispatch(&self, event: SessionEvent) {
        let effects = self
            .set_session
            .try_update(|s| s.apply(event))
            .unwrap_or_default();
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Connect => self.connect(),
            Effect::Transmit(text) => {
                self.socket.with_value(|slot| {
                    if let Some(socket) = slot {
                        socket.send(&text);
                    }
                });
            }
            Effect::Disconnect => {
                self.socket.update_value(|slot| {
                    if let Some(socket) = slot.take() {
                        socket.close_quiet();
                    }
                });
            }
        }
    }

    fn connect(&self) {
        let case_id = self.current_case.get_untracked().map(|c| c.id);
        let response_id = self.session.with_untracked(|s| s.last_response_id.clone());
        let (Some(case_id), Some(response_id)) = (case_id, response_id) else {
            log::error!("Cannot open follow-up socket without case and response ids");
            return;
        };

        let url = api::ws_chat_url(&case_id, &response_id);
        let state = *self;
        match ws::connect(&url, move |ev| state.on_socket_event(ev)) {
            Ok(handle) => self.socket.set_value(Some(handle)),
            Err(e) => {
                log::error!("{e}");
                self.dispatch(SessionEvent::SocketError);
            }
        }
    }

    fn on_socket_event(&self, ev: SocketEvent) {
        let event = match ev {
            SocketEvent::Opened => SessionEvent::SocketOpened,
            SocketEvent::Message(raw) => SessionEvent::SocketMessage { raw },
            SocketEvent::Error => SessionEvent::SocketError,
            SocketEvent::Closed { code } => {
                // Every closure discards the handle.
                self.socket.update_value(|slot| {
                    slot.take();
                });
                SessionEvent::SocketClosed { code }
            }
        };
        self.dispatch(event);
    }
}
