use crate::models::{AiTurn, FollowUpFrame};
use crate::timer::Countdown;

/// Follow-up question window, in seconds.
pub const FOLLOW_UP_SECS: u32 = 300;
/// Interview note-taking window, in seconds.
pub const INTERVIEW_SECS: u32 = 300;

/// Which part of the session the page is in. Exactly one holds at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Case and greeting are still loading.
    Greeting,
    /// Loading failed; the page renders degraded with no chat.
    LoadFailed,
    /// Greeting shown, follow-up not running.
    IdleChat,
    /// The follow-up socket is connecting or open.
    FollowUpActive,
    /// The follow-up session closed normally; no restart offered.
    FollowUpEnded,
    /// Notes editor shown, interview countdown running.
    Interview,
}

/// The socket as the reducer sees it. The actual handle lives outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
    Closed,
    Connecting,
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

/// One chat bubble. Append-only; the only removal is rolling back the
/// most recent optimistic user append.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    /// Monotonic render key.
    pub seq: u64,
    pub sender: Sender,
    pub text: String,
    pub response_id: Option<String>,
}

/// Everything that can happen to a session, as a single tagged stream.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    CaseLoaded { question_count: usize },
    GreetingLoaded { turn: AiTurn },
    LoadFailed { reason: String },
    StartFollowUp,
    SocketOpened,
    SocketMessage { raw: String },
    SocketError,
    SocketClosed { code: u16 },
    InputSubmitted { text: String },
    ProceedRequested,
    ProceedConfirmed,
    ProceedDismissed,
    Tick,
    QuestionSelected(usize),
    NextQuestion,
    PrevQuestion,
}

/// Side effects the reducer asks the runtime to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Open the follow-up socket keyed by (case id, last response id).
    Connect,
    /// Send raw user text over the open socket.
    Transmit(String),
    /// Close the socket with a normal-closure code, without surfacing
    /// a close event back into the session.
    Disconnect,
}

/// Session state: a plain value mutated only through [`SessionState::apply`].
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub link: Link,
    pub messages: Vec<ChatMessage>,
    pub last_response_id: Option<String>,
    pub error: Option<String>,
    /// True while outbound input is held back: between starting the
    /// socket and it reporting open, and between a send and its reply.
    pub awaiting_reply: bool,
    pub show_follow_up_controls: bool,
    pub show_proceed_dialog: bool,
    pub follow_up_timer: Countdown,
    pub interview_timer: Countdown,
    pub question_index: usize,
    question_count: usize,
    next_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Greeting,
            link: Link::Closed,
            messages: Vec::new(),
            last_response_id: None,
            error: None,
            awaiting_reply: false,
            show_follow_up_controls: true,
            show_proceed_dialog: false,
            follow_up_timer: Countdown::new(FOLLOW_UP_SECS),
            interview_timer: Countdown::new(INTERVIEW_SECS),
            question_index: 0,
            question_count: 0,
            next_seq: 0,
        }
    }

    /// Whether the user may type and send right now.
    pub fn can_send(&self) -> bool {
        self.phase == Phase::FollowUpActive && self.link == Link::Open && !self.awaiting_reply
    }

    /// Whether the "ask follow-up questions" control may be pressed.
    /// A lingering transport-error banner must not block a retry; only a
    /// load failure (its own phase) disables the control.
    pub fn can_start_follow_up(&self) -> bool {
        self.phase == Phase::IdleChat && self.last_response_id.is_some()
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// The single reducer: consumes one event, updates state, and returns
    /// the side effects the runtime must perform, in order.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::CaseLoaded { question_count } => {
                self.question_count = question_count;
                vec![]
            }
            SessionEvent::GreetingLoaded { turn } => {
                self.last_response_id = turn.response_id.clone();
                self.push_ai_turn(turn);
                self.phase = Phase::IdleChat;
                vec![]
            }
            SessionEvent::LoadFailed { reason } => {
                self.error = Some(reason);
                self.phase = Phase::LoadFailed;
                vec![]
            }
            SessionEvent::StartFollowUp => self.start_follow_up(),
            SessionEvent::SocketOpened => {
                if self.phase == Phase::FollowUpActive {
                    self.link = Link::Open;
                    self.awaiting_reply = false;
                    self.push_ai("You can now ask follow-up questions.");
                }
                vec![]
            }
            SessionEvent::SocketMessage { raw } => {
                self.on_socket_message(&raw);
                vec![]
            }
            SessionEvent::SocketError => {
                self.error = Some("Connection error — please restart follow-up.".to_string());
                self.awaiting_reply = false;
                self.link = Link::Closed;
                if self.phase == Phase::FollowUpActive {
                    self.phase = Phase::IdleChat;
                    self.show_follow_up_controls = true;
                    self.follow_up_timer.stop();
                }
                vec![Effect::Disconnect]
            }
            SessionEvent::SocketClosed { code } => {
                self.on_socket_closed(code);
                vec![]
            }
            SessionEvent::InputSubmitted { text } => self.submit_input(text),
            SessionEvent::ProceedRequested => {
                self.follow_up_timer.stop();
                self.show_proceed_dialog = true;
                vec![]
            }
            SessionEvent::ProceedConfirmed => {
                self.show_proceed_dialog = false;
                self.enter_interview()
            }
            SessionEvent::ProceedDismissed => {
                self.show_proceed_dialog = false;
                vec![]
            }
            SessionEvent::Tick => {
                if self.follow_up_timer.tick() {
                    self.push_ai("Time is up.");
                    self.show_proceed_dialog = true;
                }
                if self.interview_timer.tick() {
                    self.push_ai("Interview time is up.");
                }
                vec![]
            }
            SessionEvent::QuestionSelected(i) => {
                self.question_index = clamp_index(i, self.question_count);
                vec![]
            }
            SessionEvent::NextQuestion => {
                self.question_index = clamp_index(self.question_index + 1, self.question_count);
                vec![]
            }
            SessionEvent::PrevQuestion => {
                self.question_index = self.question_index.saturating_sub(1);
                vec![]
            }
        }
    }

    fn start_follow_up(&mut self) -> Vec<Effect> {
        // Idempotent: a second start while a link exists is a no-op.
        if self.link != Link::Closed {
            return vec![];
        }
        if self.phase != Phase::IdleChat {
            return vec![];
        }
        if self.last_response_id.is_none() {
            self.error = Some("Missing context for follow-up.".to_string());
            return vec![];
        }
        self.link = Link::Connecting;
        self.phase = Phase::FollowUpActive;
        self.show_follow_up_controls = false;
        self.awaiting_reply = true;
        self.error = None;
        self.follow_up_timer.restart(FOLLOW_UP_SECS);
        vec![Effect::Connect]
    }

    fn on_socket_message(&mut self, raw: &str) {
        self.awaiting_reply = false;
        match serde_json::from_str::<FollowUpFrame>(raw) {
            Ok(FollowUpFrame::Turn(turn)) => {
                self.last_response_id = turn.response_id.clone();
                self.push_ai_turn(turn);
            }
            Ok(FollowUpFrame::Error { error }) => {
                self.push_ai(&format!("Error: {error}"));
                self.error = Some(error);
            }
            Err(_) => {
                self.push_ai("Received an unreadable message.");
            }
        }
    }

    fn on_socket_closed(&mut self, code: u16) {
        let was_active = self.phase == Phase::FollowUpActive;
        self.link = Link::Closed;
        self.awaiting_reply = false;
        if !was_active {
            return;
        }
        // 1000 (normal) and 1005 (no status) are expected closures; any
        // other code re-offers the start control so the user can retry.
        match code {
            1000 => {
                self.push_ai("Follow-up session ended.");
                self.phase = Phase::FollowUpEnded;
                self.follow_up_timer.stop();
            }
            1005 => {
                self.phase = Phase::FollowUpEnded;
                self.follow_up_timer.stop();
            }
            _ => {
                self.phase = Phase::IdleChat;
                self.show_follow_up_controls = true;
                self.follow_up_timer.stop();
            }
        }
    }

    fn submit_input(&mut self, text: String) -> Vec<Effect> {
        let text = text.trim().to_string();
        if text.is_empty() || self.awaiting_reply {
            return vec![];
        }
        // Optimistic append; rolled back below if the send is illegal.
        self.push(Sender::User, &text, None);
        if self.phase == Phase::FollowUpActive && self.link == Link::Open {
            self.awaiting_reply = true;
            vec![Effect::Transmit(text)]
        } else {
            self.messages.pop();
            self.error = Some("Start follow-up first.".to_string());
            vec![]
        }
    }

    fn enter_interview(&mut self) -> Vec<Effect> {
        self.show_follow_up_controls = false;
        self.follow_up_timer.stop();
        self.phase = Phase::Interview;
        self.interview_timer.restart(INTERVIEW_SECS);
        // The socket exists only while follow-up is active; close it
        // quietly rather than letting a close event append chat entries.
        if self.link != Link::Closed {
            self.link = Link::Closed;
            self.awaiting_reply = false;
            vec![Effect::Disconnect]
        } else {
            vec![]
        }
    }

    fn push(&mut self, sender: Sender, text: &str, response_id: Option<String>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.messages.push(ChatMessage {
            seq,
            sender,
            text: text.to_string(),
            response_id,
        });
    }

    fn push_ai(&mut self, text: &str) {
        self.push(Sender::Ai, text, None);
    }

    fn push_ai_turn(&mut self, turn: AiTurn) {
        self.push(Sender::Ai, &turn.ai_message, turn.response_id);
    }
}

fn clamp_index(i: usize, count: usize) -> usize {
    if count == 0 { 0 } else { i.min(count - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn greeted() -> SessionState {
        let mut s = SessionState::new();
        s.apply(SessionEvent::CaseLoaded { question_count: 3 });
        s.apply(SessionEvent::GreetingLoaded {
            turn: AiTurn {
                ai_message: "Welcome to the case.".to_string(),
                response_id: Some("r0".to_string()),
            },
        });
        s
    }

    fn in_follow_up() -> SessionState {
        let mut s = greeted();
        assert_eq!(s.apply(SessionEvent::StartFollowUp), vec![Effect::Connect]);
        s.apply(SessionEvent::SocketOpened);
        s
    }

    fn texts(s: &SessionState) -> Vec<&str> {
        s.messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn greeting_becomes_first_ai_message() {
        let s = greeted();
        assert_eq!(s.phase, Phase::IdleChat);
        assert_eq!(texts(&s), vec!["Welcome to the case."]);
        assert_eq!(s.messages[0].sender, Sender::Ai);
        assert_eq!(s.last_response_id.as_deref(), Some("r0"));
        assert!(s.can_start_follow_up());
    }

    #[test]
    fn load_failure_degrades_without_chat() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::LoadFailed {
            reason: "Failed to fetch case c1".to_string(),
        });
        assert_eq!(s.phase, Phase::LoadFailed);
        assert_eq!(s.error.as_deref(), Some("Failed to fetch case c1"));
        assert!(s.messages.is_empty());
        assert!(!s.can_start_follow_up());
    }

    #[test]
    fn greeting_without_response_id_disables_follow_up() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::GreetingLoaded {
            turn: AiTurn {
                ai_message: "Hi.".to_string(),
                response_id: None,
            },
        });
        assert!(!s.can_start_follow_up());
        assert_eq!(s.apply(SessionEvent::StartFollowUp), vec![]);
        assert_eq!(s.error.as_deref(), Some("Missing context for follow-up."));
        assert_eq!(s.phase, Phase::IdleChat);
    }

    #[test]
    fn start_follow_up_arms_timer_and_hides_controls() {
        let mut s = greeted();
        let effects = s.apply(SessionEvent::StartFollowUp);
        assert_eq!(effects, vec![Effect::Connect]);
        assert_eq!(s.phase, Phase::FollowUpActive);
        assert_eq!(s.link, Link::Connecting);
        assert!(!s.show_follow_up_controls);
        assert!(s.awaiting_reply);
        assert!(s.follow_up_timer.is_active());
        assert_eq!(s.follow_up_timer.remaining(), FOLLOW_UP_SECS);
    }

    #[test]
    fn start_follow_up_is_idempotent_while_link_exists() {
        let mut s = greeted();
        assert_eq!(s.apply(SessionEvent::StartFollowUp), vec![Effect::Connect]);
        assert_eq!(s.apply(SessionEvent::StartFollowUp), vec![]);
        s.apply(SessionEvent::SocketOpened);
        assert_eq!(s.apply(SessionEvent::StartFollowUp), vec![]);
    }

    #[test]
    fn socket_open_announces_and_reenables_input() {
        let s = in_follow_up();
        assert_eq!(s.link, Link::Open);
        assert!(!s.awaiting_reply);
        assert_eq!(
            texts(&s),
            vec!["Welcome to the case.", "You can now ask follow-up questions."]
        );
        assert!(s.can_send());
    }

    #[test]
    fn inbound_messages_display_in_arrival_order() {
        let mut s = in_follow_up();
        for (msg, id) in [("one", "r1"), ("two", "r2"), ("three", "r3")] {
            s.apply(SessionEvent::SocketMessage {
                raw: format!(r#"{{"ai_message":"{msg}","response_id":"{id}"}}"#),
            });
        }
        assert_eq!(
            texts(&s),
            vec![
                "Welcome to the case.",
                "You can now ask follow-up questions.",
                "one",
                "two",
                "three"
            ]
        );
        assert_eq!(s.last_response_id.as_deref(), Some("r3"));
    }

    #[test]
    fn error_frame_sets_banner_and_appends_entry() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::SocketMessage {
            raw: r#"{"error":"model overloaded"}"#.to_string(),
        });
        assert_eq!(s.error.as_deref(), Some("model overloaded"));
        assert_eq!(s.messages.last().unwrap().text, "Error: model overloaded");
        assert_eq!(s.phase, Phase::FollowUpActive);
    }

    #[test]
    fn unreadable_frame_keeps_session_alive() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::SocketMessage {
            raw: "}{not json".to_string(),
        });
        assert_eq!(s.messages.last().unwrap().text, "Received an unreadable message.");
        assert_eq!(s.phase, Phase::FollowUpActive);
        assert!(s.can_send());
    }

    #[test]
    fn send_appends_then_transmits_verbatim() {
        let mut s = in_follow_up();
        let effects = s.apply(SessionEvent::InputSubmitted {
            text: "  what is the margin?  ".to_string(),
        });
        assert_eq!(effects, vec![Effect::Transmit("what is the margin?".to_string())]);
        let last = s.messages.last().unwrap();
        assert_eq!(last.sender, Sender::User);
        assert_eq!(last.text, "what is the margin?");
        assert!(s.awaiting_reply);
    }

    #[test]
    fn send_without_open_link_rolls_back() {
        let mut s = greeted();
        let before = s.messages.clone();
        let effects = s.apply(SessionEvent::InputSubmitted {
            text: "hello?".to_string(),
        });
        assert_eq!(effects, vec![]);
        assert_eq!(s.messages, before);
        assert_eq!(s.error.as_deref(), Some("Start follow-up first."));
    }

    #[test]
    fn send_while_reply_pending_is_ignored() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::InputSubmitted {
            text: "first".to_string(),
        });
        let before = s.messages.clone();
        let effects = s.apply(SessionEvent::InputSubmitted {
            text: "second".to_string(),
        });
        assert_eq!(effects, vec![]);
        assert_eq!(s.messages, before);
    }

    #[test]
    fn normal_close_appends_one_ended_message_and_keeps_controls_hidden() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::SocketClosed { code: 1000 });
        assert_eq!(s.phase, Phase::FollowUpEnded);
        assert_eq!(s.link, Link::Closed);
        assert!(!s.show_follow_up_controls);
        let ended: Vec<_> = s
            .messages
            .iter()
            .filter(|m| m.text == "Follow-up session ended.")
            .collect();
        assert_eq!(ended.len(), 1);
    }

    #[test]
    fn no_status_close_is_quiet() {
        let mut s = in_follow_up();
        let before = s.messages.clone();
        s.apply(SessionEvent::SocketClosed { code: 1005 });
        assert_eq!(s.messages, before);
        assert_eq!(s.phase, Phase::FollowUpEnded);
        assert!(!s.show_follow_up_controls);
    }

    #[test]
    fn abnormal_close_reoffers_follow_up() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::SocketClosed { code: 1006 });
        assert_eq!(s.phase, Phase::IdleChat);
        assert!(s.show_follow_up_controls);
        assert!(s.can_start_follow_up());
        assert!(!texts(&s).contains(&"Follow-up session ended."));
    }

    #[test]
    fn transport_error_tears_down_and_reoffers() {
        let mut s = in_follow_up();
        let effects = s.apply(SessionEvent::SocketError);
        assert_eq!(effects, vec![Effect::Disconnect]);
        assert_eq!(s.phase, Phase::IdleChat);
        assert_eq!(s.link, Link::Closed);
        assert!(s.show_follow_up_controls);
        assert_eq!(
            s.error.as_deref(),
            Some("Connection error — please restart follow-up.")
        );
        // The banner must not block the retry path.
        assert!(s.can_start_follow_up());
    }

    #[test]
    fn close_after_interview_entry_stays_quiet() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::ProceedRequested);
        let effects = s.apply(SessionEvent::ProceedConfirmed);
        assert_eq!(effects, vec![Effect::Disconnect]);
        let before = s.messages.clone();
        s.apply(SessionEvent::SocketClosed { code: 1006 });
        assert_eq!(s.messages, before);
        assert_eq!(s.phase, Phase::Interview);
        assert!(!s.show_follow_up_controls);
    }

    #[test]
    fn follow_up_timer_zero_fires_once() {
        let mut s = in_follow_up();
        s.follow_up_timer.restart(2);
        s.apply(SessionEvent::Tick);
        assert!(!s.show_proceed_dialog);
        s.apply(SessionEvent::Tick);
        assert!(s.show_proceed_dialog);
        assert_eq!(s.messages.last().unwrap().text, "Time is up.");
        let count = texts(&s).iter().filter(|t| **t == "Time is up.").count();

        s.show_proceed_dialog = false;
        s.apply(SessionEvent::Tick);
        assert!(!s.show_proceed_dialog);
        assert_eq!(
            texts(&s).iter().filter(|t| **t == "Time is up.").count(),
            count
        );
    }

    #[test]
    fn proceed_dialog_dismissal_keeps_session() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::ProceedRequested);
        assert!(s.show_proceed_dialog);
        assert!(!s.follow_up_timer.is_active());
        s.apply(SessionEvent::ProceedDismissed);
        assert!(!s.show_proceed_dialog);
        assert_eq!(s.phase, Phase::FollowUpActive);
    }

    #[test]
    fn confirming_proceed_enters_interview() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::ProceedRequested);
        s.apply(SessionEvent::ProceedConfirmed);
        assert_eq!(s.phase, Phase::Interview);
        assert!(!s.follow_up_timer.is_active());
        assert!(s.interview_timer.is_active());
        assert_eq!(s.interview_timer.remaining(), INTERVIEW_SECS);
        assert!(!s.show_follow_up_controls);
        assert_eq!(s.link, Link::Closed);
    }

    #[test]
    fn direct_proceed_from_idle_needs_no_disconnect() {
        let mut s = greeted();
        s.apply(SessionEvent::ProceedRequested);
        let effects = s.apply(SessionEvent::ProceedConfirmed);
        assert_eq!(effects, vec![]);
        assert_eq!(s.phase, Phase::Interview);
    }

    #[test]
    fn interview_timer_zero_announces_once() {
        let mut s = greeted();
        s.apply(SessionEvent::ProceedRequested);
        s.apply(SessionEvent::ProceedConfirmed);
        s.interview_timer.restart(1);
        s.apply(SessionEvent::Tick);
        assert_eq!(s.messages.last().unwrap().text, "Interview time is up.");
        s.apply(SessionEvent::Tick);
        assert_eq!(
            texts(&s)
                .iter()
                .filter(|t| **t == "Interview time is up.")
                .count(),
            1
        );
    }

    #[test]
    fn question_index_is_clamped() {
        let mut s = greeted();
        s.apply(SessionEvent::QuestionSelected(7));
        assert_eq!(s.question_index, 2);
        s.apply(SessionEvent::NextQuestion);
        assert_eq!(s.question_index, 2);
        s.apply(SessionEvent::PrevQuestion);
        assert_eq!(s.question_index, 1);
        s.apply(SessionEvent::QuestionSelected(0));
        s.apply(SessionEvent::PrevQuestion);
        assert_eq!(s.question_index, 0);
    }

    #[test]
    fn question_navigation_with_no_questions() {
        let mut s = SessionState::new();
        s.apply(SessionEvent::CaseLoaded { question_count: 0 });
        s.apply(SessionEvent::NextQuestion);
        s.apply(SessionEvent::QuestionSelected(4));
        assert_eq!(s.question_index, 0);
    }

    #[test]
    fn render_keys_stay_monotonic_across_rollback() {
        let mut s = in_follow_up();
        s.apply(SessionEvent::InputSubmitted {
            text: "kept".to_string(),
        });
        let last_seq = s.messages.last().unwrap().seq;
        // Force an illegal send: close the link first.
        s.apply(SessionEvent::SocketClosed { code: 1006 });
        s.apply(SessionEvent::InputSubmitted {
            text: "rolled back".to_string(),
        });
        s.apply(SessionEvent::StartFollowUp);
        s.apply(SessionEvent::SocketOpened);
        s.apply(SessionEvent::InputSubmitted {
            text: "after".to_string(),
        });
        let seqs: Vec<u64> = s.messages.iter().map(|m| m.seq).collect();
        let mut sorted = seqs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(seqs, sorted);
        assert!(s.messages.last().unwrap().seq > last_seq);
    }
}
