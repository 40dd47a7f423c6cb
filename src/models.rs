use serde::{Deserialize, Serialize};

/// Matches the backend `CaseInterview` model.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Case {
    pub id: String,
    pub name: String,
    pub company: String,
    pub source: String,
    pub url: String,
    pub description: Description,
}

/// The full set of fields returned in a case description.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Description {
    pub client_name: String,
    pub client_goal: String,
    pub client_description: String,
    pub situation_description: String,
    #[serde(default)]
    pub company_study: Option<String>,
    #[serde(default)]
    pub global_hints: Vec<String>,
    pub questions: Vec<Question>,
}

/// One interview question of a case.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Question {
    pub text: String,
}

/// Request body for `/chat/initiate_chat`.
#[derive(Clone, Debug, Serialize)]
pub struct InitiateChatRequest {
    pub case_id: String,
}

/// One AI reply: the payload of `/chat/initiate_chat` and of each
/// normal frame on the follow-up socket.
///
/// `response_id` is optional per backend; callers must disable
/// follow-up initiation when it is absent.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AiTurn {
    pub ai_message: String,
    #[serde(default)]
    pub response_id: Option<String>,
}

/// Inbound frame on the follow-up socket: an error report or an AI turn.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FollowUpFrame {
    Error { error: String },
    Turn(AiTurn),
}
