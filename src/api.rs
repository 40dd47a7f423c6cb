use gloo_net::http::Request;

use crate::models::{AiTurn, Case, InitiateChatRequest};

/// Base path of the backend API; the dev server proxies `/api/*` to the
/// backend origin (see Trunk.toml).
const API_BASE: &str = "/api";

/// Overrides the WebSocket backend host when it differs from the page
/// origin. Set at build time: `WS_BACKEND_HOST=host:port trunk build`.
const WS_BACKEND_HOST: Option<&str> = option_env!("WS_BACKEND_HOST");

/// Fetches the list of all cases from the backend.
pub async fn fetch_cases() -> Result<Vec<Case>, String> {
    let resp = Request::get(&format!("{API_BASE}/cases"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }

    resp.json::<Vec<Case>>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Fetches a single case by ID.
pub async fn fetch_case(case_id: &str) -> Result<Case, String> {
    let encoded = js_sys::encode_uri_component(case_id);
    let resp = Request::get(&format!("{API_BASE}/cases/{encoded}"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Failed to fetch case {case_id}"));
    }

    resp.json::<Case>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Kicks off a new chat session for a given case.
pub async fn initiate_chat(case_id: &str) -> Result<AiTurn, String> {
    let body = InitiateChatRequest {
        case_id: case_id.to_string(),
    };

    let resp = Request::post(&format!("{API_BASE}/chat/initiate_chat"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }

    resp.json::<AiTurn>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

/// Returns the WebSocket URL for the follow-up chat endpoint, keyed by
/// (case id, last response id). The scheme follows the page protocol;
/// the host is the configured override, else the page's own host.
pub fn ws_chat_url(case_id: &str, response_id: &str) -> String {
    let (protocol, page_host) = web_sys::window()
        .map(|w| {
            let loc = w.location();
            (
                loc.protocol().unwrap_or_default(),
                loc.host().unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    let host = WS_BACKEND_HOST
        .map(str::to_string)
        .filter(|h| !h.is_empty())
        .or(if page_host.is_empty() { None } else { Some(page_host) })
        .unwrap_or_else(|| "localhost:8000".to_string());

    let case = js_sys::encode_uri_component(case_id);
    let response = js_sys::encode_uri_component(response_id);
    format!("{scheme}://{host}/ws/chat/{case}/{response}")
}
