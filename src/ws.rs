use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

/// Browser socket callbacks, flattened into one tagged stream so the
/// session reducer can consume them without touching web-sys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketEvent {
    Opened,
    Message(String),
    Error,
    Closed { code: u16 },
}

/// One live follow-up connection. At most one exists per session page;
/// the owner must call [`SocketHandle::close_quiet`] before dropping it
/// on navigation so no orphaned connection outlives the page.
pub struct SocketHandle {
    inner: WebSocket,
}

/// Opens a WebSocket and forwards every browser callback as a
/// [`SocketEvent`] to `on_event`.
pub fn connect(
    url: &str,
    on_event: impl Fn(SocketEvent) + Clone + 'static,
) -> Result<SocketHandle, String> {
    let ws = WebSocket::new(url).map_err(|e| format!("Failed to connect: {e:?}"))?;
    ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

    let emit = on_event.clone();
    let onopen = Closure::<dyn Fn()>::new(move || {
        emit(SocketEvent::Opened);
    });
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let emit = on_event.clone();
    let onmessage = Closure::<dyn Fn(MessageEvent)>::new(move |ev: MessageEvent| {
        if let Some(text) = ev.data().as_string() {
            emit(SocketEvent::Message(text));
        }
    });
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let emit = on_event.clone();
    let onerror = Closure::<dyn Fn()>::new(move || {
        log::error!("WebSocket connection error");
        emit(SocketEvent::Error);
    });
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    let onclose = Closure::<dyn Fn(CloseEvent)>::new(move |ev: CloseEvent| {
        on_event(SocketEvent::Closed { code: ev.code() });
    });
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(SocketHandle { inner: ws })
}

impl SocketHandle {
    pub fn is_open(&self) -> bool {
        self.inner.ready_state() == WebSocket::OPEN
    }

    /// Send raw user text, no envelope.
    pub fn send(&self, text: &str) {
        if let Err(e) = self.inner.send_with_str(text) {
            log::warn!("WebSocket send failed: {e:?}");
        }
    }

    /// Detach all callbacks, then close with a normal-closure code.
    /// Used both for deliberate shutdown and page teardown; no further
    /// events reach the session afterwards.
    pub fn close_quiet(&self) {
        self.inner.set_onopen(None);
        self.inner.set_onmessage(None);
        self.inner.set_onerror(None);
        self.inner.set_onclose(None);
        let _ = self.inner.close_with_code_and_reason(1000, "cleanup");
    }
}
