use leptos::html::Div;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

use crate::state::AppState;

const FONT_FAMILIES: &[&str] = &["Arial", "Georgia", "Times New Roman", "Courier New", "Verdana"];
const FONT_SIZES: &[(&str, &str)] = &[("Small", "2"), ("Normal", "3"), ("Large", "5"), ("Huge", "7")];

fn html_document() -> Option<HtmlDocument> {
    web_sys::window()?
        .document()?
        .dyn_into::<HtmlDocument>()
        .ok()
}

fn exec(command: &str) {
    if let Some(doc) = html_document() {
        if let Err(e) = doc.exec_command(command) {
            log::warn!("exec_command {command} failed: {e:?}");
        }
    }
}

fn exec_with(command: &str, value: &str) {
    if let Some(doc) = html_document() {
        if let Err(e) = doc.exec_command_with_show_ui_and_value(command, false, value) {
            log::warn!("exec_command {command}={value} failed: {e:?}");
        }
    }
}

fn query_state(command: &str) -> bool {
    html_document()
        .map(|doc| doc.query_command_state(command).unwrap_or(false))
        .unwrap_or(false)
}

/// Formatting flags at the caret: bold, italic, underline, strikethrough.
type FormatFlags = (bool, bool, bool, bool);

fn caret_formats() -> FormatFlags {
    (
        query_state("bold"),
        query_state("italic"),
        query_state("underline"),
        query_state("strikeThrough"),
    )
}

/// Rich-text notes editor shown in interview mode. The editing engine is
/// the browser's; this component only maps toolbar actions to document
/// commands and keeps one note buffer per question.
#[component]
pub fn NotesEditor() -> impl IntoView {
    let state = expect_context::<AppState>();
    let editor_ref = NodeRef::<Div>::new();

    let question_count = state.session.with_untracked(|s| s.question_count());
    let buffers = StoredValue::new(vec![String::new(); question_count.max(1)]);
    let shown_index = StoredValue::new(0usize);

    let (formats, set_formats) = signal((false, false, false, false));
    let (confirm_clear, set_confirm_clear) = signal(false);

    let refresh_formats = move || set_formats.set(caret_formats());

    let save_current = move || {
        if let Some(el) = editor_ref.get_untracked() {
            let index = shown_index.get_value();
            buffers.update_value(|b| {
                if let Some(slot) = b.get_mut(index) {
                    *slot = el.inner_html();
                }
            });
        }
    };

    // Swap note buffers when question navigation moves the index.
    let index = Memo::new(move |_| state.session.with(|s| s.question_index));
    Effect::new(move |_| {
        let index = index.get();
        let Some(el) = editor_ref.get() else {
            return;
        };
        if shown_index.get_value() != index {
            save_current();
            shown_index.set_value(index);
        }
        let html = buffers.with_value(|b| b.get(index).cloned().unwrap_or_default());
        el.set_inner_html(&html);
    });

    let on_input = move |_| {
        save_current();
        refresh_formats();
    };

    let toggle = move |command: &'static str| {
        move |_: leptos::ev::MouseEvent| {
            exec(command);
            save_current();
            refresh_formats();
        }
    };

    let clear_all = move |_| {
        if let Some(el) = editor_ref.get_untracked() {
            el.set_inner_html("");
        }
        save_current();
        set_confirm_clear.set(false);
        refresh_formats();
    };

    view! {
        <div class="notes-editor">
            <div class="editor-toolbar">
                <button
                    class=move || if formats.get().0 { "tool active" } else { "tool" }
                    title="Bold"
                    on:click=toggle("bold")
                >
                    "B"
                </button>
                <button
                    class=move || if formats.get().1 { "tool active" } else { "tool" }
                    title="Italic"
                    on:click=toggle("italic")
                >
                    "I"
                </button>
                <button
                    class=move || if formats.get().2 { "tool active" } else { "tool" }
                    title="Underline"
                    on:click=toggle("underline")
                >
                    "U"
                </button>
                <button
                    class=move || if formats.get().3 { "tool active" } else { "tool" }
                    title="Strikethrough"
                    on:click=toggle("strikeThrough")
                >
                    "S"
                </button>
                <button class="tool" title="Horizontal rule" on:click=toggle("insertHorizontalRule")>
                    "HR"
                </button>

                <select
                    class="tool-select"
                    title="Font family"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        if value.is_empty() {
                            exec_with("fontName", "inherit");
                        } else {
                            exec_with("fontName", &value);
                        }
                        save_current();
                    }
                >
                    <option value="">"Font"</option>
                    {FONT_FAMILIES
                        .iter()
                        .map(|family| view! { <option value=*family>{*family}</option> })
                        .collect_view()}
                </select>

                <select
                    class="tool-select"
                    title="Font size"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        if value.is_empty() {
                            exec_with("fontSize", "3");
                        } else {
                            exec_with("fontSize", &value);
                        }
                        save_current();
                    }
                >
                    <option value="">"Size"</option>
                    {FONT_SIZES
                        .iter()
                        .map(|(label, value)| view! { <option value=*value>{*label}</option> })
                        .collect_view()}
                </select>

                <button class="tool danger" on:click=move |_| set_confirm_clear.set(true)>
                    "Clear"
                </button>
            </div>

            <div
                class="editor-surface"
                contenteditable="true"
                node_ref=editor_ref
                on:input=on_input
                on:keyup=move |_| refresh_formats()
                on:mouseup=move |_| refresh_formats()
            ></div>

            {move || {
                confirm_clear
                    .get()
                    .then(|| {
                        view! {
                            <div class="dialog-overlay">
                                <div class="dialog">
                                    <h2>"Clear all notes for this question?"</h2>
                                    <div class="dialog-actions">
                                        <button class="btn danger" on:click=clear_all>
                                            "Clear"
                                        </button>
                                        <button
                                            class="btn outline"
                                            on:click=move |_| set_confirm_clear.set(false)
                                        >
                                            "Cancel"
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                    })
            }}
        </div>
    }
}
