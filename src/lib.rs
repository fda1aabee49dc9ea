pub mod app;
pub mod checklist;
mod components;
pub mod config;
pub mod models;
mod pages;
mod storage;
mod util;

use crate::checklist::{EditorSession, Persistable};
use crate::config::EnvConfig;
use leptos::logging::warn;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::Element;

thread_local! {
    static SESSION: Rc<EditorSession> = EditorSession::new(EnvConfig::new());
}

/// The session installed on the page's document at start.
pub fn default_session() -> Rc<EditorSession> {
    SESSION.with(Rc::clone)
}

fn first_note_entry() -> Option<Element> {
    let doc = web_sys::window()?.document()?;
    doc.query_selector(&format!(".{}", checklist::NOTE_ENTRY_CLASS))
        .ok()
        .flatten()
}

/// Insert a checklist at the caret. Returns `false` when the caret is not in a note.
#[wasm_bindgen(js_name = insertChecklist)]
pub fn insert_checklist() -> bool {
    default_session().insert_checklist().unwrap_or_else(|e| {
        warn!("[checklist] insert failed: {e}");
        false
    })
}

/// Does nothing when called without a note entry.
#[wasm_bindgen(js_name = serializeChecklistsBeforeSave)]
pub fn serialize_checklists_before_save(note_entry: Option<Element>) {
    if let Some(note) = note_entry {
        checklist::serialize_checklists_before_save(&note);
    }
}

/// Does nothing when called without a note entry.
#[wasm_bindgen(js_name = restoreChecklistsAfterLoad)]
pub fn restore_checklists_after_load(note_entry: Option<Element>) {
    if let Some(note) = note_entry {
        checklist::restore_checklists_after_load(&note);
    }
}

/// Save hook for hosts: call right before reading the note's `innerHTML`.
#[wasm_bindgen(js_name = checklistBeforeSave)]
pub fn checklist_before_save(note_entry: Option<Element>) {
    if let Some(note) = note_entry.or_else(first_note_entry) {
        default_session().before_save(&note);
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let session = default_session();
    if let Err(e) = session.install() {
        warn!("[checklist] install failed: {e}");
    }
    if session.config().mount_demo {
        leptos::mount::mount_to_body(app::App);
    }
}
