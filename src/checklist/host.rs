//! Optional capabilities the host page exposes on the global scope.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventInit};

pub(crate) const MARK_MODIFIED_HOOK: &str = "markNoteAsModified";
pub(crate) const CURSOR_WARNING_HOOK: &str = "showCursorWarning";

/// Call `window[name]()` if the host defined it. Returns whether it ran.
pub(crate) fn call_host_hook(name: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Ok(value) = Reflect::get(&window, &JsValue::from_str(name)) else {
        return false;
    };
    let Ok(hook) = value.dyn_into::<Function>() else {
        return false;
    };
    hook.call0(&window).is_ok()
}

/// Tell the host the note changed: the host hook first, then a bubbling
/// `input` event on the note entry for generic autosave listeners.
pub(crate) fn mark_as_modified(note_entry: &Element) {
    call_host_hook(MARK_MODIFIED_HOOK);

    let init = EventInit::new();
    init.set_bubbles(true);
    if let Ok(ev) = Event::new_with_event_init_dict("input", &init) {
        let _ = note_entry.dispatch_event(&ev);
    }
}

pub(crate) fn show_cursor_warning() {
    call_host_hook(CURSOR_WARNING_HOOK);
}
