use crate::models::NoteSnapshot;
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

pub(crate) const NOTE_SNAPSHOT_PREFIX: &str = "checklist_note_";

pub(crate) fn snapshot_key(note_id: &str) -> String {
    format!("{NOTE_SNAPSHOT_PREFIX}{}", note_id.trim())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_note_snapshot(note_id: &str) -> Option<NoteSnapshot> {
    load_json_from_storage::<NoteSnapshot>(&snapshot_key(note_id))
        .filter(|s| s.note_id == note_id.trim())
}

/// Store `html` for the note and return what was written.
pub(crate) fn save_note_snapshot(note_id: &str, html: String) -> NoteSnapshot {
    let snap = NoteSnapshot {
        note_id: note_id.trim().to_string(),
        html,
        saved_ms: now_ms(),
    };
    save_json_to_storage(&snapshot_key(note_id), &snap);
    snap
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_note_snapshot_storage_roundtrip() {
        let saved = save_note_snapshot("roundtrip", "<p>hi</p>".to_string());
        let loaded = load_note_snapshot("roundtrip").expect("should load snapshot");
        assert_eq!(loaded, saved);
        assert!(load_note_snapshot("never-saved").is_none());
    }
}
