use serde::{Deserialize, Serialize};

/// Saved state of one demo note, as kept in localStorage.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NoteSnapshot {
    pub note_id: String,
    /// `innerHTML` of the note entry, taken after the before-save hook ran.
    pub html: String,
    pub saved_ms: i64,
}
