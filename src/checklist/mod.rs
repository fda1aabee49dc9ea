//! Checkbox lists inside a contenteditable note entry.
//!
//! The live DOM is read into a [`Checklist`] tree, edited there, and written
//! back. Only the root checklist of the item being edited is ever rewritten.

mod cursor;
pub(crate) mod dom;
mod host;
pub mod model;
mod session;
pub(crate) mod text;

pub const CHECKLIST_CLASS: &str = "checklist";
pub const ITEM_CLASS: &str = "checklist-item";
pub const CHECKBOX_CLASS: &str = "checklist-checkbox";
pub const TEXT_CLASS: &str = "checklist-text";
pub const CHECKED_ITEM_CLASS: &str = "checklist-item-checked";
pub const NOTE_ENTRY_CLASS: &str = "noteentry";

pub use dom::{DomError, DomErrorKind, DomResult};
pub use model::{Checklist, ChecklistItem, ItemPath};
pub use session::{
    restore_checklists_after_load, serialize_checklists_before_save, EditorSession, Persistable,
};
pub use text::clean_text;
