use super::cursor::{
    caret_offset_in, current_range, get_clean_text, is_cursor_at_start, set_cursor_at_offset,
    set_cursor_in_element,
};
use super::dom::{
    direct_child_with_class, document, find_checklist, find_checklist_item,
    find_current_checklist_text, get_note_entry, has_class, indent_item_element, item_checkbox,
    item_element_at, item_text_span, merge_into_previous, outdent_item_element, path_of_item,
    query_all, read_checklist, remove_item_element, render_checklist, root_checklist,
    split_item_element, sync_checkbox_state, DomError, DomResult,
};
use super::host::{mark_as_modified, show_cursor_warning};
use super::model::{Caret, CaretTarget, Checklist, ChecklistItem, Direction, Edge, Edit, ItemPath, Nav};
use super::text::{strip_placeholders, utf16_len, PLACEHOLDER_STR};
use super::{CHECKBOX_CLASS, CHECKED_ITEM_CLASS, ITEM_CLASS, NOTE_ENTRY_CLASS};
use crate::config::EnvConfig;
use leptos::logging::{log, warn};
use leptos_dom::helpers::{request_animation_frame, set_timeout};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::str::FromStr;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent};

/// Keys the checklist takes over while the caret is inside an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
pub(crate) enum EditKey {
    Enter,
    Backspace,
    Tab,
    ArrowUp,
    ArrowDown,
}

/// Hook the host's save pipeline calls around persistence.
pub trait Persistable {
    /// Bring every persisted attribute in line with live DOM state so an
    /// `innerHTML` snapshot taken right after is complete.
    fn before_save(&self, note_entry: &Element);

    /// Re-apply live state from attributes after the host loaded saved HTML.
    fn after_load(&self, note_entry: &Element);
}

/// Checklist editing state for one document.
///
/// Owns the listener closures it installs. Listeners hold a weak reference, so
/// dropping the last `Rc` leaves them inert.
pub struct EditorSession {
    config: EnvConfig,
    initialized: Cell<bool>,
    /// Set while an Enter split is in flight; cleared once the caret lands.
    entering: Rc<Cell<bool>>,
    listeners: RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>>,
}

struct Located {
    span: Element,
    item: Element,
    root: Element,
    note: Option<Element>,
    path: ItemPath,
}

fn locate(span: &Element) -> Option<Located> {
    let item = find_checklist_item(span)?;
    find_checklist(span)?;
    let root = root_checklist(&item)?;
    let path = path_of_item(&root, &item)?;
    Some(Located {
        span: span.clone(),
        note: get_note_entry(span),
        item,
        root,
        path,
    })
}

fn restore_first_note_entry() {
    let note = document()
        .ok()
        .and_then(|doc| doc.query_selector(&format!(".{NOTE_ENTRY_CLASS}")).ok().flatten());
    if let Some(note) = note {
        restore_checklists_after_load(&note);
    }
}

fn targets_editable(ev: &Event) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<HtmlElement>().ok())
        .is_some_and(|el| el.is_content_editable() || el.content_editable() == "true")
}

fn consume(ev: &Event, immediate: bool) {
    ev.prevent_default();
    ev.stop_propagation();
    if immediate {
        ev.stop_immediate_propagation();
    }
}

fn place_caret(root: &Element, target: &CaretTarget) -> DomResult<()> {
    let item = item_element_at(root, target.path()).ok_or_else(|| DomError::missing("checklist item"))?;
    let span = item_text_span(&item).ok_or_else(|| DomError::missing("checklist text"))?;
    match target {
        CaretTarget::Edge(_, Edge::Start) => set_cursor_in_element(&span, false),
        CaretTarget::Edge(_, Edge::End) => set_cursor_in_element(&span, true),
        CaretTarget::Offset(_, offset) => set_cursor_at_offset(&span, *offset),
    }
}

impl EditorSession {
    pub fn new(config: EnvConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            initialized: Cell::new(false),
            entering: Rc::new(Cell::new(false)),
            listeners: RefCell::new(vec![]),
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn is_installed(&self) -> bool {
        self.initialized.get()
    }

    pub fn is_entering(&self) -> bool {
        self.entering.get()
    }

    /// Install the capturing `change`/`keydown`/`input` listeners on the
    /// document and restore checklists already in the first note entry, once
    /// the document has finished parsing. Calling it again is a no-op.
    pub fn install(self: &Rc<Self>) -> DomResult<()> {
        if self.initialized.get() {
            return Ok(());
        }
        let doc = document()?;

        self.listen(&doc, "change", |s, ev| s.handle_change(&ev))?;
        self.listen(&doc, "keydown", |s, ev| {
            if let Some(kev) = ev.dyn_ref::<KeyboardEvent>() {
                s.handle_keydown(kev);
            }
        })?;
        self.listen(&doc, "input", |s, ev| s.handle_input(&ev))?;
        self.initialized.set(true);

        if doc.ready_state() == "loading" {
            let restore = Closure::once_into_js(restore_first_note_entry);
            doc.add_event_listener_with_callback("DOMContentLoaded", restore.unchecked_ref())?;
        } else {
            restore_first_note_entry();
        }
        self.trace(|| "listeners installed".to_string());
        Ok(())
    }

    fn listen(
        self: &Rc<Self>,
        doc: &Document,
        kind: &'static str,
        handler: fn(&EditorSession, Event),
    ) -> DomResult<()> {
        let weak: Weak<Self> = Rc::downgrade(self);
        let cb = Closure::wrap(Box::new(move |ev: Event| {
            if let Some(s) = weak.upgrade() {
                handler(&s, ev);
            }
        }) as Box<dyn FnMut(Event)>);

        doc.add_event_listener_with_callback_and_bool(kind, cb.as_ref().unchecked_ref(), true)?;
        self.listeners.borrow_mut().push((kind, cb));
        Ok(())
    }

    pub fn uninstall(&self) {
        if let Ok(doc) = document() {
            for (kind, cb) in self.listeners.borrow_mut().drain(..) {
                let _ = doc.remove_event_listener_with_callback_and_bool(
                    kind,
                    cb.as_ref().unchecked_ref(),
                    true,
                );
            }
        }
        self.initialized.set(false);
    }

    fn trace(&self, msg: impl FnOnce() -> String) {
        if self.config.debug {
            log!("[checklist] {}", msg());
        }
    }

    fn defer(&self, f: impl FnOnce() + 'static) {
        match self.config.caret_delay_ms {
            Some(ms) => set_timeout(f, Duration::from_millis(u64::from(ms))),
            None => request_animation_frame(f),
        }
    }

    fn notify(&self, note: Option<&Element>) {
        if let Some(note) = note {
            mark_as_modified(note);
        }
    }

    // ----- event entry points -----

    pub fn handle_keydown(&self, ev: &KeyboardEvent) {
        if !targets_editable(ev) {
            return;
        }
        let Some(span) = find_current_checklist_text() else {
            return;
        };
        let Ok(key) = EditKey::from_str(&ev.key()) else {
            return;
        };

        let result = match key {
            EditKey::Enter if ev.ctrl_key() || ev.meta_key() => self.toggle_item(ev, &span),
            EditKey::Enter => self.enter(ev, &span),
            EditKey::Backspace => self.backspace(ev, &span),
            EditKey::Tab => self.tab(ev, &span, ev.shift_key()),
            EditKey::ArrowUp => self.arrow(ev, &span, Direction::Up),
            EditKey::ArrowDown => self.arrow(ev, &span, Direction::Down),
        };

        if let Err(e) = result {
            self.entering.set(false);
            warn!("[checklist] {} failed: {e}", key.as_ref());
        }
    }

    /// Keep the span's `data-value` current for ordinary typing.
    pub fn handle_input(&self, ev: &Event) {
        if !targets_editable(ev) {
            return;
        }
        if let Some(span) = find_current_checklist_text() {
            let _ = span.set_attribute("data-value", &get_clean_text(&span));
        }
    }

    pub fn handle_change(&self, ev: &Event) {
        let Some(checkbox) = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if !has_class(&checkbox, CHECKBOX_CLASS) || find_checklist_item(&checkbox).is_none() {
            return;
        }

        if let Err(e) = sync_checkbox_state(&checkbox) {
            warn!("[checklist] checkbox sync failed: {e}");
            return;
        }
        self.notify(get_note_entry(&checkbox).as_ref());
    }

    // ----- key handlers -----

    fn enter(&self, ev: &KeyboardEvent, span: &Element) -> DomResult<()> {
        if self.entering.get() {
            return Ok(());
        }
        let Some(loc) = locate(span) else {
            return Ok(());
        };

        let mut tree = read_checklist(&loc.root);
        let empty = tree.item(&loc.path).is_some_and(|i| i.is_empty());
        let offset = match caret_offset_in(&loc.span) {
            Some(offset) => offset,
            None if empty => 0,
            None => return Ok(()),
        };

        self.entering.set(true);
        consume(ev, true);

        let edit = tree.split(&Caret::new(loc.path.clone(), offset));
        self.trace(|| format!("enter at {:?}+{offset}: {edit:?}", loc.path));

        match edit {
            Edit::Exit => self.exit_checklist(&loc),
            Edit::Changed(target) => {
                split_item_element(&document()?, &loc.item, offset)?;
                // Land in the new item now so keys typed before the next frame
                // stay inside the checklist; the deferred pass re-applies it.
                place_caret(&loc.root, &target)?;
                self.notify(loc.note.as_ref());

                let root = loc.root.clone();
                let entering = self.entering.clone();
                self.defer(move || {
                    if let Err(e) = place_caret(&root, &target) {
                        warn!("[checklist] caret placement failed: {e}");
                    }
                    entering.set(false);
                });
                Ok(())
            }
            Edit::Unchanged | Edit::Consumed => {
                self.entering.set(false);
                Ok(())
            }
        }
    }

    fn toggle_item(&self, ev: &KeyboardEvent, span: &Element) -> DomResult<()> {
        consume(ev, true);

        let Some(checkbox) = find_checklist_item(span).and_then(|item| item_checkbox(&item)) else {
            return Ok(());
        };
        checkbox.set_checked(!checkbox.checked());
        sync_checkbox_state(&checkbox)?;
        self.trace(|| format!("toggled to {}", checkbox.checked()));

        self.notify(get_note_entry(&checkbox).as_ref());
        Ok(())
    }

    fn backspace(&self, ev: &KeyboardEvent, span: &Element) -> DomResult<()> {
        if !is_cursor_at_start(span) {
            return Ok(());
        }
        let Some(loc) = locate(span) else {
            return Ok(());
        };
        consume(ev, false);

        let mut tree = read_checklist(&loc.root);
        let was_empty = tree.item(&loc.path).is_some_and(|i| i.is_empty());
        let edit = tree.backspace_at_start(&loc.path);
        self.trace(|| format!("backspace at {:?}: {edit:?}", loc.path));
        self.apply(&loc, edit, |doc| {
            if was_empty {
                remove_item_element(doc, &loc.item)
            } else {
                merge_into_previous(doc, &loc.item).map(|_| ())
            }
        })
    }

    fn tab(&self, ev: &KeyboardEvent, span: &Element, outdent: bool) -> DomResult<()> {
        let Some(loc) = locate(span) else {
            return Ok(());
        };
        consume(ev, false);

        let mut tree = read_checklist(&loc.root);
        let edit = if outdent {
            tree.outdent(&loc.path)
        } else {
            tree.indent(&loc.path)
        };
        self.trace(|| format!("tab(outdent={outdent}) at {:?}: {edit:?}", loc.path));
        self.apply(&loc, edit, |doc| {
            if outdent {
                outdent_item_element(&loc.item)
            } else {
                indent_item_element(doc, &loc.item)
            }
        })
    }

    fn arrow(&self, ev: &KeyboardEvent, span: &Element, dir: Direction) -> DomResult<()> {
        let Some(loc) = locate(span) else {
            return Ok(());
        };
        let Some(offset) = caret_offset_in(span) else {
            return Ok(());
        };

        let at_boundary = match dir {
            Direction::Up => offset == 0,
            Direction::Down => {
                let text = strip_placeholders(&span.text_content().unwrap_or_default());
                offset >= utf16_len(&text)
            }
        };
        if !at_boundary {
            return Ok(());
        }

        match read_checklist(&loc.root).navigate(&loc.path, dir) {
            Nav::Item(target) => {
                ev.prevent_default();
                place_caret(&loc.root, &target)?;
            }
            Nav::LeaveList => {
                let Some(list) = find_checklist(span) else {
                    return Ok(());
                };
                let outside = match dir {
                    Direction::Up => list.previous_element_sibling(),
                    Direction::Down => list.next_element_sibling(),
                };
                if let Some(el) = outside {
                    ev.prevent_default();
                    set_cursor_in_element(&el, dir == Direction::Up)?;
                }
            }
            Nav::Stay => {}
        }
        Ok(())
    }

    // ----- applying edits -----

    /// Run `patch` on the live DOM for a changed edit and put the caret where
    /// the model says it lands.
    fn apply(
        &self,
        loc: &Located,
        edit: Edit,
        patch: impl FnOnce(&Document) -> DomResult<()>,
    ) -> DomResult<()> {
        match edit {
            Edit::Exit => self.exit_checklist(loc),
            Edit::Changed(target) => {
                patch(&document()?)?;
                place_caret(&loc.root, &target)?;
                self.notify(loc.note.as_ref());
                Ok(())
            }
            Edit::Unchanged | Edit::Consumed => Ok(()),
        }
    }

    /// Drop the current item and continue in a new paragraph after the root
    /// checklist, removing the checklist once it has no items left.
    fn exit_checklist(&self, loc: &Located) -> DomResult<()> {
        let doc = document()?;
        let p = doc.create_element("p")?;
        p.append_child(&doc.create_text_node(PLACEHOLDER_STR))?;
        loc.root.after_with_node_1(&p)?;

        remove_item_element(&doc, &loc.item)?;
        if direct_child_with_class(&loc.root, ITEM_CLASS).is_none() {
            loc.root.remove();
        }
        set_cursor_in_element(&p, false)?;
        self.entering.set(false);

        self.notify(loc.note.as_ref());
        Ok(())
    }

    // ----- public operations -----

    /// Insert a one-item checklist at the caret, preceded by an empty line.
    /// Returns `Ok(false)` when the caret is not inside a note entry.
    pub fn insert_checklist(&self) -> DomResult<bool> {
        let note = current_range().and_then(|range| {
            let container = range.common_ancestor_container().ok()?;
            let el = match container.dyn_ref::<Element>() {
                Some(el) => el.clone(),
                None => container.parent_element()?,
            };
            get_note_entry(&el).map(|note| (range, note))
        });
        let Some((range, note)) = note else {
            show_cursor_warning();
            return Ok(false);
        };

        let doc = document()?;
        let checklist = render_checklist(&doc, &Checklist::new(vec![ChecklistItem::new(false, "")]))?;
        let first = item_element_at(&checklist, &ItemPath::root(0))
            .ok_or_else(|| DomError::missing("checklist item"))?;

        let empty_line = doc.create_element("div")?;
        let br = doc.create_element("br")?;
        empty_line.append_child(&br)?;

        range.delete_contents()?;
        range.insert_node(&checklist)?;
        range.insert_node(&empty_line)?;

        if let Some(span) = item_text_span(&first) {
            set_cursor_in_element(&span, false)?;
            self.defer(move || {
                if let Err(e) = set_cursor_in_element(&span, false) {
                    warn!("[checklist] caret placement failed: {e}");
                }
            });
        }

        self.trace(|| "checklist inserted".to_string());
        mark_as_modified(&note);
        Ok(true)
    }
}

impl Persistable for EditorSession {
    fn before_save(&self, note_entry: &Element) {
        serialize_checklists_before_save(note_entry);
    }

    fn after_load(&self, note_entry: &Element) {
        restore_checklists_after_load(note_entry);
    }
}

/// Refresh `data-value` and the checkbox attributes of every item under the note.
pub fn serialize_checklists_before_save(note_entry: &Element) {
    for item in query_all(note_entry, ITEM_CLASS) {
        let (Some(checkbox), Some(span)) = (item_checkbox(&item), item_text_span(&item)) else {
            continue;
        };
        let _ = span.set_attribute("data-value", &get_clean_text(&span));
        if let Err(e) = sync_checkbox_state(&checkbox) {
            warn!("[checklist] checkbox sync failed: {e}");
        }
    }
}

/// Re-apply the live `checked` property and item class from persisted
/// attributes. Idempotent.
pub fn restore_checklists_after_load(note_entry: &Element) {
    for item in query_all(note_entry, ITEM_CLASS) {
        let Some(checkbox) = item_checkbox(&item) else {
            continue;
        };
        let checked = checkbox.get_attribute("data-checked").as_deref() == Some("1")
            || checkbox.has_attribute("checked");
        checkbox.set_checked(checked);
        if checked {
            let _ = item.class_list().add_1(CHECKED_ITEM_CLASS);
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::checklist::model::ChecklistItem;
    use crate::checklist::text::clean_text;
    use crate::checklist::CHECKLIST_CLASS;
    use wasm_bindgen_test::*;
    use web_sys::KeyboardEventInit;

    wasm_bindgen_test_configure!(run_in_browser);

    struct Fixture {
        session: Rc<EditorSession>,
        note: Element,
    }

    impl Fixture {
        fn new(tree: &Checklist) -> Self {
            let doc = document().unwrap();
            let note = doc.create_element("div").unwrap();
            note.set_class_name(NOTE_ENTRY_CLASS);
            note.set_attribute("contenteditable", "true").unwrap();
            let mut cfg = EnvConfig::default();
            cfg.caret_delay_ms = Some(0);
            let session = EditorSession::new(cfg);

            let intro = doc.create_element("p").unwrap();
            intro.set_text_content(Some("intro"));
            note.append_child(&intro).unwrap();
            note.append_child(&render_checklist(&doc, tree).unwrap()).unwrap();
            doc.body().unwrap().append_child(&note).unwrap();

            session.install().unwrap();
            Self { session, note }
        }

        fn root(&self) -> Option<Element> {
            self.note.query_selector(&format!(":scope > .{CHECKLIST_CLASS}")).unwrap()
        }

        fn tree(&self) -> Checklist {
            self.root().map(|r| read_checklist(&r)).unwrap_or_default()
        }

        fn span(&self, path: &ItemPath) -> Element {
            let item = item_element_at(&self.root().unwrap(), path).unwrap();
            item_text_span(&item).unwrap()
        }

        /// Dispatches a keydown on the span; returns whether the default action survived.
        fn press(&self, path: &ItemPath, offset: u32, key: &str, shift: bool) -> bool {
            let init = KeyboardEventInit::new();
            init.set_shift_key(shift);
            self.dispatch_key(path, offset, key, init)
        }

        fn press_ctrl(&self, path: &ItemPath, offset: u32, key: &str) -> bool {
            let init = KeyboardEventInit::new();
            init.set_ctrl_key(true);
            self.dispatch_key(path, offset, key, init)
        }

        fn dispatch_key(&self, path: &ItemPath, offset: u32, key: &str, init: KeyboardEventInit) -> bool {
            let span = self.span(path);
            set_cursor_at_offset(&span, offset).unwrap();

            init.set_key(key);
            init.set_bubbles(true);
            init.set_cancelable(true);
            let ev = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
            span.dispatch_event(&ev).unwrap()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.session.uninstall();
            self.note.remove();
        }
    }

    fn texts(list: &Checklist) -> Vec<String> {
        list.items.iter().map(|i| clean_text(&i.text)).collect()
    }

    #[wasm_bindgen_test]
    fn test_install_is_idempotent() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "a")]));
        fx.session.install().unwrap();
        assert!(fx.session.is_installed());
        assert_eq!(fx.session.listeners.borrow().len(), 3);
    }

    #[wasm_bindgen_test]
    fn test_enter_splits_and_backspace_merges() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "ABCDEF")]));

        assert!(!fx.press(&ItemPath::root(0), 3, "Enter", false));
        assert_eq!(texts(&fx.tree()), vec!["ABC", "DEF"]);
        assert!(fx.session.is_entering());
        fx.session.entering.set(false);

        assert!(!fx.press(&ItemPath::root(1), 0, "Backspace", false));
        assert_eq!(texts(&fx.tree()), vec!["ABCDEF"]);
        assert_eq!(caret_offset_in(&fx.span(&ItemPath::root(0))), Some(3));
    }

    #[wasm_bindgen_test]
    fn test_enter_is_ignored_while_previous_enter_in_flight() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "ABCDEF")]));
        fx.session.entering.set(true);
        assert!(fx.press(&ItemPath::root(0), 3, "Enter", false));
        assert_eq!(texts(&fx.tree()), vec!["ABCDEF"]);
    }

    #[wasm_bindgen_test]
    fn test_enter_and_backspace_on_sole_empty_item_both_exit() {
        for key in ["Enter", "Backspace"] {
            let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "")]));
            assert!(!fx.press(&ItemPath::root(0), 0, key, false));

            assert!(fx.root().is_none(), "{key} should remove the checklist");
            let last = fx.note.last_element_child().unwrap();
            assert_eq!(last.tag_name().to_lowercase(), "p");
            assert_eq!(clean_text(&last.text_content().unwrap()), "");
            assert!(!fx.session.is_entering());
        }
    }

    #[wasm_bindgen_test]
    fn test_second_tab_leaves_dom_unchanged() {
        let fx = Fixture::new(&Checklist::new(vec![
            ChecklistItem::new(false, "Y"),
            ChecklistItem::new(false, "X"),
        ]));

        assert!(!fx.press(&ItemPath::root(1), 1, "Tab", false));
        let after_first = fx.note.inner_html();
        assert!(!fx.press(&ItemPath::new(vec![0, 0]), 1, "Tab", false));
        assert_eq!(fx.note.inner_html(), after_first);
    }

    #[wasm_bindgen_test]
    fn test_shift_tab_undoes_tab() {
        let fx = Fixture::new(&Checklist::new(vec![
            ChecklistItem::new(false, "Y"),
            ChecklistItem::new(false, "X"),
        ]));
        let before = fx.tree();

        fx.press(&ItemPath::root(1), 1, "Tab", false);
        fx.press(&ItemPath::new(vec![0, 0]), 1, "Tab", true);

        assert_eq!(fx.tree(), before);
        let y = item_element_at(&fx.root().unwrap(), &ItemPath::root(0)).unwrap();
        assert!(y.query_selector(&format!(".{CHECKLIST_CLASS}")).unwrap().is_none());
    }

    #[wasm_bindgen_test]
    fn test_arrow_down_at_end_of_last_item_is_not_intercepted() {
        let fx = Fixture::new(&Checklist::new(vec![
            ChecklistItem::new(false, "one"),
            ChecklistItem::new(false, "two"),
        ]));
        assert!(fx.press(&ItemPath::root(1), 3, "ArrowDown", false));
        assert!(!fx.press(&ItemPath::root(0), 3, "ArrowDown", false));
        assert_eq!(caret_offset_in(&fx.span(&ItemPath::root(1))), Some(0));
    }

    #[wasm_bindgen_test]
    fn test_arrow_up_from_first_item_moves_to_previous_element() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "one")]));
        assert!(!fx.press(&ItemPath::root(0), 0, "ArrowUp", false));
    }

    #[wasm_bindgen_test]
    fn test_checkbox_change_syncs_attributes() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "task")]));
        let item = item_element_at(&fx.root().unwrap(), &ItemPath::root(0)).unwrap();
        let checkbox = item_checkbox(&item).unwrap();

        checkbox.set_checked(true);
        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        checkbox
            .dispatch_event(&Event::new_with_event_init_dict("change", &init).unwrap())
            .unwrap();

        assert_eq!(checkbox.get_attribute("data-checked").as_deref(), Some("1"));
        assert!(checkbox.has_attribute("checked"));
        assert!(has_class(&item, CHECKED_ITEM_CLASS));
    }

    #[wasm_bindgen_test]
    fn test_restore_twice_matches_once() {
        let doc = document().unwrap();
        let note = doc.create_element("div").unwrap();
        note.set_inner_html(
            r#"<ul class="checklist"><li class="checklist-item"><input type="checkbox" class="checklist-checkbox" data-checked="1"> <span class="checklist-text">a</span></li><li class="checklist-item"><input type="checkbox" class="checklist-checkbox" checked="checked" data-checked="0"> <span class="checklist-text">b</span></li><li class="checklist-item"><input type="checkbox" class="checklist-checkbox" data-checked="0"> <span class="checklist-text">c</span></li></ul>"#,
        );

        restore_checklists_after_load(&note);
        let once_html = note.inner_html();
        let once = read_checklist(&note.first_element_child().unwrap());

        restore_checklists_after_load(&note);
        assert_eq!(note.inner_html(), once_html);
        assert_eq!(read_checklist(&note.first_element_child().unwrap()), once);
        let checked: Vec<bool> = once.items.iter().map(|i| i.checked).collect();
        assert_eq!(checked, vec![true, true, false]);
    }

    #[wasm_bindgen_test]
    fn test_serialize_then_reload_round_trips() {
        let doc = document().unwrap();
        let note = doc.create_element("div").unwrap();
        let tree = Checklist::new(vec![
            ChecklistItem::new(true, "Buy milk"),
            ChecklistItem::new(false, ""),
        ]);
        note.append_child(&render_checklist(&doc, &tree).unwrap()).unwrap();

        serialize_checklists_before_save(&note);
        let html = note.inner_html();

        let fresh = doc.create_element("div").unwrap();
        fresh.set_inner_html(&html);
        restore_checklists_after_load(&fresh);

        let reloaded = read_checklist(&fresh.first_element_child().unwrap());
        assert_eq!(reloaded, tree);
        let empty_span = item_text_span(
            &item_element_at(&fresh.first_element_child().unwrap(), &ItemPath::root(1)).unwrap(),
        )
        .unwrap();
        assert_eq!(empty_span.text_content().as_deref(), Some(PLACEHOLDER_STR));
        assert_eq!(get_clean_text(&empty_span), "");
    }

    #[wasm_bindgen_test]
    fn test_insert_checklist_outside_note_is_refused() {
        let session = EditorSession::new(EnvConfig::default());
        if let Some(sel) = crate::checklist::cursor::current_selection() {
            sel.remove_all_ranges().unwrap();
        }
        assert!(!session.insert_checklist().unwrap());
    }

    #[wasm_bindgen_test]
    fn test_insert_checklist_at_caret() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "x")]));
        let intro = fx.note.first_element_child().unwrap();
        set_cursor_in_element(&intro, true).unwrap();

        assert!(fx.session.insert_checklist().unwrap());
        let lists = query_all(&fx.note, CHECKLIST_CLASS);
        assert_eq!(lists.len(), 2);
        let inserted = read_checklist(&lists[0]);
        assert_eq!(inserted, Checklist::new(vec![ChecklistItem::new(false, "")]));
        let before = lists[0].previous_element_sibling().unwrap();
        assert_eq!(before.tag_name().to_lowercase(), "div");
    }

    fn caret_span() -> Option<Element> {
        find_current_checklist_text()
    }

    #[wasm_bindgen_test]
    fn test_enter_places_caret_in_new_item_before_next_frame() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "ABCDEF")]));

        fx.press(&ItemPath::root(0), 3, "Enter", false);

        let second = fx.span(&ItemPath::root(1));
        assert_eq!(caret_span().as_ref(), Some(&second));
        assert_eq!(caret_offset_in(&second), Some(0));
    }

    #[wasm_bindgen_test]
    fn test_structural_keys_keep_markup_of_other_items() {
        let fx = Fixture::new(&Checklist::new(vec![
            ChecklistItem::new(false, "first"),
            ChecklistItem::new(false, "second"),
            ChecklistItem::new(false, "third"),
        ]));
        fx.span(&ItemPath::root(0))
            .set_inner_html(r#"<b>bold</b> and <a href="https://example.com">link</a>"#);
        let before = fx.span(&ItemPath::root(0)).inner_html();

        assert!(!fx.press(&ItemPath::root(2), 5, "Tab", false));
        assert_eq!(fx.span(&ItemPath::root(0)).inner_html(), before);

        assert!(!fx.press(&ItemPath::new(vec![1, 0]), 3, "Enter", false));
        fx.session.entering.set(false);
        assert_eq!(fx.span(&ItemPath::root(0)).inner_html(), before);

        assert!(!fx.press(&ItemPath::new(vec![1, 1]), 0, "Tab", true));
        assert_eq!(fx.span(&ItemPath::root(0)).inner_html(), before);
        assert_eq!(texts(&fx.tree()), vec!["bold and link", "second", "rd"]);
    }

    #[wasm_bindgen_test]
    fn test_ctrl_enter_toggles_checkbox_without_touching_text() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "task")]));

        assert!(!fx.press_ctrl(&ItemPath::root(0), 2, "Enter"));
        let item = item_element_at(&fx.root().unwrap(), &ItemPath::root(0)).unwrap();
        let checkbox = item_checkbox(&item).unwrap();
        assert!(checkbox.checked());
        assert_eq!(checkbox.get_attribute("data-checked").as_deref(), Some("1"));
        assert!(has_class(&item, CHECKED_ITEM_CLASS));
        assert_eq!(texts(&fx.tree()), vec!["task"]);

        fx.press_ctrl(&ItemPath::root(0), 2, "Enter");
        assert!(!checkbox.checked());
        assert!(!checkbox.has_attribute("checked"));
        assert!(!has_class(&item, CHECKED_ITEM_CLASS));
    }

    #[wasm_bindgen_test]
    fn test_input_refreshes_data_value() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "old")]));
        let span = fx.span(&ItemPath::root(0));
        span.set_text_content(Some(" typed text \u{200B}"));
        set_cursor_at_offset(&span, 3).unwrap();

        let init = web_sys::EventInit::new();
        init.set_bubbles(true);
        span.dispatch_event(&Event::new_with_event_init_dict("input", &init).unwrap())
            .unwrap();

        assert_eq!(span.get_attribute("data-value").as_deref(), Some("typed text"));
    }

    #[wasm_bindgen_test]
    fn test_backspace_on_empty_middle_item_moves_caret_to_previous_end() {
        let fx = Fixture::new(&Checklist::new(vec![
            ChecklistItem::new(false, "one"),
            ChecklistItem::new(false, ""),
            ChecklistItem::new(false, "three"),
        ]));

        assert!(!fx.press(&ItemPath::root(1), 0, "Backspace", false));

        assert_eq!(texts(&fx.tree()), vec!["one", "three"]);
        let first = fx.span(&ItemPath::root(0));
        assert_eq!(caret_span().as_ref(), Some(&first));
        assert_eq!(caret_offset_in(&first), Some(3));
    }

    #[wasm_bindgen_test]
    fn test_arrow_up_leaving_list_lands_at_end_of_previous_element() {
        let fx = Fixture::new(&Checklist::new(vec![ChecklistItem::new(false, "one")]));

        assert!(!fx.press(&ItemPath::root(0), 0, "ArrowUp", false));

        let range = current_range().unwrap();
        let container = range.start_container().unwrap();
        let intro = fx.note.first_element_child().unwrap();
        assert_eq!(container.parent_element().as_ref(), Some(&intro));
        assert_eq!(range.start_offset().unwrap(), 5);
        assert!(caret_span().is_none());
    }
}
