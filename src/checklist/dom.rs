use super::model::{Checklist, ChecklistItem, ItemPath};
use super::cursor::clean_position;
use super::text::{clean_text, display_text, strip_placeholders, PLACEHOLDER_STR};
use super::{CHECKBOX_CLASS, CHECKED_ITEM_CLASS, CHECKLIST_CLASS, ITEM_CLASS, NOTE_ENTRY_CLASS, TEXT_CLASS};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement, Node};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomErrorKind {
    NoWindow,
    Missing,
    Js,
}

#[derive(Clone, Debug)]
pub struct DomError {
    pub kind: DomErrorKind,
    pub message: String,
}

impl std::error::Error for DomError {}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl DomError {
    pub(crate) fn no_window() -> Self {
        Self {
            kind: DomErrorKind::NoWindow,
            message: "window/document unavailable".to_string(),
        }
    }

    pub(crate) fn missing(what: &str) -> Self {
        Self {
            kind: DomErrorKind::Missing,
            message: format!("missing {what}"),
        }
    }
}

impl From<JsValue> for DomError {
    fn from(v: JsValue) -> Self {
        Self {
            kind: DomErrorKind::Js,
            message: v.as_string().unwrap_or_else(|| format!("{v:?}")),
        }
    }
}

pub type DomResult<T> = Result<T, DomError>;

pub(crate) fn document() -> DomResult<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(DomError::no_window)
}

// ----- creation -----

pub(crate) fn create_checkbox(doc: &Document, checked: bool) -> DomResult<HtmlInputElement> {
    let checkbox: HtmlInputElement = doc
        .create_element("input")?
        .dyn_into()
        .map_err(|_| DomError::missing("input element"))?;
    checkbox.set_type("checkbox");
    checkbox.set_class_name(CHECKBOX_CLASS);
    checkbox.set_checked(checked);
    checkbox.set_attribute("contenteditable", "false")?;

    if checked {
        checkbox.set_attribute("checked", "checked")?;
        checkbox.set_attribute("data-checked", "1")?;
    } else {
        checkbox.set_attribute("data-checked", "0")?;
    }

    Ok(checkbox)
}

pub(crate) fn create_text_span(doc: &Document, text: &str) -> DomResult<Element> {
    let span = doc.create_element("span")?;
    span.set_class_name(TEXT_CLASS);
    span.append_child(&doc.create_text_node(display_text(text)))?;
    span.set_attribute("data-value", &clean_text(text))?;
    Ok(span)
}

pub(crate) fn create_checklist_item(doc: &Document, checked: bool, text: &str) -> DomResult<Element> {
    let li = doc.create_element("li")?;
    li.set_class_name(ITEM_CLASS);
    if checked {
        li.class_list().add_1(CHECKED_ITEM_CLASS)?;
    }

    let checkbox = create_checkbox(doc, checked)?;
    let span = create_text_span(doc, text)?;
    li.append_child(&checkbox)?;
    li.append_child(&doc.create_text_node(" "))?;
    li.append_child(&span)?;

    Ok(li)
}

pub(crate) fn create_checklist(doc: &Document) -> DomResult<Element> {
    let ul = doc.create_element("ul")?;
    ul.set_class_name(CHECKLIST_CLASS);
    ul.set_attribute("style", "list-style: none; padding-left: 0px; margin: 8px 0px;")?;
    Ok(ul)
}

// ----- traversal -----

pub(crate) fn has_class(el: &Element, class: &str) -> bool {
    el.class_list().contains(class)
}

fn closest(el: &Element, class: &str) -> Option<Element> {
    el.closest(&format!(".{class}")).ok().flatten()
}

pub(crate) fn find_checklist_item(el: &Element) -> Option<Element> {
    closest(el, ITEM_CLASS)
}

pub(crate) fn find_checklist(el: &Element) -> Option<Element> {
    closest(el, CHECKLIST_CLASS)
}

pub(crate) fn get_note_entry(el: &Element) -> Option<Element> {
    closest(el, NOTE_ENTRY_CLASS)
}

/// The checklist text span holding the start of the current selection.
pub(crate) fn find_current_checklist_text() -> Option<Element> {
    let range = super::cursor::current_range()?;
    let mut node = range.start_container().ok();
    while let Some(n) = node {
        if let Some(el) = n.dyn_ref::<Element>() {
            if has_class(el, TEXT_CLASS) {
                return Some(el.clone());
            }
        }
        node = n.parent_node();
    }
    None
}

pub(crate) fn direct_children_with_class(el: &Element, class: &str) -> Vec<Element> {
    let children = el.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter(|c| has_class(c, class))
        .collect()
}

pub(crate) fn direct_child_with_class(el: &Element, class: &str) -> Option<Element> {
    direct_children_with_class(el, class).into_iter().next()
}

pub(crate) fn query_all(root: &Element, class: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(&format!(".{class}")) else {
        return vec![];
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn item_checkbox(item: &Element) -> Option<HtmlInputElement> {
    direct_child_with_class(item, CHECKBOX_CLASS)?.dyn_into().ok()
}

pub(crate) fn item_text_span(item: &Element) -> Option<Element> {
    direct_child_with_class(item, TEXT_CLASS)
}

/// Outermost checklist around `el`, climbing out of nested lists.
pub(crate) fn root_checklist(el: &Element) -> Option<Element> {
    let mut list = find_checklist(el)?;
    loop {
        let Some(parent) = list.parent_element() else {
            return Some(list);
        };
        if !has_class(&parent, ITEM_CLASS) {
            return Some(list);
        }
        match find_checklist(&parent) {
            Some(outer) => list = outer,
            None => return Some(list),
        }
    }
}

pub(crate) fn path_of_item(root: &Element, item: &Element) -> Option<ItemPath> {
    let mut indices = vec![];
    let mut current = item.clone();
    loop {
        let list = current.parent_element()?;
        let idx = direct_children_with_class(&list, ITEM_CLASS)
            .iter()
            .position(|c| c == &current)?;
        indices.push(idx);
        if &list == root {
            break;
        }
        current = list.parent_element().filter(|p| has_class(p, ITEM_CLASS))?;
    }
    indices.reverse();
    Some(ItemPath::new(indices))
}

pub(crate) fn item_element_at(root: &Element, path: &ItemPath) -> Option<Element> {
    let mut list = root.clone();
    let mut item: Option<Element> = None;
    for (depth, &i) in path.indices().iter().enumerate() {
        if depth > 0 {
            list = direct_child_with_class(item.as_ref()?, CHECKLIST_CLASS)?;
        }
        item = Some(direct_children_with_class(&list, ITEM_CLASS).into_iter().nth(i)?);
    }
    item
}

// ----- checkbox state -----

/// Mirror the live `checked` property into the `checked` and `data-checked`
/// attributes and the item's checked class.
pub(crate) fn sync_checkbox_state(checkbox: &HtmlInputElement) -> DomResult<()> {
    let Some(item) = find_checklist_item(checkbox) else {
        return Ok(());
    };
    let checked = checkbox.checked();
    checkbox.set_attribute("data-checked", if checked { "1" } else { "0" })?;
    if checked {
        checkbox.set_attribute("checked", "checked")?;
        item.class_list().add_1(CHECKED_ITEM_CLASS)?;
    } else {
        checkbox.remove_attribute("checked")?;
        item.class_list().remove_1(CHECKED_ITEM_CLASS)?;
    }
    Ok(())
}

// ----- tree bridge -----

pub(crate) fn read_checklist(list: &Element) -> Checklist {
    Checklist::new(
        direct_children_with_class(list, ITEM_CLASS)
            .iter()
            .map(read_item)
            .collect(),
    )
}

fn read_item(item: &Element) -> ChecklistItem {
    let checked = item_checkbox(item).map(|c| c.checked()).unwrap_or(false);
    let text = item_text_span(item)
        .and_then(|s| s.text_content())
        .map(|t| strip_placeholders(&t))
        .unwrap_or_default();
    let children = direct_child_with_class(item, CHECKLIST_CLASS)
        .map(|l| read_checklist(&l))
        .filter(|c| !c.is_empty());

    ChecklistItem {
        checked,
        text,
        children,
    }
}

pub(crate) fn render_checklist(doc: &Document, list: &Checklist) -> DomResult<Element> {
    let ul = create_checklist(doc)?;
    for item in &list.items {
        let li = create_checklist_item(doc, item.checked, &item.text)?;
        if let Some(children) = item.children.as_ref().filter(|c| !c.is_empty()) {
            let nested = render_checklist(doc, children)?;
            li.append_child(&nested)?;
        }
        ul.append_child(&li)?;
    }
    Ok(ul)
}

// ----- live edits -----
//
// Structural edits move the existing `li` nodes instead of re-rendering, so
// markup inside text spans and anything else an item holds survives. Each one
// mirrors the matching transition in `model`.

const INLINE_WRAPPERS: [&str; 12] = [
    "A", "B", "I", "U", "S", "EM", "STRONG", "SPAN", "CODE", "MARK", "SUB", "SUP",
];

/// Whether `node` renders anything besides placeholders and empty inline wrappers.
pub(crate) fn has_content(node: &Node) -> bool {
    if node.node_type() == Node::TEXT_NODE {
        return !strip_placeholders(&node.text_content().unwrap_or_default()).is_empty();
    }
    let children = node.child_nodes();
    if children.length() == 0 {
        return node
            .dyn_ref::<Element>()
            .is_some_and(|el| !INLINE_WRAPPERS.contains(&el.tag_name().to_uppercase().as_str()));
    }
    (0..children.length())
        .filter_map(|i| children.item(i))
        .any(|c| has_content(&c))
}

/// Put the placeholder back into a span left without content and refresh its
/// `data-value`.
pub(crate) fn refresh_text_span(span: &Element) -> DomResult<()> {
    if !has_content(span) {
        span.set_text_content(Some(PLACEHOLDER_STR));
    }
    span.set_attribute("data-value", &clean_text(&span.text_content().unwrap_or_default()))?;
    Ok(())
}

fn previous_item(item: &Element) -> Option<Element> {
    let mut sibling = item.previous_element_sibling();
    while let Some(el) = sibling {
        if has_class(&el, ITEM_CLASS) {
            return Some(el);
        }
        sibling = el.previous_element_sibling();
    }
    None
}

fn is_nested(list: &Element) -> bool {
    list.parent_element()
        .is_some_and(|p| has_class(&p, ITEM_CLASS))
}

fn nested_list_of(doc: &Document, item: &Element) -> DomResult<Element> {
    if let Some(list) = direct_child_with_class(item, CHECKLIST_CLASS) {
        return Ok(list);
    }
    let list = create_checklist(doc)?;
    item.append_child(&list)?;
    Ok(list)
}

fn drop_if_empty(list: &Element) {
    if direct_child_with_class(list, ITEM_CLASS).is_none() {
        list.remove();
    }
}

fn move_items(from: &Element, to: &Element) -> DomResult<()> {
    for child in direct_children_with_class(from, ITEM_CLASS) {
        to.append_child(&child)?;
    }
    Ok(())
}

fn text_span_of(item: &Element) -> DomResult<Element> {
    item_text_span(item).ok_or_else(|| DomError::missing("checklist text"))
}

/// Split `item`'s text at a placeholder-free UTF-16 offset. The tail, markup
/// included, moves into a new unchecked item inserted right after `item`.
pub(crate) fn split_item_element(doc: &Document, item: &Element, offset: u32) -> DomResult<Element> {
    let span = text_span_of(item)?;
    let next = create_checklist_item(doc, false, "")?;
    let next_span = text_span_of(&next)?;

    let range = doc.create_range()?;
    match clean_position(&span, offset) {
        Some((node, pos)) => range.set_start(&node, pos)?,
        None => range.set_start(&span, 0)?,
    }
    range.set_end(&span, span.child_nodes().length())?;
    let tail = range.extract_contents()?;

    if has_content(&tail) {
        next_span.set_text_content(None);
        next_span.append_child(&tail)?;
    }
    refresh_text_span(&span)?;
    refresh_text_span(&next_span)?;

    item.after_with_node_1(&next)?;
    Ok(next)
}

/// Remove `item`. Its nested items go to the previous root-level sibling's
/// nested list, or take its slot. A nested list left empty is dropped.
pub(crate) fn remove_item_element(doc: &Document, item: &Element) -> DomResult<()> {
    let list = item
        .parent_element()
        .ok_or_else(|| DomError::missing("checklist"))?;

    if let Some(nested) = direct_child_with_class(item, CHECKLIST_CLASS) {
        match previous_item(item).filter(|_| !is_nested(&list)) {
            Some(prev) => move_items(&nested, &nested_list_of(doc, &prev)?)?,
            None => {
                for child in direct_children_with_class(&nested, ITEM_CLASS) {
                    item.before_with_node_1(&child)?;
                }
            }
        }
    }

    item.remove();
    if is_nested(&list) {
        drop_if_empty(&list);
    }
    Ok(())
}

/// Append `item`'s text content and nested items to its previous sibling, then
/// remove it. Returns the merged item.
pub(crate) fn merge_into_previous(doc: &Document, item: &Element) -> DomResult<Element> {
    let prev = previous_item(item).ok_or_else(|| DomError::missing("previous checklist item"))?;
    let prev_span = text_span_of(&prev)?;
    let span = text_span_of(item)?;

    if !has_content(&prev_span) {
        prev_span.set_text_content(None);
    }
    while let Some(child) = span.first_child() {
        prev_span.append_child(&child)?;
    }
    if let Some(nested) = direct_child_with_class(item, CHECKLIST_CLASS) {
        move_items(&nested, &nested_list_of(doc, &prev)?)?;
    }

    item.remove();
    refresh_text_span(&prev_span)?;
    Ok(prev)
}

/// Move `item` to the end of its previous sibling's nested list. Its own
/// nested items follow it into that list.
pub(crate) fn indent_item_element(doc: &Document, item: &Element) -> DomResult<()> {
    let prev = previous_item(item).ok_or_else(|| DomError::missing("previous checklist item"))?;
    let target = nested_list_of(doc, &prev)?;
    let own = direct_child_with_class(item, CHECKLIST_CLASS);

    target.append_child(item)?;
    if let Some(own) = own {
        move_items(&own, &target)?;
        own.remove();
    }
    Ok(())
}

/// Move a nested `item` right after its parent item.
pub(crate) fn outdent_item_element(item: &Element) -> DomResult<()> {
    let list = item
        .parent_element()
        .ok_or_else(|| DomError::missing("checklist"))?;
    let parent = list
        .parent_element()
        .filter(|p| has_class(p, ITEM_CLASS))
        .ok_or_else(|| DomError::missing("parent checklist item"))?;

    parent.after_with_node_1(item)?;
    drop_if_empty(&list);
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::checklist::text::{clean_text, PLACEHOLDER_STR};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn doc() -> Document {
        document().expect("document")
    }

    #[wasm_bindgen_test]
    fn test_create_checkbox_mirrors_checked_into_attributes() {
        let on = create_checkbox(&doc(), true).unwrap();
        assert!(on.checked());
        assert_eq!(on.get_attribute("data-checked").as_deref(), Some("1"));
        assert!(on.has_attribute("checked"));
        assert_eq!(on.get_attribute("contenteditable").as_deref(), Some("false"));

        let off = create_checkbox(&doc(), false).unwrap();
        assert!(!off.checked());
        assert_eq!(off.get_attribute("data-checked").as_deref(), Some("0"));
        assert!(!off.has_attribute("checked"));
    }

    #[wasm_bindgen_test]
    fn test_empty_text_span_holds_placeholder() {
        let span = create_text_span(&doc(), "").unwrap();
        assert_eq!(span.text_content().as_deref(), Some(PLACEHOLDER_STR));
        assert_eq!(span.get_attribute("data-value").as_deref(), Some(""));
        assert_eq!(span.child_nodes().length(), 1);
    }

    #[wasm_bindgen_test]
    fn test_sync_checkbox_state_keeps_four_representations_in_step() {
        let d = doc();
        let ul = create_checklist(&d).unwrap();
        let li = create_checklist_item(&d, false, "task").unwrap();
        ul.append_child(&li).unwrap();
        let checkbox = item_checkbox(&li).unwrap();

        for checked in [true, false, true] {
            checkbox.set_checked(checked);
            sync_checkbox_state(&checkbox).unwrap();
            assert_eq!(checkbox.checked(), checked);
            assert_eq!(checkbox.get_attribute("data-checked").as_deref() == Some("1"), checked);
            assert_eq!(checkbox.has_attribute("checked"), checked);
            assert_eq!(has_class(&li, CHECKED_ITEM_CLASS), checked);
        }
    }

    #[wasm_bindgen_test]
    fn test_render_then_read_keeps_tree() {
        let tree = Checklist::new(vec![
            ChecklistItem::new(true, "Buy milk"),
            ChecklistItem::new(false, "")
                .with_children(vec![ChecklistItem::new(false, "sub")]),
        ]);
        let ul = render_checklist(&doc(), &tree).unwrap();
        assert_eq!(read_checklist(&ul), tree);

        let nested = item_element_at(&ul, &ItemPath::new(vec![1, 0])).unwrap();
        assert_eq!(path_of_item(&ul, &nested), Some(ItemPath::new(vec![1, 0])));
        assert_eq!(root_checklist(&nested).as_ref(), Some(&ul));
        let span = item_text_span(&nested).unwrap();
        assert_eq!(clean_text(&span.text_content().unwrap()), "sub");
    }

    fn list_of(html: &str) -> Element {
        let holder = doc().create_element("div").unwrap();
        holder.set_inner_html(html);
        holder.first_element_child().unwrap()
    }

    fn item_html(text_html: &str) -> String {
        format!(
            r#"<li class="checklist-item"><input type="checkbox" class="checklist-checkbox" data-checked="0"> <span class="checklist-text">{text_html}</span></li>"#
        )
    }

    #[wasm_bindgen_test]
    fn test_text_span_data_value_is_clean_text() {
        let span = create_text_span(&doc(), "Buy ").unwrap();
        assert_eq!(span.get_attribute("data-value").as_deref(), Some("Buy"));
        assert_eq!(span.text_content().as_deref(), Some("Buy "));
    }

    #[wasm_bindgen_test]
    fn test_split_moves_tail_markup_into_new_item() {
        let ul = list_of(&format!(
            r#"<ul class="checklist">{}</ul>"#,
            item_html("see <a href=\"x\">doc</a> now")
        ));
        let item = item_element_at(&ul, &ItemPath::root(0)).unwrap();

        let next = split_item_element(&doc(), &item, 4).unwrap();

        let first = item_text_span(&item).unwrap();
        let second = item_text_span(&next).unwrap();
        assert_eq!(first.inner_html(), "see ");
        assert_eq!(second.inner_html(), r#"<a href="x">doc</a> now"#);
        assert_eq!(second.get_attribute("data-value").as_deref(), Some("doc now"));
        assert_eq!(item.next_element_sibling().as_ref(), Some(&next));
    }

    #[wasm_bindgen_test]
    fn test_split_at_end_leaves_placeholder_in_new_item() {
        let ul = list_of(&format!(r#"<ul class="checklist">{}</ul>"#, item_html("<b>bold</b>")));
        let item = item_element_at(&ul, &ItemPath::root(0)).unwrap();

        let next = split_item_element(&doc(), &item, 4).unwrap();

        assert_eq!(item_text_span(&item).unwrap().inner_html(), "<b>bold</b>");
        assert_eq!(item_text_span(&next).unwrap().text_content().as_deref(), Some(PLACEHOLDER_STR));
    }

    #[wasm_bindgen_test]
    fn test_merge_keeps_markup_of_both_items() {
        let ul = list_of(&format!(
            r#"<ul class="checklist">{}{}</ul>"#,
            item_html("<b>A</b>"),
            item_html("<i>B</i>")
        ));
        let second = item_element_at(&ul, &ItemPath::root(1)).unwrap();

        let merged = merge_into_previous(&doc(), &second).unwrap();

        let span = item_text_span(&merged).unwrap();
        assert_eq!(span.inner_html(), "<b>A</b><i>B</i>");
        assert_eq!(span.get_attribute("data-value").as_deref(), Some("AB"));
        assert_eq!(direct_children_with_class(&ul, ITEM_CLASS).len(), 1);
    }

    #[wasm_bindgen_test]
    fn test_indent_and_outdent_move_existing_nodes() {
        let ul = list_of(&format!(
            r#"<ul class="checklist">{}{}</ul>"#,
            item_html("Y"),
            item_html("X <img src=\"a.png\">")
        ));
        let x = item_element_at(&ul, &ItemPath::root(1)).unwrap();

        indent_item_element(&doc(), &x).unwrap();
        assert_eq!(item_element_at(&ul, &ItemPath::new(vec![0, 0])).as_ref(), Some(&x));
        assert!(x.query_selector("img").unwrap().is_some());

        outdent_item_element(&x).unwrap();
        assert_eq!(item_element_at(&ul, &ItemPath::root(1)).as_ref(), Some(&x));
        let y = item_element_at(&ul, &ItemPath::root(0)).unwrap();
        assert!(direct_child_with_class(&y, CHECKLIST_CLASS).is_none());
    }

    #[wasm_bindgen_test]
    fn test_remove_hands_children_to_previous_root_item() {
        let d = doc();
        let tree = Checklist::new(vec![
            ChecklistItem::new(false, "A"),
            ChecklistItem::new(false, "").with_children(vec![ChecklistItem::new(false, "B1")]),
        ]);
        let ul = render_checklist(&d, &tree).unwrap();
        let b = item_element_at(&ul, &ItemPath::root(1)).unwrap();

        remove_item_element(&d, &b).unwrap();

        let mut expected = tree.clone();
        expected.backspace_at_start(&ItemPath::root(1));
        assert_eq!(read_checklist(&ul), expected);
    }
}
