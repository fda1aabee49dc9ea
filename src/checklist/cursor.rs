use super::dom::{document, DomError, DomResult};
use super::text::{clean_text, clean_to_raw_utf16, strip_placeholders, utf16_len};
use web_sys::{Element, Node, Range, Selection};

pub(crate) fn current_selection() -> Option<Selection> {
    web_sys::window()?.get_selection().ok().flatten()
}

pub(crate) fn current_range() -> Option<Range> {
    let sel = current_selection()?;
    if sel.range_count() == 0 {
        return None;
    }
    sel.get_range_at(0).ok()
}

fn select(range: &Range) -> DomResult<()> {
    let sel = current_selection().ok_or_else(|| DomError::missing("selection"))?;
    sel.remove_all_ranges()?;
    sel.add_range(range)?;
    Ok(())
}

/// Collapse the selection to the start or end of `el`'s first text node, or to
/// the boundary of its contents when it has none.
pub(crate) fn set_cursor_in_element(el: &Element, at_end: bool) -> DomResult<()> {
    let range = document()?.create_range()?;

    match el.first_child() {
        Some(first) if first.node_type() == Node::TEXT_NODE => {
            let offset = if at_end {
                first.text_content().map(|t| utf16_len(&t)).unwrap_or(0)
            } else {
                0
            };
            range.set_start(&first, offset)?;
            range.collapse_with_to_start(true);
        }
        _ => {
            range.select_node_contents(el)?;
            range.collapse_with_to_start(!at_end);
        }
    }

    select(&range)
}

fn collect_text_nodes(node: &Node, out: &mut Vec<Node>) {
    let children = node.child_nodes();
    for i in 0..children.length() {
        let Some(child) = children.item(i) else {
            continue;
        };
        if child.node_type() == Node::TEXT_NODE {
            out.push(child);
        } else {
            collect_text_nodes(&child, out);
        }
    }
}

/// Text node and raw offset under `el` for a placeholder-free UTF-16 offset,
/// clamped to the end of the last text node. `None` when `el` holds no text.
pub(crate) fn clean_position(el: &Element, offset: u32) -> Option<(Node, u32)> {
    let mut nodes = vec![];
    collect_text_nodes(el, &mut nodes);

    let mut remaining = offset;
    let mut last = None;
    for node in nodes {
        let raw = node.text_content().unwrap_or_default();
        match clean_to_raw_utf16(&raw, remaining) {
            Ok(pos) => return Some((node, pos)),
            Err(seen) => {
                remaining -= seen;
                last = Some((node, utf16_len(&raw)));
            }
        }
    }
    last
}

/// Collapse the selection at a placeholder-free UTF-16 offset inside `el`,
/// descending into inline markup. Clamped to the text length.
pub(crate) fn set_cursor_at_offset(el: &Element, offset: u32) -> DomResult<()> {
    let Some((node, pos)) = clean_position(el, offset) else {
        return set_cursor_in_element(el, offset > 0);
    };

    let range = document()?.create_range()?;
    range.set_start(&node, pos)?;
    range.collapse_with_to_start(true);
    select(&range)
}

pub(crate) fn is_cursor_at_start(el: &Element) -> bool {
    let Some(range) = current_range() else {
        return false;
    };
    if !range.collapsed() || range.start_offset().ok() != Some(0) {
        return false;
    }
    let Ok(container) = range.start_container() else {
        return false;
    };

    let el_node: &Node = el;
    if &container == el_node {
        return true;
    }
    container.parent_node().as_ref() == Some(el_node) && el.first_child().as_ref() == Some(&container)
}

pub(crate) fn get_clean_text(el: &Element) -> String {
    clean_text(&el.text_content().unwrap_or_default())
}

/// Caret position inside `span`, in UTF-16 units of its placeholder-free text.
pub(crate) fn caret_offset_in(span: &Element) -> Option<u32> {
    let range = current_range()?;
    let before = document().ok()?.create_range().ok()?;
    before.select_node_contents(span).ok()?;
    before
        .set_end(&range.start_container().ok()?, range.start_offset().ok()?)
        .ok()?;
    let raw: String = before.to_string().into();
    Some(utf16_len(&strip_placeholders(&raw)))
}
