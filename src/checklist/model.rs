//! Tree model of a checklist and the editing transitions that run on it.
//!
//! Handlers read the live checklist into a [`Checklist`], apply one transition,
//! and write the tree back. Every transition here is pure so it can be tested
//! without a browser.

use super::text::{is_blank, split_at_utf16, utf16_len};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecklistItem {
    pub checked: bool,
    /// Item text with placeholders already removed.
    pub text: String,
    /// Indented sub-list. Never `Some` with zero items after a transition.
    pub children: Option<Checklist>,
}

impl ChecklistItem {
    pub fn new(checked: bool, text: impl Into<String>) -> Self {
        Self {
            checked,
            text: text.into(),
            children: None,
        }
    }

    pub fn with_children(mut self, items: Vec<ChecklistItem>) -> Self {
        self.children = if items.is_empty() {
            None
        } else {
            Some(Checklist { items })
        };
        self
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.text)
    }

    fn append_children(&mut self, items: Vec<ChecklistItem>) {
        if items.is_empty() {
            return;
        }
        self.children
            .get_or_insert_with(Checklist::default)
            .items
            .extend(items);
    }
}

/// Position of an item: one index per list level, outermost first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemPath(Vec<usize>);

impl ItemPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn index(&self) -> usize {
        self.0.last().copied().unwrap_or_default()
    }

    /// 1 for items of the root list, 2 for items of a nested list.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn parent(&self) -> Option<ItemPath> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn sibling(&self, index: usize) -> ItemPath {
        let mut v = self.0.clone();
        match v.last_mut() {
            Some(last) => *last = index,
            None => v.push(index),
        }
        Self(v)
    }

    pub fn child(&self, index: usize) -> ItemPath {
        let mut v = self.0.clone();
        v.push(index);
        Self(v)
    }

    fn list_indices(&self) -> &[usize] {
        &self.0[..self.0.len().saturating_sub(1)]
    }
}

/// Caret inside an item's text, in UTF-16 code units of the clean text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caret {
    pub path: ItemPath,
    pub offset: u32,
}

impl Caret {
    pub fn new(path: ItemPath, offset: u32) -> Self {
        Self { path, offset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaretTarget {
    Edge(ItemPath, Edge),
    Offset(ItemPath, u32),
}

impl CaretTarget {
    pub fn path(&self) -> &ItemPath {
        match self {
            CaretTarget::Edge(p, _) | CaretTarget::Offset(p, _) => p,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Nothing matched; the browser's default action should run.
    Unchanged,
    /// Nothing changed but the key must not reach the browser.
    Consumed,
    /// The tree changed; put the caret at the target.
    Changed(CaretTarget),
    /// The item was removed and editing leaves the checklist. An empty tree
    /// means the whole checklist goes away.
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Nav {
    Item(CaretTarget),
    /// No item in that direction; move to the element next to the list, if any.
    LeaveList,
    Stay,
}

impl Checklist {
    pub fn new(items: Vec<ChecklistItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn list(&self, list_path: &[usize]) -> Option<&Checklist> {
        let mut list = self;
        for &i in list_path {
            list = list.items.get(i)?.children.as_ref()?;
        }
        Some(list)
    }

    fn list_mut(&mut self, list_path: &[usize]) -> Option<&mut Checklist> {
        let mut list = self;
        for &i in list_path {
            list = list.items.get_mut(i)?.children.as_mut()?;
        }
        Some(list)
    }

    pub fn item(&self, path: &ItemPath) -> Option<&ChecklistItem> {
        self.list(path.list_indices())?.items.get(path.index())
    }

    pub fn item_mut(&mut self, path: &ItemPath) -> Option<&mut ChecklistItem> {
        self.list_mut(path.list_indices())?
            .items
            .get_mut(path.index())
    }

    fn siblings_len(&self, path: &ItemPath) -> usize {
        self.list(path.list_indices()).map_or(0, |l| l.items.len())
    }

    /// All item paths in document order.
    pub fn paths(&self) -> Vec<ItemPath> {
        fn walk(list: &Checklist, prefix: &[usize], out: &mut Vec<ItemPath>) {
            for (i, item) in list.items.iter().enumerate() {
                let mut p = prefix.to_vec();
                p.push(i);
                out.push(ItemPath::new(p.clone()));
                if let Some(children) = &item.children {
                    walk(children, &p, out);
                }
            }
        }
        let mut out = vec![];
        walk(self, &[], &mut out);
        out
    }

    /// Enter. An empty item exits the checklist; otherwise the text is split at
    /// the caret and the tail moves into a new unchecked item right after it.
    pub fn split(&mut self, caret: &Caret) -> Edit {
        let Some(item) = self.item(&caret.path) else {
            return Edit::Unchanged;
        };
        if item.is_empty() {
            return self.exit(&caret.path);
        }

        let (before, after) = split_at_utf16(&item.text, caret.offset);
        let next = caret.path.sibling(caret.path.index() + 1);

        let Some(list) = self.list_mut(caret.path.list_indices()) else {
            return Edit::Unchanged;
        };
        list.items[caret.path.index()].text = before;
        list.items.insert(next.index(), ChecklistItem::new(false, after));

        Edit::Changed(CaretTarget::Edge(next, Edge::Start))
    }

    /// Remove the item and leave the checklist.
    pub fn exit(&mut self, path: &ItemPath) -> Edit {
        if self.remove_item(path).is_none() {
            return Edit::Unchanged;
        }
        Edit::Exit
    }

    /// Backspace with the caret at offset 0 of the item's text.
    pub fn backspace_at_start(&mut self, path: &ItemPath) -> Edit {
        let Some(item) = self.item(path) else {
            return Edit::Unchanged;
        };
        let idx = path.index();

        if item.is_empty() {
            if self.siblings_len(path) == 1 {
                return self.exit(path);
            }
            self.remove_item(path);
            let target = if idx > 0 {
                CaretTarget::Edge(path.sibling(idx - 1), Edge::End)
            } else {
                CaretTarget::Edge(path.clone(), Edge::Start)
            };
            return Edit::Changed(target);
        }

        if idx == 0 {
            return Edit::Consumed;
        }

        let Some(list) = self.list_mut(path.list_indices()) else {
            return Edit::Unchanged;
        };
        let current = list.items.remove(idx);
        let prev = &mut list.items[idx - 1];
        let junction = utf16_len(&prev.text);
        prev.text.push_str(&current.text);
        if let Some(children) = current.children {
            prev.append_children(children.items);
        }

        Edit::Changed(CaretTarget::Offset(path.sibling(idx - 1), junction))
    }

    /// Tab. Moves a root item under its previous sibling. Nesting stops at one
    /// level, so items of a nested list and the first item stay put.
    pub fn indent(&mut self, path: &ItemPath) -> Edit {
        if self.item(path).is_none() {
            return Edit::Unchanged;
        }
        let idx = path.index();
        if path.depth() != 1 || idx == 0 {
            return Edit::Consumed;
        }

        let mut item = self.items.remove(idx);
        // The moved item's own sub-items become its siblings in the nested list.
        let grandchildren = item.children.take();

        let nested = self.items[idx - 1]
            .children
            .get_or_insert_with(Checklist::default);
        nested.items.push(item);
        let new_index = nested.items.len() - 1;
        if let Some(gc) = grandchildren {
            nested.items.extend(gc.items);
        }

        Edit::Changed(CaretTarget::Edge(
            ItemPath::root(idx - 1).child(new_index),
            Edge::End,
        ))
    }

    /// Shift+Tab. Moves a nested item right after its parent item.
    pub fn outdent(&mut self, path: &ItemPath) -> Edit {
        if self.item(path).is_none() {
            return Edit::Unchanged;
        }
        let Some(parent) = path.parent() else {
            return Edit::Consumed;
        };

        let Some(parent_item) = self.item_mut(&parent) else {
            return Edit::Unchanged;
        };
        let Some(nested) = parent_item.children.as_mut() else {
            return Edit::Unchanged;
        };
        let item = nested.items.remove(path.index());
        if nested.items.is_empty() {
            parent_item.children = None;
        }

        let target = parent.sibling(parent.index() + 1);
        let Some(list) = self.list_mut(parent.list_indices()) else {
            return Edit::Unchanged;
        };
        list.items.insert(target.index(), item);

        Edit::Changed(CaretTarget::Edge(target, Edge::End))
    }

    /// Arrow navigation from the boundary of the item's text.
    pub fn navigate(&self, path: &ItemPath, dir: Direction) -> Nav {
        let len = self.siblings_len(path);
        let idx = path.index();
        if idx >= len {
            return Nav::Stay;
        }

        match dir {
            Direction::Up if idx > 0 => {
                Nav::Item(CaretTarget::Edge(path.sibling(idx - 1), Edge::End))
            }
            Direction::Up => match path.parent() {
                Some(parent) => Nav::Item(CaretTarget::Edge(parent, Edge::End)),
                None => Nav::LeaveList,
            },
            Direction::Down if idx + 1 < len => {
                Nav::Item(CaretTarget::Edge(path.sibling(idx + 1), Edge::Start))
            }
            Direction::Down => Nav::LeaveList,
        }
    }

    fn remove_item(&mut self, path: &ItemPath) -> Option<ChecklistItem> {
        let idx = path.index();
        let list = self.list_mut(path.list_indices())?;
        if idx >= list.items.len() {
            return None;
        }

        let mut removed = list.items.remove(idx);
        if let Some(children) = removed.children.take() {
            if path.depth() == 1 && idx > 0 {
                list.items[idx - 1].append_children(children.items);
            } else {
                for (k, child) in children.items.into_iter().enumerate() {
                    list.items.insert(idx + k, child);
                }
            }
        }

        if let Some(parent) = path.parent() {
            if let Some(p) = self.item_mut(&parent) {
                if p.children.as_ref().is_some_and(|c| c.items.is_empty()) {
                    p.children = None;
                }
            }
        }

        Some(removed)
    }
}
