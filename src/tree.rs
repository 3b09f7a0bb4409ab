//! Tree view: a linear, indented listing of a page's instances.
//!
//! The tree walks the same child index the canvas does and keeps its own
//! expand/collapse state. Unlike the canvas it lists instances of unknown
//! type too, so they stay reachable for selection and deletion.

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use std::collections::HashSet;

use serde::Serialize;

use crate::consts::TREE_INDENT;
use crate::doc::{DocStore, InstanceId, PageId};
use crate::registry::ComponentKind;

/// One visible row of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub id: InstanceId,
    /// 0 for roots.
    pub depth: usize,
    /// Leading columns of indentation.
    pub indent: usize,
    /// Palette label, or the raw type name for unknown types.
    pub label: String,
    /// Resolved kind; `None` for unknown types.
    pub kind: Option<ComponentKind>,
    pub is_container: bool,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
}

/// Tree view state.
#[derive(Debug, Clone)]
pub struct TreeView {
    collapsed: HashSet<InstanceId>,
    indent: usize,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new(TREE_INDENT)
    }
}

impl TreeView {
    /// A tree view indenting `indent` columns per level.
    #[must_use]
    pub fn new(indent: usize) -> Self {
        Self { collapsed: HashSet::new(), indent }
    }

    /// Flip a node's expand state. Returns true if it is now expanded.
    pub fn toggle(&mut self, id: InstanceId) -> bool {
        if self.collapsed.remove(&id) {
            true
        } else {
            self.collapsed.insert(id);
            false
        }
    }

    #[must_use]
    pub fn is_expanded(&self, id: &InstanceId) -> bool {
        !self.collapsed.contains(id)
    }

    /// Drop view state for instances that no longer exist.
    pub fn forget(&mut self, ids: &[InstanceId]) {
        for id in ids {
            self.collapsed.remove(id);
        }
    }

    /// Visible rows, depth-first, skipping the subtrees of collapsed nodes.
    #[must_use]
    pub fn rows(&self, doc: &DocStore, page_id: &PageId, selected: Option<InstanceId>) -> Vec<TreeRow> {
        let Some(page) = doc.page(page_id) else {
            return Vec::new();
        };
        let registry = doc.registry();
        let mut rows = Vec::with_capacity(page.len());
        let mut stack: Vec<(usize, InstanceId)> = page.child_ids(None).iter().rev().map(|id| (0, *id)).collect();

        while let Some((depth, id)) = stack.pop() {
            let Some(inst) = page.get(&id) else {
                continue;
            };
            let def = registry.lookup(&inst.component_type);
            let children = page.child_ids(Some(id));
            let expanded = self.is_expanded(&id);
            rows.push(TreeRow {
                id,
                depth,
                indent: depth * self.indent,
                label: def.map_or_else(|| inst.component_type.clone(), |d| d.label.clone()),
                kind: def.map(|d| d.kind),
                is_container: def.is_some_and(|d| d.is_container()),
                has_children: !children.is_empty(),
                expanded,
                selected: selected == Some(id),
            });
            if expanded {
                stack.extend(children.iter().rev().map(|c| (depth + 1, *c)));
            }
        }
        rows
    }
}

/// Plain-text rendering of tree rows.
#[must_use]
pub fn format_rows(rows: &[TreeRow]) -> String {
    rows.iter()
        .map(|row| {
            let toggle = match (row.has_children, row.expanded) {
                (false, _) => " ",
                (true, true) => "▾",
                (true, false) => "▸",
            };
            let unknown = if row.kind.is_none() { " (unknown)" } else { "" };
            let selected = if row.selected { " *" } else { "" };
            format!("{}{toggle} {}{unknown}{selected}\n", " ".repeat(row.indent), row.label)
        })
        .collect()
}
