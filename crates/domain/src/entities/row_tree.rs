//! Ordered row hierarchy with open/closed visibility
//!
//! Rows live in an arena keyed by [`RowId`]; parents and children refer to
//! each other by id, so the tree can be cloned and serialized without
//! reference cycles. Alongside the structure the tree maintains a flattened
//! "visible" list: every root plus the descendants of open rows, in display
//! order. Closing a row hides its descendants without destroying them.
//!
//! # Invariants
//!
//! - Every row has at most one parent and appears exactly once in either
//!   `roots` or its parent's child list.
//! - Only rows whose item reports `can_have_children()` own children.
//! - `move_row` refuses moves that would make a row its own ancestor.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::ids::RowId;

/// Content stored in a [`RowTree`].
pub trait TreeItem {
    fn row_id(&self) -> RowId;

    /// Containers may own children; leaves may not.
    fn can_have_children(&self) -> bool;

    /// Content comparison that ignores identity and provenance.
    fn is_equivalent_to(&self, other: &Self) -> bool;
}

fn default_open() -> bool {
    true
}

/// A row together with its owned subtree, outside of any tree.
///
/// This is also the serialized form of a tree: a list of nested rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct DetachedRow<T> {
    pub row: T,
    #[serde(default = "default_open")]
    pub open: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DetachedRow<T>>,
}

impl<T: TreeItem> DetachedRow<T> {
    pub fn new(row: T) -> Self {
        Self {
            row,
            open: true,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: DetachedRow<T>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn id(&self) -> RowId {
        self.row.row_id()
    }

    /// Compares content and children by position, ignoring identity.
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.row.is_equivalent_to(&other.row)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.is_equivalent_to(b))
    }

    fn collect_ids(&self, ids: &mut Vec<RowId>) -> Result<(), DomainError> {
        if !self.children.is_empty() && !self.row.can_have_children() {
            return Err(DomainError::constraint(format!(
                "Row {} cannot have children",
                self.id()
            )));
        }
        ids.push(self.id());
        for child in &self.children {
            child.collect_ids(ids)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node<T> {
    item: T,
    parent: Option<RowId>,
    children: Vec<RowId>,
    open: bool,
}

/// Arena-backed ordered tree of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTree<T> {
    nodes: HashMap<RowId, Node<T>>,
    roots: Vec<RowId>,
    visible: Vec<RowId>,
}

impl<T> Default for RowTree<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            visible: Vec::new(),
        }
    }
}

impl<T: TreeItem> RowTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from nested rows, showing the children of open rows.
    pub fn from_detached(rows: Vec<DetachedRow<T>>) -> Result<Self, DomainError> {
        let mut tree = Self::new();
        for row in rows {
            let index = tree.roots.len();
            tree.insert(None, index, row, true)?;
        }
        Ok(tree)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: RowId) -> Option<&T> {
        self.nodes.get(&id).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut T> {
        self.nodes.get_mut(&id).map(|node| &mut node.item)
    }

    pub fn parent(&self, id: RowId) -> Option<RowId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Direct children in order; empty for leaves and unknown ids.
    pub fn children(&self, id: RowId) -> &[RowId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    pub fn is_open(&self, id: RowId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.open)
    }

    /// The flattened display order: roots and the descendants of open rows.
    pub fn flatten(&self) -> &[RowId] {
        &self.visible
    }

    /// Ancestors from the nearest parent up to the root.
    pub fn ancestors(&self, id: RowId) -> Vec<RowId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    pub fn is_descendant_of(&self, id: RowId, ancestor: RowId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// All descendants in pre-order, regardless of open state.
    pub fn descendants(&self, id: RowId) -> Vec<RowId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    /// Every row in pre-order, regardless of open state.
    pub fn depth_first(&self) -> Vec<RowId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            result.push(*root);
            self.collect_descendants(*root, &mut result);
        }
        result
    }

    /// Items in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.depth_first()
            .into_iter()
            .filter_map(move |id| self.get(id))
    }

    fn collect_descendants(&self, id: RowId, out: &mut Vec<RowId>) {
        for child in self.children(id) {
            out.push(*child);
            self.collect_descendants(*child, out);
        }
    }

    fn collect_visible_descendants(&self, id: RowId, out: &mut Vec<RowId>) {
        if !self.is_open(id) {
            return;
        }
        for child in self.children(id) {
            out.push(*child);
            self.collect_visible_descendants(*child, out);
        }
    }

    /// The row plus its contiguous visible descendants in the flattened view.
    fn visible_span(&self, id: RowId) -> Option<Range<usize>> {
        let start = self.visible.iter().position(|v| *v == id)?;
        let mut end = start + 1;
        while end < self.visible.len() && self.is_descendant_of(self.visible[end], id) {
            end += 1;
        }
        Some(start..end)
    }

    fn shows_children_of(&self, parent: Option<RowId>) -> bool {
        match parent {
            None => true,
            Some(parent) => self.is_open(parent) && self.visible.contains(&parent),
        }
    }

    /// Where a newly attached row belongs in the flattened view: after the
    /// visible span of its nearest visible previous sibling, or directly
    /// after its parent.
    fn visible_insert_position(&self, parent: Option<RowId>, id: RowId) -> usize {
        let siblings = match parent {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        let index = siblings.iter().position(|s| *s == id).unwrap_or(0);
        for sibling in siblings[..index].iter().rev() {
            if let Some(span) = self.visible_span(*sibling) {
                return span.end;
            }
        }
        match parent.and_then(|p| self.visible.iter().position(|v| *v == p)) {
            Some(position) => position + 1,
            None => 0,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts a detached subtree as child `index` of `parent` (or as a root).
    ///
    /// The row is added to the flattened view when its parent is shown; with
    /// `include_children` its visible descendants are added as well,
    /// otherwise only the row itself is shown.
    pub fn insert(
        &mut self,
        parent: Option<RowId>,
        index: usize,
        row: DetachedRow<T>,
        include_children: bool,
    ) -> Result<RowId, DomainError> {
        if let Some(parent_id) = parent {
            let node = self
                .nodes
                .get(&parent_id)
                .ok_or_else(|| DomainError::not_found("Row", parent_id.to_string()))?;
            if !node.item.can_have_children() {
                return Err(DomainError::constraint(format!(
                    "Row {} cannot have children",
                    parent_id
                )));
            }
        }

        let mut ids = Vec::new();
        row.collect_ids(&mut ids)?;
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(*id) || self.nodes.contains_key(id) {
                return Err(DomainError::constraint(format!("Duplicate row id {}", id)));
            }
        }

        let id = row.id();
        let siblings = match parent {
            Some(parent_id) => match self.nodes.get_mut(&parent_id) {
                Some(node) => &mut node.children,
                None => return Err(DomainError::not_found("Row", parent_id.to_string())),
            },
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        self.attach(parent, row);

        if self.shows_children_of(parent) {
            let position = self.visible_insert_position(parent, id);
            let mut shown = vec![id];
            if include_children {
                self.collect_visible_descendants(id, &mut shown);
            }
            self.visible.splice(position..position, shown);
        }
        Ok(id)
    }

    fn attach(&mut self, parent: Option<RowId>, row: DetachedRow<T>) {
        let id = row.id();
        let child_ids = row.children.iter().map(|c| c.id()).collect();
        self.nodes.insert(
            id,
            Node {
                item: row.row,
                parent,
                children: child_ids,
                open: row.open,
            },
        );
        for child in row.children {
            self.attach(Some(id), child);
        }
    }

    /// Removes rows and their subtrees, returning them detached in the order
    /// given. Ids that are unknown, or already removed along with an
    /// ancestor, are skipped.
    pub fn remove(&mut self, ids: &[RowId]) -> Vec<DetachedRow<T>> {
        let mut removed = Vec::new();
        for id in ids {
            let Some(parent) = self.nodes.get(id).map(|node| node.parent) else {
                continue;
            };
            if let Some(span) = self.visible_span(*id) {
                self.visible.drain(span);
            }
            match parent.and_then(|p| self.nodes.get_mut(&p)) {
                Some(node) => node.children.retain(|c| c != id),
                None => self.roots.retain(|r| r != id),
            }
            if let Some(subtree) = self.take_subtree(*id) {
                removed.push(subtree);
            }
        }
        let nodes = &self.nodes;
        self.visible.retain(|v| nodes.contains_key(v));
        removed
    }

    fn take_subtree(&mut self, id: RowId) -> Option<DetachedRow<T>> {
        let node = self.nodes.remove(&id)?;
        let children = node
            .children
            .iter()
            .filter_map(|child| self.take_subtree(*child))
            .collect();
        Some(DetachedRow {
            row: node.item,
            open: node.open,
            children,
        })
    }

    /// Flips the open state and returns the new state.
    pub fn toggle_open(&mut self, id: RowId) -> Result<bool, DomainError> {
        let open = !self.is_open(id);
        self.set_open(id, open)?;
        Ok(open)
    }

    /// Opens or closes a row, returning whether anything changed.
    pub fn set_open(&mut self, id: RowId, open: bool) -> Result<bool, DomainError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Row", id.to_string()))?;
        if node.open == open {
            return Ok(false);
        }
        node.open = open;

        if let Some(span) = self.visible_span(id) {
            if open {
                let mut shown = Vec::new();
                self.collect_visible_descendants(id, &mut shown);
                let at = span.start + 1;
                self.visible.splice(at..at, shown);
            } else {
                self.visible.drain(span.start + 1..span.end);
            }
        }
        Ok(true)
    }

    /// Moves a row (with its subtree) under `new_parent` at `index`.
    pub fn move_row(
        &mut self,
        id: RowId,
        new_parent: Option<RowId>,
        index: usize,
    ) -> Result<(), DomainError> {
        if !self.contains(id) {
            return Err(DomainError::not_found("Row", id.to_string()));
        }
        if let Some(parent) = new_parent {
            if parent == id || self.is_descendant_of(parent, id) {
                return Err(DomainError::constraint(format!(
                    "Row {} cannot be moved into itself or its descendants",
                    id
                )));
            }
            match self.get(parent) {
                None => return Err(DomainError::not_found("Row", parent.to_string())),
                Some(item) if !item.can_have_children() => {
                    return Err(DomainError::constraint(format!(
                        "Row {} cannot have children",
                        parent
                    )))
                }
                Some(_) => {}
            }
        }

        let row = self
            .remove(&[id])
            .pop()
            .ok_or_else(|| DomainError::not_found("Row", id.to_string()))?;
        self.insert(new_parent, index, row, true)?;
        Ok(())
    }

    // =========================================================================
    // Copies and comparison
    // =========================================================================

    /// Deep copy of a subtree, keeping ids.
    pub fn detach_clone(&self, id: RowId) -> Option<DetachedRow<T>>
    where
        T: Clone,
    {
        let node = self.nodes.get(&id)?;
        Some(DetachedRow {
            row: node.item.clone(),
            open: node.open,
            children: node
                .children
                .iter()
                .filter_map(|child| self.detach_clone(*child))
                .collect(),
        })
    }

    /// Deep copy of the whole tree as nested rows.
    pub fn to_detached(&self) -> Vec<DetachedRow<T>>
    where
        T: Clone,
    {
        self.roots
            .iter()
            .filter_map(|root| self.detach_clone(*root))
            .collect()
    }

    /// Structural equivalence of two subtrees, comparing children by position.
    pub fn subtree_equivalent(&self, id: RowId, other: &RowTree<T>, other_id: RowId) -> bool {
        let (Some(a), Some(b)) = (self.nodes.get(&id), other.nodes.get(&other_id)) else {
            return false;
        };
        a.item.is_equivalent_to(&b.item)
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| self.subtree_equivalent(*x, other, *y))
    }
}

// =============================================================================
// Serde: a tree is a list of nested rows
// =============================================================================

struct RowView<'a, T> {
    tree: &'a RowTree<T>,
    id: RowId,
}

struct ChildrenView<'a, T> {
    tree: &'a RowTree<T>,
    ids: &'a [RowId],
}

impl<T: TreeItem + Serialize> Serialize for RowView<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self
            .tree
            .nodes
            .get(&self.id)
            .ok_or_else(|| S::Error::custom(format!("missing row {}", self.id)))?;
        let has_children = !node.children.is_empty();
        let mut state =
            serializer.serialize_struct("DetachedRow", if has_children { 3 } else { 2 })?;
        state.serialize_field("row", &node.item)?;
        state.serialize_field("open", &node.open)?;
        if has_children {
            state.serialize_field(
                "children",
                &ChildrenView {
                    tree: self.tree,
                    ids: &node.children,
                },
            )?;
        } else {
            state.skip_field("children")?;
        }
        state.end()
    }
}

impl<T: TreeItem + Serialize> Serialize for ChildrenView<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ids.iter().map(|id| RowView {
            tree: self.tree,
            id: *id,
        }))
    }
}

impl<T: TreeItem + Serialize> Serialize for RowTree<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChildrenView {
            tree: self,
            ids: &self.roots,
        }
        .serialize(serializer)
    }
}

impl<'de, T: TreeItem + Deserialize<'de>> Deserialize<'de> for RowTree<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<DetachedRow<T>>::deserialize(deserializer)?;
        RowTree::from_detached(rows).map_err(D::Error::custom)
    }
}
