//! 渲染树数据模型
//!
//! 物理节点池：元素、文本、注释。视图引擎只通过 `insert_before` / `remove` /
//! `parent_of` 等操作修改它。

use compact_str::CompactString;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! { pub struct NodeId; }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(CompactString),
    Text(CompactString),
    Comment(CompactString),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTreeError {
    InvalidNodeId,
    ParentNotElement,
    NotAChild,
    MoveIntoDescendant,
    NotText,
}

impl fmt::Display for RenderTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderTreeError::InvalidNodeId => write!(f, "invalid node id"),
            RenderTreeError::ParentNotElement => write!(f, "parent is not an element"),
            RenderTreeError::NotAChild => write!(f, "reference node is not a child of parent"),
            RenderTreeError::MoveIntoDescendant => {
                write!(f, "cannot insert node into its own subtree")
            }
            RenderTreeError::NotText => write!(f, "node is not a text or comment node"),
        }
    }
}

impl std::error::Error for RenderTreeError {}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

pub struct RenderTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl RenderTree {
    pub fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new(NodeKind::Element("#root".into())));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn create_element(&mut self, tag: impl Into<CompactString>) -> NodeId {
        self.arena.insert(Node::new(NodeKind::Element(tag.into())))
    }

    pub fn create_text(&mut self, text: impl Into<CompactString>) -> NodeId {
        self.arena.insert(Node::new(NodeKind::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: impl Into<CompactString>) -> NodeId {
        self.arena.insert(Node::new(NodeKind::Comment(text.into())))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.arena.get(id).map(|n| &n.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<CompactString>) -> Result<(), RenderTreeError> {
        let node = self.arena.get_mut(id).ok_or(RenderTreeError::InvalidNodeId)?;
        match &mut node.kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => {
                *t = text.into();
                Ok(())
            }
            NodeKind::Element(_) => Err(RenderTreeError::NotText),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut descendant: NodeId) -> bool {
        while let Some(parent) = self.parent_of(descendant) {
            if parent == ancestor {
                return true;
            }
            descendant = parent;
        }
        false
    }

    /// Splices `node` into `parent` before `reference`, or appends it when
    /// `reference` is `None`. A node that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), RenderTreeError> {
        if !self.arena.contains_key(node) {
            return Err(RenderTreeError::InvalidNodeId);
        }
        let parent_ro = self.arena.get(parent).ok_or(RenderTreeError::InvalidNodeId)?;
        if !matches!(parent_ro.kind, NodeKind::Element(_)) {
            return Err(RenderTreeError::ParentNotElement);
        }
        if node == parent || self.is_ancestor(node, parent) {
            return Err(RenderTreeError::MoveIntoDescendant);
        }
        if let Some(reference) = reference {
            if self.parent_of(reference) != Some(parent) {
                return Err(RenderTreeError::NotAChild);
            }
        }

        // Inserting a node before itself leaves it where it is.
        let reference = match reference {
            Some(r) if r == node => self.next_sibling(node),
            other => other,
        };

        self.detach(node);

        let children = &mut self
            .arena
            .get_mut(parent)
            .ok_or(RenderTreeError::InvalidNodeId)?
            .children;
        let pos = match reference {
            Some(r) => children
                .iter()
                .position(|&c| c == r)
                .ok_or(RenderTreeError::NotAChild)?,
            None => children.len(),
        };
        children.insert(pos, node);

        self.arena
            .get_mut(node)
            .ok_or(RenderTreeError::InvalidNodeId)?
            .parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), RenderTreeError> {
        self.insert_before(parent, node, None)
    }

    /// Detaches `node` from its parent. The node and its subtree stay alive.
    pub fn remove(&mut self, node: NodeId) -> Result<(), RenderTreeError> {
        if !self.arena.contains_key(node) {
            return Err(RenderTreeError::InvalidNodeId);
        }
        self.detach(node);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.arena.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
    }

    /// Detaches `node` and frees it together with its whole subtree.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), RenderTreeError> {
        if node == self.root {
            return Err(RenderTreeError::InvalidNodeId);
        }
        if !self.arena.contains_key(node) {
            return Err(RenderTreeError::InvalidNodeId);
        }
        self.detach(node);

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.arena.remove(id) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Concatenated text of all text descendants, comments excluded.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Serializes the subtree as compact markup, e.g. `<div>a<!--c--></div>`.
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for &child in &node.children {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/render_tree.rs"]
mod tests;
