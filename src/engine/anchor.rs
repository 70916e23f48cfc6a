//! 锚点解析：为容器中的逻辑位置找到物理插入点
//!
//! 规则：
//! - 逻辑上的后继视图若渲染出节点，就插在它的第一个物理节点之前；
//! - 空视图、空容器、空投影槽不贡献锚点，继续向后查找；
//! - 列表结束时向外冒泡：所属视图的下一个根节点、所属容器的下一个视图……
//!   直到找到具体节点、父元素末尾，或宿主容器的结束位置。

use super::container::ContainerHost;
use super::{ContainerId, EngineError, Result, ViewEngine, ViewId, ViewNode, ViewOwner};
use crate::models::NodeId;

/// Splice point: insert before `before`, or append to `parent` when `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub parent: NodeId,
    pub before: Option<NodeId>,
}

impl ViewEngine {
    /// Physical splice point for a view inserted at logical `index` of
    /// `container`. `None` when the container is not rendered yet (it lives in
    /// a view that is not attached anywhere); its nodes are spliced together
    /// with that view later.
    pub fn resolve_anchor(&self, container: ContainerId, index: usize) -> Result<Option<Anchor>> {
        self.anchor_at(container, index, 0)
    }

    /// Walks from `container` out to its rendering root without touching any
    /// node, failing where `resolve_anchor` would on depth or a missing owner.
    pub(crate) fn check_resolvable(&self, container: ContainerId) -> Result<()> {
        let mut current = container;
        let mut depth = 0;
        loop {
            let c = self
                .containers
                .get(current)
                .ok_or(EngineError::UnknownContainer)?;
            let mut view = match &c.host {
                ContainerHost::Marker(_) => return Ok(()),
                ContainerHost::View { view, .. } => *view,
            };
            loop {
                let owner = self
                    .views
                    .get(view)
                    .map(|v| v.owner)
                    .ok_or(EngineError::AnchorResolution("host view is gone"))?;
                match owner {
                    ViewOwner::Detached | ViewOwner::Host { .. } => return Ok(()),
                    ViewOwner::Container(next) => {
                        depth += 1;
                        self.check_depth(depth)?;
                        current = next;
                        break;
                    }
                    ViewOwner::Slot(slot) => {
                        depth += 1;
                        self.check_depth(depth)?;
                        view = self
                            .slots
                            .get(slot)
                            .ok_or(EngineError::AnchorResolution("projection slot is gone"))?
                            .host;
                    }
                }
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_nesting_depth {
            return Err(EngineError::AnchorResolution("nesting depth exceeded"));
        }
        Ok(())
    }

    /// `depth` counts the views walked out of, one per nesting level.
    fn anchor_at(&self, container: ContainerId, index: usize, depth: usize) -> Result<Option<Anchor>> {
        self.check_depth(depth)?;
        let c = self
            .containers
            .get(container)
            .ok_or(EngineError::UnknownContainer)?;

        let following = c.views.get(index..).unwrap_or(&[]);
        if let Some(node) = following.iter().find_map(|&v| self.first_node_of_view(v)) {
            return Ok(self.anchor_before(node));
        }

        match &c.host {
            ContainerHost::Marker(marker) => {
                let parent = self
                    .tree
                    .parent_of(*marker)
                    .ok_or(EngineError::AnchorResolution("container marker is not attached"))?;
                let end = c
                    .views
                    .iter()
                    .rev()
                    .find_map(|&v| self.last_node_of_view(v))
                    .unwrap_or(*marker);
                Ok(Some(Anchor {
                    parent,
                    before: self.tree.next_sibling(end),
                }))
            }
            ContainerHost::View { view, path } => self.anchor_after_path(*view, path, depth),
        }
    }

    /// Splice point right after the item at `path` inside `view`.
    fn anchor_after_path(&self, view: ViewId, path: &[usize], depth: usize) -> Result<Option<Anchor>> {
        let instance = self
            .views
            .get(view)
            .ok_or(EngineError::AnchorResolution("host view is gone"))?;

        for level in (0..path.len()).rev() {
            let (siblings, element) = list_at(&instance.roots, &path[..level])
                .ok_or(EngineError::AnchorResolution("path does not match view roots"))?;
            let after = siblings.get(path[level] + 1..).unwrap_or(&[]);
            if let Some(node) = after.iter().find_map(|n| self.first_node(n)) {
                return Ok(self.anchor_before(node));
            }
            if let Some(element) = element {
                return Ok(Some(Anchor {
                    parent: element,
                    before: None,
                }));
            }
        }

        self.anchor_after_view(view, depth)
    }

    /// Splice point right after the whole of `view`.
    fn anchor_after_view(&self, view: ViewId, depth: usize) -> Result<Option<Anchor>> {
        let owner = self
            .views
            .get(view)
            .map(|v| v.owner)
            .ok_or(EngineError::AnchorResolution("host view is gone"))?;

        match owner {
            ViewOwner::Detached => Ok(None),
            ViewOwner::Container(container) => {
                let index = self
                    .index_of(container, view)
                    .ok_or(EngineError::AnchorResolution("view missing from its container"))?;
                self.anchor_at(container, index + 1, depth + 1)
            }
            ViewOwner::Slot(slot) => {
                self.check_depth(depth + 1)?;
                let s = self
                    .slots
                    .get(slot)
                    .ok_or(EngineError::AnchorResolution("projection slot is gone"))?;
                self.anchor_after_path(s.host, &s.path, depth + 1)
            }
            ViewOwner::Host { parent, marker } => Ok(Some(Anchor {
                parent,
                before: Some(marker),
            })),
        }
    }

    fn anchor_before(&self, node: NodeId) -> Option<Anchor> {
        self.tree.parent_of(node).map(|parent| Anchor {
            parent,
            before: Some(node),
        })
    }

    /// First physical node rendered by `node`, skipping empty content.
    pub(crate) fn first_node(&self, node: &ViewNode) -> Option<NodeId> {
        match node {
            ViewNode::Node(id) | ViewNode::Element { node: id, .. } => Some(*id),
            ViewNode::Group(children) => children.iter().find_map(|c| self.first_node(c)),
            ViewNode::Container(container) => self
                .containers
                .get(*container)?
                .views
                .iter()
                .find_map(|&v| self.first_node_of_view(v)),
            ViewNode::Slot(slot) => self
                .slots
                .get(*slot)?
                .content
                .and_then(|v| self.first_node_of_view(v)),
        }
    }

    pub(crate) fn last_node(&self, node: &ViewNode) -> Option<NodeId> {
        match node {
            ViewNode::Node(id) | ViewNode::Element { node: id, .. } => Some(*id),
            ViewNode::Group(children) => children.iter().rev().find_map(|c| self.last_node(c)),
            ViewNode::Container(container) => self
                .containers
                .get(*container)?
                .views
                .iter()
                .rev()
                .find_map(|&v| self.last_node_of_view(v)),
            ViewNode::Slot(slot) => self
                .slots
                .get(*slot)?
                .content
                .and_then(|v| self.last_node_of_view(v)),
        }
    }

    pub fn first_node_of_view(&self, view: ViewId) -> Option<NodeId> {
        self.views
            .get(view)?
            .roots
            .iter()
            .find_map(|r| self.first_node(r))
    }

    pub fn last_node_of_view(&self, view: ViewId) -> Option<NodeId> {
        self.views
            .get(view)?
            .roots
            .iter()
            .rev()
            .find_map(|r| self.last_node(r))
    }
}

/// The sibling list addressed by `prefix`, plus the element that physically
/// parents it (`None` for view roots and transparent groups).
fn list_at<'a>(roots: &'a [ViewNode], prefix: &[usize]) -> Option<(&'a [ViewNode], Option<NodeId>)> {
    let mut list = roots;
    let mut element = None;
    for &i in prefix {
        match list.get(i)? {
            ViewNode::Group(children) => {
                list = children;
                element = None;
            }
            ViewNode::Element { node, children } => {
                list = children;
                element = Some(*node);
            }
            ViewNode::Node(_) | ViewNode::Container(_) | ViewNode::Slot(_) => return None,
        }
    }
    Some((list, element))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/anchor.rs"]
mod tests;
