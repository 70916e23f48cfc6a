//! 视图容器：有序的视图列表及其插入、移动、删除操作

use serde_json::Value;
use std::sync::Arc;

use super::anchor::Anchor;
use super::{ContainerId, EngineError, Result, Template, ViewEngine, ViewId, ViewOwner};
use crate::models::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerHost {
    /// Host-level container: a comment marker placed in a parent element.
    /// Views render right after it.
    Marker(NodeId),
    /// Container declared inside a view; `path` indexes into the view's roots.
    View { view: ViewId, path: Vec<usize> },
}

#[derive(Debug, Clone)]
pub struct ViewContainer {
    pub(crate) host: ContainerHost,
    pub(crate) views: Vec<ViewId>,
    pub(crate) content: Option<ViewId>,
}

impl ViewContainer {
    pub fn host(&self) -> &ContainerHost {
        &self.host
    }

    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn marker(&self) -> Option<NodeId> {
        match self.host {
            ContainerHost::Marker(marker) => Some(marker),
            ContainerHost::View { .. } => None,
        }
    }
}

impl ViewEngine {
    /// Creates a host-level container whose marker is appended to `parent`.
    pub fn create_container(&mut self, parent: NodeId) -> Result<ContainerId> {
        let marker = self.tree.create_comment(self.config.marker_label.as_str());
        self.tree.append_child(parent, marker)?;
        let container = self.containers.insert(ViewContainer {
            host: ContainerHost::Marker(marker),
            views: Vec::new(),
            content: None,
        });
        tracing::debug!(?container, "create container");
        Ok(container)
    }

    pub fn view_container(&self, container: ContainerId) -> Option<&ViewContainer> {
        self.containers.get(container)
    }

    fn container_ref(&self, container: ContainerId) -> Result<&ViewContainer> {
        self.containers
            .get(container)
            .ok_or(EngineError::UnknownContainer)
    }

    pub fn len(&self, container: ContainerId) -> usize {
        self.containers.get(container).map_or(0, |c| c.views.len())
    }

    pub fn get(&self, container: ContainerId, index: usize) -> Option<ViewId> {
        self.containers.get(container)?.views.get(index).copied()
    }

    pub fn views(&self, container: ContainerId) -> &[ViewId] {
        self.containers
            .get(container)
            .map(|c| c.views.as_slice())
            .unwrap_or(&[])
    }

    /// Logical position of `view` in `container`.
    pub fn index_of(&self, container: ContainerId, view: ViewId) -> Option<usize> {
        self.containers
            .get(container)?
            .views
            .iter()
            .position(|&v| v == view)
    }

    /// Instantiates `template` and inserts the view at `index` (end by default).
    pub fn create_embedded_view(
        &mut self,
        container: ContainerId,
        template: &Arc<Template>,
        context: Value,
        index: Option<usize>,
    ) -> Result<ViewId> {
        let c = self.container_ref(container)?;
        let len = c.views.len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(EngineError::OutOfRange { index, len });
        }
        let content = c.content;
        self.check_resolvable(container)?;

        let view = self.instantiate_with_content(template, context, content)?;
        self.attach_at(container, view, index)?;
        tracing::debug!(?container, ?view, index, "create embedded view");
        Ok(view)
    }

    /// Moves an existing view to `index` of `container`, keeping its nodes.
    pub fn insert(
        &mut self,
        container: ContainerId,
        view: ViewId,
        index: Option<usize>,
    ) -> Result<()> {
        let owner = self.live_view(view)?.owner;
        if matches!(owner, ViewOwner::Slot(_)) {
            return Err(EngineError::NotOwned);
        }
        let c = self.container_ref(container)?;
        let len = if owner == ViewOwner::Container(container) {
            c.views.len() - 1
        } else {
            c.views.len()
        };
        let index = index.unwrap_or(len);
        if index > len {
            return Err(EngineError::OutOfRange { index, len });
        }
        if self.container_is_inside(container, view) {
            return Err(EngineError::CyclicInsertion);
        }
        self.check_resolvable(container)?;

        self.release(view)?;
        self.attach_at(container, view, index)?;
        tracing::debug!(?container, ?view, index, ?owner, "insert view");
        Ok(())
    }

    /// Removes the view at `index` (last by default) and destroys it.
    pub fn remove(&mut self, container: ContainerId, index: Option<usize>) -> Result<()> {
        let view = self.take_at(container, index)?;
        self.destroy_view(view)?;
        tracing::debug!(?container, ?view, "remove view");
        Ok(())
    }

    /// Removes the view at `index` (last by default) and keeps it alive for
    /// a later [`ViewEngine::insert`].
    pub fn detach(&mut self, container: ContainerId, index: Option<usize>) -> Result<ViewId> {
        let view = self.take_at(container, index)?;
        if let Some(instance) = self.views.get_mut(view) {
            instance.owner = ViewOwner::Detached;
        }
        tracing::debug!(?container, ?view, "detach view");
        Ok(view)
    }

    /// Destroys every view of `container`, last first.
    pub fn clear(&mut self, container: ContainerId) -> Result<()> {
        while !self.container_ref(container)?.views.is_empty() {
            self.remove(container, None)?;
        }
        Ok(())
    }

    fn take_at(&mut self, container: ContainerId, index: Option<usize>) -> Result<ViewId> {
        let len = self.container_ref(container)?.views.len();
        let index = match index {
            Some(index) => index,
            None if len > 0 => len - 1,
            None => return Err(EngineError::OutOfRange { index: 0, len }),
        };
        if index >= len {
            return Err(EngineError::OutOfRange { index, len });
        }

        let view = self.container_ref(container)?.views[index];
        self.detach_nodes(view)?;
        if let Some(c) = self.containers.get_mut(container) {
            c.views.remove(index);
        }
        Ok(view)
    }

    /// Takes `view` away from its current owner, logically and physically.
    fn release(&mut self, view: ViewId) -> Result<()> {
        let owner = self.live_view(view)?.owner;
        if matches!(owner, ViewOwner::Slot(_)) {
            return Err(EngineError::NotOwned);
        }
        self.detach_nodes(view)?;
        match owner {
            ViewOwner::Container(previous) => {
                if let Some(c) = self.containers.get_mut(previous) {
                    c.views.retain(|&v| v != view);
                }
            }
            ViewOwner::Host { marker, .. } => self.tree.destroy(marker)?,
            ViewOwner::Detached | ViewOwner::Slot(_) => {}
        }
        if let Some(instance) = self.views.get_mut(view) {
            instance.owner = ViewOwner::Detached;
        }
        Ok(())
    }

    /// Puts a detached view at `index` and splices its nodes.
    fn attach_at(&mut self, container: ContainerId, view: ViewId, index: usize) -> Result<()> {
        let anchor = self.resolve_anchor(container, index)?;

        let c = self
            .containers
            .get_mut(container)
            .ok_or(EngineError::UnknownContainer)?;
        c.views.insert(index, view);
        if let Some(instance) = self.views.get_mut(view) {
            instance.owner = ViewOwner::Container(container);
        }

        match anchor {
            Some(anchor) => self.splice(view, anchor),
            None => {
                tracing::trace!(?container, ?view, "container not rendered, splice deferred");
                Ok(())
            }
        }
    }

    fn splice(&mut self, view: ViewId, anchor: Anchor) -> Result<()> {
        let nodes = self.nodes_of(view);
        if self.config.trace_splices {
            tracing::trace!(
                ?view,
                parent = ?anchor.parent,
                before = ?anchor.before,
                nodes = nodes.len(),
                "splice"
            );
        }
        for node in nodes {
            self.tree.insert_before(anchor.parent, node, anchor.before)?;
        }
        Ok(())
    }

    /// Whether `container` is declared somewhere inside `view`, directly or
    /// through nested views and projected content.
    fn container_is_inside(&self, container: ContainerId, view: ViewId) -> bool {
        let mut current = container;
        loop {
            let Some(c) = self.containers.get(current) else {
                return false;
            };
            let host_view = match &c.host {
                ContainerHost::Marker(_) => return false,
                ContainerHost::View { view: host, .. } => *host,
            };
            let mut owner_view = host_view;
            loop {
                if owner_view == view {
                    return true;
                }
                match self.views.get(owner_view).map(|v| v.owner) {
                    Some(ViewOwner::Container(next)) => {
                        current = next;
                        break;
                    }
                    Some(ViewOwner::Slot(slot)) => match self.slots.get(slot) {
                        Some(s) => owner_view = s.host,
                        None => return false,
                    },
                    _ => return false,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/container.rs"]
mod tests;
