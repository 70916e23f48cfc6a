//! 视图引擎：视图容器、锚点解析、投影槽
//!
//! 所有状态都保存在 slotmap 池中，视图、容器、投影槽之间只通过 key 互相引用，
//! 不存在反向指针。

mod anchor;
mod container;
mod detect;
mod error;
pub mod template;
mod view;

pub use anchor::Anchor;
pub use container::{ContainerHost, ViewContainer};
pub use error::{EngineError, Result};
pub use template::{Condition, Embed, Segment, Template, TemplateNode};
pub use view::{ProjectionSlot, ViewInstance, ViewNode, ViewOwner};

use compact_str::CompactString;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

use crate::models::{NodeId, RenderTree, RenderTreeError};
use crate::services::config::EngineConfig;
use view::{EmbedState, TextBinding};

new_key_type! {
    pub struct ViewId;
    pub struct ContainerId;
    pub struct SlotId;
}

pub struct ViewEngine {
    tree: RenderTree,
    views: SlotMap<ViewId, ViewInstance>,
    containers: SlotMap<ContainerId, ViewContainer>,
    slots: SlotMap<SlotId, ProjectionSlot>,
    config: EngineConfig,
}

impl ViewEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tree: RenderTree::new(),
            views: SlotMap::with_key(),
            containers: SlotMap::with_key(),
            slots: SlotMap::with_key(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut RenderTree {
        &mut self.tree
    }

    pub fn view(&self, view: ViewId) -> Option<&ViewInstance> {
        self.views.get(view)
    }

    pub fn is_destroyed(&self, view: ViewId) -> bool {
        self.views.get(view).map_or(true, |v| v.destroyed)
    }

    pub fn context(&self, view: ViewId) -> Option<&Value> {
        self.live_view(view).ok().map(|v| &v.context)
    }

    pub fn context_mut(&mut self, view: ViewId) -> Option<&mut Value> {
        self.views
            .get_mut(view)
            .filter(|v| !v.destroyed)
            .map(|v| &mut v.context)
    }

    pub fn slot(&self, slot: SlotId) -> Option<&ProjectionSlot> {
        self.slots.get(slot)
    }

    /// Looks up a container declared by name in `view`'s template.
    pub fn container(&self, view: ViewId, name: &str) -> Option<ContainerId> {
        self.views.get(view)?.named.get(name).copied()
    }

    pub(crate) fn live_view(&self, view: ViewId) -> Result<&ViewInstance> {
        self.views
            .get(view)
            .filter(|v| !v.destroyed)
            .ok_or(EngineError::NotOwned)
    }

    /// Creates an unattached view. No container is touched.
    pub fn instantiate(&mut self, template: &Arc<Template>, context: Value) -> Result<ViewId> {
        self.instantiate_with_content(template, context, None)
    }

    /// Creates an unattached view whose slots project `content`.
    ///
    /// Content is rendered once: the first slot filled from it claims it and
    /// any later slot stays empty.
    pub fn instantiate_with_content(
        &mut self,
        template: &Arc<Template>,
        context: Value,
        content: Option<ViewId>,
    ) -> Result<ViewId> {
        if let Some(content) = content {
            self.live_view(content)?;
        }

        let view = self
            .views
            .insert(ViewInstance::new(template.clone(), context, content));
        let mut path = Vec::new();
        let mut build = Build::default();
        let roots = self.build_nodes(view, template.nodes(), None, &mut path, &mut build)?;

        let instance = self.views.get_mut(view).ok_or(EngineError::NotOwned)?;
        instance.roots = roots;
        instance.bindings = build.bindings;
        instance.embeds = build.embeds;
        instance.containers = build.containers;
        instance.slots = build.slots;
        for (name, container) in build.named {
            instance.named.insert(name, container);
        }

        tracing::debug!(?view, template = template.name(), "instantiate view");
        Ok(view)
    }

    fn build_nodes(
        &mut self,
        view: ViewId,
        nodes: &[TemplateNode],
        parent: Option<NodeId>,
        path: &mut Vec<usize>,
        build: &mut Build,
    ) -> Result<Vec<ViewNode>> {
        let mut out = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            path.push(i);
            let built = self.build_node(view, node, parent, path, build)?;
            path.pop();
            out.push(built);
        }
        Ok(out)
    }

    fn build_node(
        &mut self,
        view: ViewId,
        node: &TemplateNode,
        parent: Option<NodeId>,
        path: &mut Vec<usize>,
        build: &mut Build,
    ) -> Result<ViewNode> {
        let built = match node {
            TemplateNode::Text(text) => {
                let id = self.tree.create_text(text.clone());
                self.attach_child(parent, id)?;
                ViewNode::Node(id)
            }
            TemplateNode::Binding(segments) => {
                let id = self.tree.create_text("");
                self.attach_child(parent, id)?;
                build.bindings.push(TextBinding {
                    node: id,
                    segments: segments.clone(),
                });
                ViewNode::Node(id)
            }
            TemplateNode::Element { tag, children } => {
                let id = self.tree.create_element(tag.clone());
                self.attach_child(parent, id)?;
                let children = self.build_nodes(view, children, Some(id), path, build)?;
                ViewNode::Element { node: id, children }
            }
            TemplateNode::Group(children) => {
                ViewNode::Group(self.build_nodes(view, children, parent, path, build)?)
            }
            TemplateNode::Container { name, embed } => {
                let content = self.views.get(view).and_then(|v| v.content);
                let container = self.containers.insert(ViewContainer {
                    host: ContainerHost::View {
                        view,
                        path: path.clone(),
                    },
                    views: Vec::new(),
                    content,
                });
                if let Some(name) = name {
                    build.named.push((name.clone(), container));
                }
                if let Some(embed) = embed {
                    build.embeds.push(EmbedState {
                        container,
                        embed: embed.clone(),
                        active: None,
                    });
                }
                build.containers.push(container);
                ViewNode::Container(container)
            }
            TemplateNode::Slot => {
                let slot = self.slots.insert(ProjectionSlot {
                    host: view,
                    path: path.clone(),
                    content: None,
                });
                self.fill_slot(view, slot, parent)?;
                build.slots.push(slot);
                ViewNode::Slot(slot)
            }
        };
        Ok(built)
    }

    fn attach_child(&mut self, parent: Option<NodeId>, node: NodeId) -> Result<()> {
        if let Some(parent) = parent {
            self.tree.append_child(parent, node)?;
        }
        Ok(())
    }

    fn fill_slot(&mut self, view: ViewId, slot: SlotId, parent: Option<NodeId>) -> Result<()> {
        let Some(content) = self.views.get(view).and_then(|v| v.content) else {
            return Ok(());
        };
        let claimable = self
            .views
            .get(content)
            .is_some_and(|c| !c.destroyed && c.owner == ViewOwner::Detached);
        if !claimable {
            tracing::debug!(?slot, ?content, "projected content already claimed");
            return Ok(());
        }

        if let Some(parent) = parent {
            for node in self.nodes_of(content) {
                self.tree.append_child(parent, node)?;
            }
        }
        if let Some(instance) = self.views.get_mut(content) {
            instance.owner = ViewOwner::Slot(slot);
        }
        if let Some(s) = self.slots.get_mut(slot) {
            s.content = Some(content);
        }
        Ok(())
    }

    /// Top-level physical nodes of `view` in render order, including the
    /// nodes of nested containers and projected content.
    pub fn nodes_of(&self, view: ViewId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_view_nodes(view, &mut out);
        out
    }

    fn collect_view_nodes(&self, view: ViewId, out: &mut Vec<NodeId>) {
        if let Some(instance) = self.views.get(view) {
            for root in &instance.roots {
                self.collect_nodes(root, out);
            }
        }
    }

    fn collect_nodes(&self, node: &ViewNode, out: &mut Vec<NodeId>) {
        match node {
            ViewNode::Node(id) | ViewNode::Element { node: id, .. } => out.push(*id),
            ViewNode::Group(children) => {
                for child in children {
                    self.collect_nodes(child, out);
                }
            }
            ViewNode::Container(container) => {
                if let Some(c) = self.containers.get(*container) {
                    for &v in &c.views {
                        self.collect_view_nodes(v, out);
                    }
                }
            }
            ViewNode::Slot(slot) => {
                if let Some(content) = self.slots.get(*slot).and_then(|s| s.content) {
                    self.collect_view_nodes(content, out);
                }
            }
        }
    }

    /// Creates the component root view of a host element and appends its
    /// nodes to `parent`, followed by an end marker that keeps the view's
    /// position when more nodes are appended to `parent` later.
    pub fn mount(
        &mut self,
        template: &Arc<Template>,
        context: Value,
        parent: NodeId,
        content: Option<ViewId>,
    ) -> Result<ViewId> {
        if !self.tree.is_element(parent) {
            return Err(EngineError::RenderTree(
                RenderTreeError::ParentNotElement,
            ));
        }
        let view = self.instantiate_with_content(template, context, content)?;
        for node in self.nodes_of(view) {
            self.tree.append_child(parent, node)?;
        }
        let marker = self.tree.create_comment(self.config.marker_label.as_str());
        self.tree.append_child(parent, marker)?;
        if let Some(instance) = self.views.get_mut(view) {
            instance.owner = ViewOwner::Host { parent, marker };
        }
        tracing::debug!(?view, template = template.name(), "mount host view");
        Ok(view)
    }

    /// Destroys a host view created by [`ViewEngine::mount`].
    pub fn unmount(&mut self, view: ViewId) -> Result<()> {
        let ViewOwner::Host { marker, .. } = self.live_view(view)?.owner else {
            return Err(EngineError::NotOwned);
        };
        self.detach_nodes(view)?;
        self.destroy_view(view)?;
        self.tree.destroy(marker)?;
        tracing::debug!(?view, "unmount host view");
        Ok(())
    }

    /// Destroys a view that is not attached anywhere.
    pub fn destroy(&mut self, view: ViewId) -> Result<()> {
        let instance = self.live_view(view)?;
        if instance.owner != ViewOwner::Detached {
            return Err(EngineError::NotOwned);
        }
        self.destroy_view(view)
    }

    pub(crate) fn detach_nodes(&mut self, view: ViewId) -> Result<()> {
        for node in self.nodes_of(view) {
            self.tree.remove(node)?;
        }
        Ok(())
    }

    /// Frees every node, nested view and container owned by `view` and
    /// leaves a tombstone behind so stale handles are detected.
    pub(crate) fn destroy_view(&mut self, view: ViewId) -> Result<()> {
        let Some(instance) = self.views.get_mut(view) else {
            return Ok(());
        };
        if instance.destroyed {
            return Ok(());
        }
        instance.destroyed = true;
        instance.owner = ViewOwner::Detached;
        let roots = std::mem::take(&mut instance.roots);
        let containers = std::mem::take(&mut instance.containers);
        let slots = std::mem::take(&mut instance.slots);
        instance.bindings.clear();
        instance.embeds.clear();
        instance.named.clear();
        instance.content = None;
        instance.context = Value::Null;

        for container in containers {
            if let Some(c) = self.containers.remove(container) {
                for nested in c.views {
                    self.destroy_view(nested)?;
                }
            }
        }

        // Projected content belongs to the declaring scope: hand it back.
        for slot in slots {
            if let Some(content) = self.slots.remove(slot).and_then(|s| s.content) {
                self.detach_nodes(content)?;
                if let Some(c) = self.views.get_mut(content) {
                    c.owner = ViewOwner::Detached;
                }
            }
        }

        let mut own = Vec::new();
        for root in &roots {
            collect_own_nodes(root, &mut own);
        }
        for node in own {
            self.tree.destroy(node)?;
        }

        tracing::debug!(?view, "destroy view");
        Ok(())
    }
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_own_nodes(node: &ViewNode, out: &mut Vec<NodeId>) {
    match node {
        ViewNode::Node(id) | ViewNode::Element { node: id, .. } => out.push(*id),
        ViewNode::Group(children) => {
            for child in children {
                collect_own_nodes(child, out);
            }
        }
        ViewNode::Container(_) | ViewNode::Slot(_) => {}
    }
}

#[derive(Default)]
struct Build {
    bindings: Vec<TextBinding>,
    embeds: Vec<EmbedState>,
    named: Vec<(CompactString, ContainerId)>,
    containers: Vec<ContainerId>,
    slots: Vec<SlotId>,
}

#[cfg(test)]
#[path = "../../tests/unit/engine/view.rs"]
mod tests;
