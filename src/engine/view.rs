//! 视图实例与投影槽

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

use super::template::{Embed, Segment, Template};
use super::{ContainerId, SlotId, ViewId};
use crate::models::NodeId;

/// One renderable unit of a view. Order inside a view is fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Node(NodeId),
    Element {
        node: NodeId,
        children: Vec<ViewNode>,
    },
    Group(Vec<ViewNode>),
    Container(ContainerId),
    Slot(SlotId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOwner {
    Detached,
    Container(ContainerId),
    Slot(SlotId),
    /// Component root view rendered into `parent`, in front of `marker`.
    Host { parent: NodeId, marker: NodeId },
}

#[derive(Debug, Clone)]
pub(crate) struct TextBinding {
    pub node: NodeId,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub(crate) struct EmbedState {
    pub container: ContainerId,
    pub embed: Embed,
    pub active: Option<bool>,
}

#[derive(Debug)]
pub struct ViewInstance {
    pub(crate) template: Arc<Template>,
    pub(crate) roots: Vec<ViewNode>,
    pub(crate) context: Value,
    pub(crate) owner: ViewOwner,
    pub(crate) destroyed: bool,
    /// Projectable content handed to slots and nested containers.
    pub(crate) content: Option<ViewId>,
    pub(crate) bindings: Vec<TextBinding>,
    pub(crate) embeds: Vec<EmbedState>,
    pub(crate) named: FxHashMap<CompactString, ContainerId>,
    pub(crate) containers: Vec<ContainerId>,
    pub(crate) slots: Vec<SlotId>,
}

impl ViewInstance {
    pub(crate) fn new(template: Arc<Template>, context: Value, content: Option<ViewId>) -> Self {
        Self {
            template,
            roots: Vec::new(),
            context,
            owner: ViewOwner::Detached,
            destroyed: false,
            content,
            bindings: Vec::new(),
            embeds: Vec::new(),
            named: FxHashMap::default(),
            containers: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    pub fn roots(&self) -> &[ViewNode] {
        &self.roots
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn owner(&self) -> ViewOwner {
        self.owner
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_attached(&self) -> bool {
        !matches!(self.owner, ViewOwner::Detached)
    }

    pub fn containers(&self) -> &[ContainerId] {
        &self.containers
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionSlot {
    pub(crate) host: ViewId,
    pub(crate) path: Vec<usize>,
    pub(crate) content: Option<ViewId>,
}

impl ProjectionSlot {
    pub fn host(&self) -> ViewId {
        self.host
    }

    pub fn content(&self) -> Option<ViewId> {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}
