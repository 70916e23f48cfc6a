//! 视图模板：预编译的根节点结构描述
//!
//! 模板是不可变数据，由 `ViewEngine::instantiate` 实例化为视图。

use compact_str::CompactString;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: CompactString,
    nodes: Vec<TemplateNode>,
}

impl Template {
    pub fn new(name: impl Into<CompactString>, nodes: Vec<TemplateNode>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            nodes,
        })
    }

    pub fn empty(name: impl Into<CompactString>) -> Arc<Self> {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Text(CompactString),
    /// Text node whose content is computed from the context on `detect_changes`.
    Binding(Vec<Segment>),
    Element {
        tag: CompactString,
        children: Vec<TemplateNode>,
    },
    /// Transparent wrapper: renders its children without a node of its own.
    Group(Vec<TemplateNode>),
    Container {
        name: Option<CompactString>,
        embed: Option<Embed>,
    },
    /// Projection slot, filled from the content the view was instantiated with.
    Slot,
}

impl TemplateNode {
    pub fn text(text: impl Into<CompactString>) -> Self {
        TemplateNode::Text(text.into())
    }

    pub fn interpolate(prefix: impl Into<CompactString>, field: impl Into<CompactString>) -> Self {
        TemplateNode::Binding(vec![
            Segment::Literal(prefix.into()),
            Segment::Field(field.into()),
        ])
    }

    pub fn element(tag: impl Into<CompactString>, children: Vec<TemplateNode>) -> Self {
        TemplateNode::Element {
            tag: tag.into(),
            children,
        }
    }

    pub fn group(children: Vec<TemplateNode>) -> Self {
        TemplateNode::Group(children)
    }

    /// A named container the host fills imperatively.
    pub fn anchor(name: impl Into<CompactString>) -> Self {
        TemplateNode::Container {
            name: Some(name.into()),
            embed: None,
        }
    }

    /// Conditional container: renders `then` while `when` holds.
    pub fn when(when: Condition, then: Arc<Template>) -> Self {
        TemplateNode::Container {
            name: None,
            embed: Some(Embed {
                when,
                then,
                otherwise: None,
            }),
        }
    }

    pub fn when_else(when: Condition, then: Arc<Template>, otherwise: Arc<Template>) -> Self {
        TemplateNode::Container {
            name: None,
            embed: Some(Embed {
                when,
                then,
                otherwise: Some(otherwise),
            }),
        }
    }

    /// Container that always renders `template` once.
    pub fn outlet(template: Arc<Template>) -> Self {
        Self::when(Condition::Always, template)
    }

    pub fn slot() -> Self {
        TemplateNode::Slot
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(CompactString),
    Field(CompactString),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub when: Condition,
    pub then: Arc<Template>,
    pub otherwise: Option<Arc<Template>>,
}

impl Embed {
    pub(crate) fn branch(&self, active: bool) -> Option<&Arc<Template>> {
        if active {
            Some(&self.then)
        } else {
            self.otherwise.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Never,
    /// Truthy context field.
    Field(CompactString),
}

impl Condition {
    pub fn evaluate(&self, context: &Value) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Field(name) => context.get(name.as_str()).is_some_and(is_truthy),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn render_segments(segments: &[Segment], context: &Value) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Field(name) => match context.get(name.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
            },
        }
    }
    out
}
