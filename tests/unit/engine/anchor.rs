use super::*;
use crate::engine::{Condition, Template, TemplateNode};
use crate::services::config::EngineConfig;
use serde_json::json;
use std::sync::Arc;

fn with_host(engine: &mut ViewEngine) -> NodeId {
    let root = engine.tree().root();
    let host = engine.tree_mut().create_element("div");
    engine.tree_mut().append_child(root, host).unwrap();
    host
}

fn text(name: &str) -> Arc<Template> {
    Template::new(name, vec![TemplateNode::text(name)])
}

#[test]
fn test_empty_host_container_anchors_after_marker() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let tail = engine.tree_mut().create_text("tail");
    engine.tree_mut().append_child(host, tail).unwrap();

    assert_eq!(
        engine.resolve_anchor(container, 0).unwrap(),
        Some(Anchor {
            parent: host,
            before: Some(tail)
        })
    );

    engine
        .create_embedded_view(container, &text("a"), json!({}), None)
        .unwrap();
    assert_eq!(engine.tree().text_content(host), "atail");
}

#[test]
fn test_empty_views_are_skipped() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let empty = Template::empty("empty");
    for _ in 0..3 {
        engine
            .create_embedded_view(container, &empty, json!({}), None)
            .unwrap();
    }
    let last = engine
        .create_embedded_view(container, &text("z"), json!({}), None)
        .unwrap();
    let z = engine.first_node_of_view(last).unwrap();

    // Every empty neighbour resolves through to the first real node.
    for index in 0..=3 {
        assert_eq!(
            engine.resolve_anchor(container, index).unwrap().unwrap().before,
            Some(z)
        );
    }
    assert_eq!(
        engine.resolve_anchor(container, 4).unwrap().unwrap().before,
        None
    );
}

#[test]
fn test_nested_container_first_root() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let before = Template::new(
        "before",
        vec![TemplateNode::outlet(text("inner")), TemplateNode::text("tail")],
    );
    let view = engine.instantiate(&before, json!({})).unwrap();
    engine.detect_changes(view).unwrap();
    engine.insert(container, view, None).unwrap();

    let anchor = engine.resolve_anchor(container, 0).unwrap().unwrap();
    let inner = anchor.before.unwrap();
    assert_eq!(
        engine.tree().kind(inner),
        Some(&crate::models::NodeKind::Text("inner".into()))
    );
}

#[test]
fn test_empty_nested_container_falls_through_to_next_root() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let before = Template::new(
        "before",
        vec![
            TemplateNode::when(Condition::Never, text("never")),
            TemplateNode::text("tail"),
        ],
    );
    let view = engine.instantiate(&before, json!({})).unwrap();
    engine.detect_changes(view).unwrap();
    engine.insert(container, view, None).unwrap();

    let tail = engine.first_node_of_view(view).unwrap();
    assert_eq!(
        engine.resolve_anchor(container, 0).unwrap(),
        Some(Anchor {
            parent: host,
            before: Some(tail)
        })
    );
}

#[test]
fn test_slot_content_and_empty_slot() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let content = engine.instantiate(&text("projected"), json!({})).unwrap();
    let projected = engine.first_node_of_view(content).unwrap();
    let projecting = Template::new(
        "p",
        vec![TemplateNode::slot(), TemplateNode::text("tail")],
    );

    let full = engine
        .instantiate_with_content(&projecting, json!({}), Some(content))
        .unwrap();
    engine.insert(container, full, None).unwrap();
    assert_eq!(
        engine.resolve_anchor(container, 0).unwrap().unwrap().before,
        Some(projected)
    );

    // Content is already claimed: this slot stays empty.
    let empty = engine
        .instantiate_with_content(&projecting, json!({}), Some(content))
        .unwrap();
    engine.insert(container, empty, Some(0)).unwrap();
    let tail = engine.first_node_of_view(empty).unwrap();
    assert_eq!(
        engine.resolve_anchor(container, 0).unwrap().unwrap().before,
        Some(tail)
    );
    assert_eq!(engine.tree().text_content(host), "tailprojectedtail");
}

#[test]
fn test_container_in_element_appends_to_element() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let template = Template::new(
        "cmp",
        vec![TemplateNode::element("p", vec![TemplateNode::anchor("vc")])],
    );
    let view = engine.mount(&template, json!({}), host, None).unwrap();
    let vc = engine.container(view, "vc").unwrap();
    let p = engine.first_node_of_view(view).unwrap();

    assert_eq!(
        engine.resolve_anchor(vc, 0).unwrap(),
        Some(Anchor {
            parent: p,
            before: None
        })
    );
}

#[test]
fn test_group_siblings_inside_element() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let template = Template::new(
        "cmp",
        vec![TemplateNode::element(
            "p",
            vec![
                TemplateNode::group(vec![TemplateNode::anchor("vc")]),
                TemplateNode::text("after"),
            ],
        )],
    );
    let view = engine.mount(&template, json!({}), host, None).unwrap();
    let vc = engine.container(view, "vc").unwrap();

    engine
        .create_embedded_view(vc, &text("x"), json!({}), None)
        .unwrap();

    assert_eq!(engine.tree().to_markup(host), "<div><p>xafter</p><!--container--></div>");
}

#[test]
fn test_unrendered_container_has_no_anchor() {
    let mut engine = ViewEngine::new();
    let template = Template::new("outer", vec![TemplateNode::anchor("vc")]);
    let view = engine.instantiate(&template, json!({})).unwrap();
    let vc = engine.container(view, "vc").unwrap();

    assert_eq!(engine.resolve_anchor(vc, 0).unwrap(), None);

    let inner = engine
        .create_embedded_view(vc, &text("x"), json!({}), None)
        .unwrap();
    let x = engine.first_node_of_view(inner).unwrap();
    assert!(engine.tree().parent_of(x).is_none());
    assert_eq!(engine.nodes_of(view), vec![x]);
}

#[test]
fn test_host_view_end() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let template = Template::new(
        "cmp",
        vec![TemplateNode::text("a"), TemplateNode::anchor("vc")],
    );
    let view = engine.mount(&template, json!({}), host, None).unwrap();
    let trailing = engine.tree_mut().create_text("!");
    engine.tree_mut().append_child(host, trailing).unwrap();
    let vc = engine.container(view, "vc").unwrap();

    engine
        .create_embedded_view(vc, &text("b"), json!({}), None)
        .unwrap();
    engine
        .create_embedded_view(vc, &text("c"), json!({}), None)
        .unwrap();

    assert_eq!(engine.tree().text_content(host), "abc!");
}

#[test]
fn test_nesting_depth_limit() {
    let mut engine = ViewEngine::with_config(EngineConfig {
        max_nesting_depth: 0,
        ..Default::default()
    });
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let outer = Template::new("outer", vec![TemplateNode::anchor("vc")]);
    let view = engine
        .create_embedded_view(container, &outer, json!({}), None)
        .unwrap();
    let vc = engine.container(view, "vc").unwrap();

    assert_eq!(
        engine.resolve_anchor(vc, 0),
        Err(EngineError::AnchorResolution("nesting depth exceeded"))
    );
    assert_eq!(
        engine.create_embedded_view(vc, &text("x"), json!({}), None),
        Err(EngineError::AnchorResolution("nesting depth exceeded"))
    );
}

#[test]
fn test_deep_nesting_within_default_limit() {
    let mut engine = ViewEngine::new();
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let mut template = text("leaf");
    for level in 0..100 {
        template = Template::new(
            format!("level{level}"),
            vec![TemplateNode::when(Condition::Always, template)],
        );
    }

    let view = engine
        .create_embedded_view(container, &template, json!({}), None)
        .unwrap();
    engine.detect_changes(view).unwrap();

    assert_eq!(engine.tree().text_content(host), "leaf");
}

#[test]
fn test_depth_counts_one_per_level() {
    let mut engine = ViewEngine::with_config(EngineConfig {
        max_nesting_depth: 2,
        ..Default::default()
    });
    let host = with_host(&mut engine);
    let container = engine.create_container(host).unwrap();
    let outer = Template::new("outer", vec![TemplateNode::anchor("vc")]);
    let first = engine
        .create_embedded_view(container, &outer, json!({}), None)
        .unwrap();
    let level1 = engine.container(first, "vc").unwrap();
    let second = engine
        .create_embedded_view(level1, &outer, json!({}), None)
        .unwrap();
    let level2 = engine.container(second, "vc").unwrap();
    let third = engine
        .create_embedded_view(level2, &outer, json!({}), None)
        .unwrap();
    let level3 = engine.container(third, "vc").unwrap();

    assert!(engine.check_resolvable(level2).is_ok());
    assert!(engine.resolve_anchor(level2, 0).unwrap().is_some());
    assert_eq!(
        engine.check_resolvable(level3),
        Err(EngineError::AnchorResolution("nesting depth exceeded"))
    );
    assert_eq!(
        engine.resolve_anchor(level3, 0),
        Err(EngineError::AnchorResolution("nesting depth exceeded"))
    );
}

#[test]
fn test_first_and_last_node() {
    let mut engine = ViewEngine::new();
    let template = Template::new(
        "t",
        vec![
            TemplateNode::group(vec![]),
            TemplateNode::text("a"),
            TemplateNode::element("b", vec![]),
            TemplateNode::anchor("empty"),
        ],
    );
    let view = engine.instantiate(&template, json!({})).unwrap();
    let nodes = engine.nodes_of(view);

    assert_eq!(nodes.len(), 2);
    assert_eq!(engine.first_node_of_view(view), Some(nodes[0]));
    assert_eq!(engine.last_node_of_view(view), Some(nodes[1]));
    assert_eq!(list_at(&[], &[0]), None);
}
