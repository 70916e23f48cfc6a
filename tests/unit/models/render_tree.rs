use super::*;

fn tree_with_div() -> (RenderTree, NodeId) {
    let mut tree = RenderTree::new();
    let div = tree.create_element("div");
    tree.append_child(tree.root(), div).unwrap();
    (tree, div)
}

#[test]
fn test_new_tree() {
    let tree = RenderTree::new();
    assert!(tree.is_element(tree.root()));
    assert!(tree.parent_of(tree.root()).is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_insert_before_and_append() {
    let (mut tree, div) = tree_with_div();
    let a = tree.create_text("a");
    let b = tree.create_text("b");
    let c = tree.create_text("c");

    tree.append_child(div, c).unwrap();
    tree.insert_before(div, a, Some(c)).unwrap();
    tree.insert_before(div, b, Some(c)).unwrap();

    assert_eq!(tree.children(div), &[a, b, c]);
    assert_eq!(tree.parent_of(b), Some(div));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.previous_sibling(a), None);
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.text_content(div), "abc");
}

#[test]
fn test_insert_moves_attached_node() {
    let (mut tree, div) = tree_with_div();
    let span = tree.create_element("span");
    tree.append_child(tree.root(), span).unwrap();
    let a = tree.create_text("a");
    tree.append_child(div, a).unwrap();

    tree.append_child(span, a).unwrap();

    assert!(tree.children(div).is_empty());
    assert_eq!(tree.children(span), &[a]);
    assert_eq!(tree.parent_of(a), Some(span));
}

#[test]
fn test_insert_before_itself_is_noop() {
    let (mut tree, div) = tree_with_div();
    let a = tree.create_text("a");
    let b = tree.create_text("b");
    tree.append_child(div, a).unwrap();
    tree.append_child(div, b).unwrap();

    tree.insert_before(div, a, Some(a)).unwrap();

    assert_eq!(tree.children(div), &[a, b]);
}

#[test]
fn test_insert_errors() {
    let (mut tree, div) = tree_with_div();
    let text = tree.create_text("t");
    let stray = tree.create_text("stray");
    let inner = tree.create_element("p");
    tree.append_child(div, inner).unwrap();

    assert_eq!(
        tree.insert_before(text, stray, None),
        Err(RenderTreeError::ParentNotElement)
    );
    assert_eq!(
        tree.insert_before(div, text, Some(stray)),
        Err(RenderTreeError::NotAChild)
    );
    assert_eq!(
        tree.append_child(inner, div),
        Err(RenderTreeError::MoveIntoDescendant)
    );
    assert_eq!(
        tree.append_child(div, div),
        Err(RenderTreeError::MoveIntoDescendant)
    );
}

#[test]
fn test_remove_keeps_node_alive() {
    let (mut tree, div) = tree_with_div();
    let a = tree.create_text("a");
    tree.append_child(div, a).unwrap();

    tree.remove(a).unwrap();

    assert!(tree.contains(a));
    assert!(tree.parent_of(a).is_none());
    assert!(tree.children(div).is_empty());
    // detached nodes can be removed again
    tree.remove(a).unwrap();
}

#[test]
fn test_destroy_frees_subtree() {
    let (mut tree, div) = tree_with_div();
    let span = tree.create_element("span");
    let a = tree.create_text("a");
    tree.append_child(div, span).unwrap();
    tree.append_child(span, a).unwrap();

    tree.destroy(span).unwrap();

    assert!(!tree.contains(span));
    assert!(!tree.contains(a));
    assert!(tree.children(div).is_empty());
    assert_eq!(tree.destroy(span), Err(RenderTreeError::InvalidNodeId));
    assert_eq!(tree.destroy(tree.root()), Err(RenderTreeError::InvalidNodeId));
}

#[test]
fn test_text_content_skips_comments() {
    let (mut tree, div) = tree_with_div();
    let a = tree.create_text("a");
    let marker = tree.create_comment("container");
    let b = tree.create_text("b");
    for n in [a, marker, b] {
        tree.append_child(div, n).unwrap();
    }

    assert_eq!(tree.text_content(div), "ab");
    assert_eq!(tree.to_markup(div), "<div>a<!--container-->b</div>");
}

#[test]
fn test_set_text() {
    let (mut tree, div) = tree_with_div();
    let a = tree.create_text("");
    tree.append_child(div, a).unwrap();

    tree.set_text(a, "hello").unwrap();

    assert_eq!(tree.kind(a), Some(&NodeKind::Text("hello".into())));
    assert_eq!(tree.set_text(div, "x"), Err(RenderTreeError::NotText));
}
