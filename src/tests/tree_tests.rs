use crate::error::Error;
use crate::tree::{Language, NodeKind, SimpleTree, Tree};

#[test]
fn post_order_layout() {
    let t = Tree::build(
        Language::Java,
        &tree!("Block"; [
            tree!("ReturnStatement"; [tree!("SimpleName", "x")]),
            tree!("BreakStatement"),
        ]),
    )
    .unwrap();
    println!("{}", t);
    assert_eq!(t.len(), 4);
    let root = t.root();
    assert_eq!(root, 3);
    assert_eq!(t.children(&root), &[1, 2]);
    assert_eq!(t.descendants(&root), vec![0, 1, 2]);
    assert_eq!(t.lld(&1), 0);
    assert_eq!(t.height(&root), 3);
    assert_eq!(t.height(&2), 1);
    assert_eq!(t.size(&1), 2);
    assert_eq!(t.parent(&0), Some(1));
    assert_eq!(t.parents(0).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(t.lsib(&2), Some(1));
    assert_eq!(t.lsib(&1), None);
    assert_eq!(t.position_in_parent(&2), Some(1));
    assert!(t.is_descendant(&0, &root));
    assert!(!t.is_descendant(&2, &1));
    assert_eq!(t.iter_pre().collect::<Vec<_>>(), vec![3, 1, 0, 2]);
    assert_eq!(t.kind(&1), NodeKind::ReturnStatement);
    assert_eq!(t.label(&0), Some("x"));
    // ranges follow pre-order ranks when absent
    assert_eq!((t.pos(&root), t.length(&root)), (0, 4));
    assert_eq!((t.pos(&0), t.length(&0)), (2, 1));
    assert_eq!((t.pos(&2), t.length(&2)), (3, 1));
}

#[test]
fn hashes() {
    let build = |l| {
        Tree::build(
            Language::Java,
            &tree!("ReturnStatement"; [tree!("SimpleName", l)]),
        )
        .unwrap()
    };
    let (a, b, c) = (build("x"), build("x"), build("y"));
    assert_eq!(a.hash(&a.root()), b.hash(&b.root()));
    assert_ne!(a.hash(&a.root()), c.hash(&c.root()));
    assert_eq!(a.structural_hash(&a.root()), c.structural_hash(&c.root()));

    // children order matters
    let ab = Tree::build(Language::Java, &tree!("Block"; [tree!("BreakStatement"), tree!("ContinueStatement")])).unwrap();
    let ba = Tree::build(Language::Java, &tree!("Block"; [tree!("ContinueStatement"), tree!("BreakStatement")])).unwrap();
    assert_ne!(ab.structural_hash(&ab.root()), ba.structural_hash(&ba.root()));
}

#[test]
fn vocabularies_share_type_identity() {
    let java = Tree::build(Language::Java, &tree!("MethodInvocation"; [tree!("SimpleName", "f")])).unwrap();
    let kotlin = Tree::build(
        Language::Kotlin,
        &tree!("call_expression"; [tree!("simple_identifier", "f")]),
    )
    .unwrap();
    assert!(java.same_type(&java.root(), &kotlin, &kotlin.root()));
    assert_eq!(java.hash(&java.root()), kotlin.hash(&kotlin.root()));

    // unknown types are compared by name
    let a = Tree::build(Language::Java, &tree!("Dimension")).unwrap();
    let b = Tree::build(Language::Java, &tree!("WildcardType")).unwrap();
    assert_eq!(a.kind(&0), NodeKind::Other);
    assert!(!a.same_type(&0, &b, &0));
}

#[test]
fn explicit_ranges() {
    let t: SimpleTree = serde_json::from_str(
        r#"{
            "type": "ReturnStatement",
            "range": [10, 9],
            "children": [{ "type": "SimpleName", "label": "x", "range": [17, 1] }]
        }"#,
    )
    .unwrap();
    let t = Tree::build(Language::Java, &t).unwrap();
    assert_eq!((t.pos(&0), t.length(&0)), (17, 1));
    assert_eq!((t.pos(&1), t.length(&1)), (10, 9));

    let out = tree!("ReturnStatement"; [tree!("SimpleName", "x").with_range(30, 1)]).with_range(10, 9);
    assert_eq!(
        Tree::build(Language::Java, &out).unwrap_err(),
        Error::ChildOutOfRange {
            ty: "SimpleName".into(),
            start: 30,
            end: 31,
            parent_start: 10,
            parent_end: 19,
        }
    );
}

#[test]
fn kotlin_jumps_are_told_apart() {
    let t = Tree::build(
        Language::Kotlin,
        &tree!("statements"; [
            tree!("jump_expression"; [tree!("throw"), tree!("simple_identifier", "e")]),
            tree!("jump_expression", "break"),
            tree!("jump_expression"; [tree!("return"), tree!("simple_identifier", "x")]),
        ]),
    )
    .unwrap();
    let root = t.root();
    let kinds: Vec<_> = t.children(&root).iter().map(|c| t.kind(c)).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::ThrowStatement, NodeKind::BreakStatement, NodeKind::ReturnStatement]
    );
    let throw = t.children(&root)[0];
    assert_eq!(t.keyword(&throw), Some("throw"));
}

#[test]
fn views_reclassify_jumps_by_keyword() {
    use crate::matchers::heuristic::gt::TreeView;
    let t = Tree::build(
        Language::Java,
        &tree!("jump_expression"; [tree!("continue")]),
    )
    .unwrap();
    assert_eq!(t.kind(&t.root()), NodeKind::Other);
    let view = TreeView::with_language(&t, Language::Kotlin);
    assert_eq!(view.kind(&t.root()), NodeKind::ContinueStatement);
}
