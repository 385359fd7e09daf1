//! Integration tests for selector matching and the query API.

mod common;

use common::{TestTree, ids};
use thicket_common::warning::recorded_warnings;
use thicket_selector::{
    Matcher, SelectorError, Selob, query_selector_all, query_selector_bool, query_selector_first,
    query_selector_objects, query_selector_unique,
};

/// ```text
/// Window#win
/// ├── Box#box (Box Container)
/// │   ├── Button#ok  label=Ok selected=true
/// │   ├── Label#caption  text=foo-bar
/// │   ├── Button#cancel  label=Cancel
/// │   ├── Label#hint  words="alpha  beta\tgamma"
/// │   └── Toolkit::Button#help
/// └── Box#status
///     └── Label#message
/// ```
fn widget_tree() -> TestTree {
    let mut tree = TestTree::new("Window", "win");
    let container = tree.add(0, "Box Container", "box");
    let ok = tree.add(container, "Toolkit::Button Button Clickable", "ok");
    tree.set(ok, "label", "Ok");
    tree.set(ok, "selected", "true");
    let caption = tree.add(container, "Label", "caption");
    tree.set(caption, "text", "foo-bar");
    let cancel = tree.add(container, "Toolkit::Button Button Clickable", "cancel");
    tree.set(cancel, "label", "Cancel");
    let hint = tree.add(container, "Label", "hint");
    tree.set(hint, "words", "alpha  beta\tgamma");
    let _ = tree.add(container, "Toolkit::Button", "help");
    let status = tree.add(0, "Box", "status");
    let _ = tree.add(status, "Label", "message");
    tree
}

fn all_ids(tree: &TestTree, selector: &str) -> Vec<String> {
    let found = query_selector_all(selector, &tree.root()).unwrap();
    ids(&found).into_iter().map(str::to_string).collect()
}

#[test]
fn test_type_matches_primary_type_tail() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, "Button"), ["ok", "cancel", "help"]);
    assert_eq!(all_ids(&tree, r"Toolkit\:\:Button"), ["ok", "cancel", "help"]);
    assert!(all_ids(&tree, "Clickable").is_empty());
    assert!(all_ids(&tree, "Container").is_empty());
}

#[test]
fn test_class_matches_any_listed_type() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, ".Clickable"), ["ok", "cancel"]);
    assert_eq!(all_ids(&tree, ".Container"), ["box"]);
    assert_eq!(all_ids(&tree, ".Button"), ["ok", "cancel", "help"]);
}

#[test]
fn test_id_and_universal() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, "#caption"), ["caption"]);
    assert_eq!(all_ids(&tree, "Label#caption"), ["caption"]);
    assert!(all_ids(&tree, "Button#caption").is_empty());
    assert_eq!(all_ids(&tree, "*").len(), 9);
}

#[test]
fn test_search_is_preorder_and_includes_root() {
    let tree = widget_tree();
    assert_eq!(
        all_ids(&tree, "*"),
        ["win", "box", "ok", "caption", "cancel", "hint", "help", "status", "message"]
    );
    assert_eq!(all_ids(&tree, "Window"), ["win"]);
}

#[test]
fn test_child_versus_descendant() {
    // A > B > C, and A > D > E > C where the second C is not below B.
    let mut tree = TestTree::new("A", "a");
    let b = tree.add(0, "B", "b");
    let _ = tree.add(b, "C", "c1");
    let d = tree.add(0, "D", "d");
    let e = tree.add(d, "E", "e");
    let _ = tree.add(e, "C", "c2");

    assert_eq!(all_ids(&tree, "A > * > C"), ["c1"]);
    assert_eq!(all_ids(&tree, "A C"), ["c1", "c2"]);
    assert_eq!(all_ids(&tree, "B C"), ["c1"]);
    assert_eq!(all_ids(&tree, "A * C"), ["c1", "c2"]);
    assert!(all_ids(&tree, "A > C").is_empty());
    assert_eq!(all_ids(&tree, "D > * > C"), ["c2"]);
}

#[test]
fn test_sibling_combinators() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, "Label + Button"), ["cancel", "help"]);
    assert_eq!(all_ids(&tree, "#ok + Label"), ["caption"]);
    assert!(all_ids(&tree, "#ok + Button").is_empty());
    assert_eq!(all_ids(&tree, "Button ~ Label"), ["caption", "hint"]);
    assert_eq!(all_ids(&tree, "#ok ~ Button"), ["cancel", "help"]);
    assert!(all_ids(&tree, "#help ~ *").is_empty());
}

#[test]
fn test_subject_override_returns_marked_sequence() {
    let mut tree = TestTree::new("A", "a");
    let b = tree.add(0, "B", "b");
    let _ = tree.add(b, "C", "c");
    let found = query_selector_first("A > !B > C", &tree.root()).unwrap();
    assert_eq!(found.map(|node| ids(&[node])[0]), Some("b"));

    // The chain past the subject must still match.
    let mut tree = TestTree::new("A", "a");
    let b = tree.add(0, "B", "b");
    let _ = tree.add(b, "D", "d");
    assert_eq!(query_selector_first("A > !B > C", &tree.root()).unwrap(), None);
}

#[test]
fn test_subject_marker_forms_agree() {
    let tree = widget_tree();
    for selector in ["Window > !Box > Label", "Window > Box! > Label"] {
        assert_eq!(all_ids(&tree, selector), ["box", "status"], "{selector}");
    }
    assert_eq!(all_ids(&tree, "Window > !Box > Button"), ["box"]);
    assert!(all_ids(&tree, "Window > !Box > Slider").is_empty());
    assert_eq!(all_ids(&tree, "!Label + #help"), ["hint"]);
    assert_eq!(all_ids(&tree, "!Label ~ #help"), ["caption", "hint"]);
    assert_eq!(all_ids(&tree, "Box Label!"), ["caption", "hint", "message"]);
}

#[test]
fn test_trailing_marker_after_subject_is_ignored() {
    let tree = widget_tree();
    let matcher = Matcher::parse("!Box Label!").unwrap();
    assert_eq!(matcher.subject_index(), 0);
    assert_eq!(ids(&matcher.query_all(&tree.root())), ["box", "status"]);
    assert_eq!(Matcher::parse("A B !").unwrap().subject_index(), 2);
}

#[test]
fn test_attribute_operators() {
    let tree = widget_tree();
    let caption = tree.node(3);
    let cases = [
        (r#"[text^="foo"]"#, true),
        (r#"[text$="bar"]"#, true),
        (r#"[text*="o-b"]"#, true),
        (r#"[text|="foo"]"#, true),
        (r#"[text|="foo-b"]"#, false),
        (r#"[text~="bar"]"#, false),
        (r#"[text~="foo-bar"]"#, true),
        (r#"[text="foo-bar"]"#, true),
        (r#"[text="FOO-BAR"]"#, false),
        (r#"[text="FOO-BAR" i]"#, true),
        (r#"[text^="FOO" i]"#, true),
        (r#"[text!="foo"]"#, true),
        (r#"[text!="foo-bar"]"#, false),
        ("[text]", true),
        ("[missing]", false),
        (r#"[missing=""]"#, true),
        (r#"[missing!="x"]"#, true),
        (r#"[text^=""]"#, false),
        (r#"[text*=""]"#, false),
    ];
    for (selector, expected) in cases {
        assert_eq!(query_selector_bool(selector, &caption).unwrap(), expected, "{selector}");
    }
}

#[test]
fn test_includes_splits_on_spaces_and_tabs() {
    let tree = widget_tree();
    let hint = tree.node(5);
    assert!(query_selector_bool("[words~=alpha]", &hint).unwrap());
    assert!(query_selector_bool("[words~=beta]", &hint).unwrap());
    assert!(query_selector_bool("[words~=GAMMA i]", &hint).unwrap());
    assert!(!query_selector_bool("[words~='alpha beta']", &hint).unwrap());
    assert!(!query_selector_bool("[words~=alp]", &hint).unwrap());
}

#[test]
fn test_bool_tests_the_given_node_only() {
    let tree = widget_tree();
    let root = tree.root();
    assert!(query_selector_bool("Window", &root).unwrap());
    assert!(!query_selector_bool("Label", &root).unwrap());
    assert!(query_selector_bool("Box > Label", &tree.node(3)).unwrap());
}

#[test]
fn test_unique_requires_exactly_one_match() {
    let tree = widget_tree();
    let root = tree.root();

    assert_eq!(query_selector_unique("Slider", &root).unwrap(), None);

    let single = query_selector_unique("#cancel", &root).unwrap();
    assert_eq!(single, Some(tree.node(4)));

    assert_eq!(query_selector_all(".Button", &root).unwrap().len(), 3);
    assert_eq!(query_selector_unique(".Button", &root).unwrap(), None);
}

#[test]
fn test_first_stops_at_first_preorder_match() {
    let tree = widget_tree();
    let first = query_selector_first("Label", &tree.root()).unwrap();
    assert_eq!(first, Some(tree.node(3)));
    assert_eq!(query_selector_first("Slider", &tree.root()).unwrap(), None);
}

#[test]
fn test_objects_matches_each_candidate() {
    let tree = widget_tree();
    let found = query_selector_objects("Label", tree.all()).unwrap();
    assert_eq!(ids(&found), ["caption", "hint", "message"]);

    let found = query_selector_objects("Box::first", tree.all()).unwrap();
    assert_eq!(ids(&found), ["ok", "message"]);
}

#[test]
fn test_matcher_is_reusable_across_trees() {
    let matcher = Matcher::parse("Box > Label:last-child").unwrap();
    let widgets = widget_tree();
    assert_eq!(ids(&matcher.query_all(&widgets.root())), ["message"]);

    let mut other = TestTree::new("Box", "other");
    let _ = other.add(0, "Label", "tail");
    assert_eq!(ids(&matcher.query_all(&other.root())), ["tail"]);
}

#[test]
fn test_negation() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, "Button:not(.Clickable)"), ["help"]);
    assert_eq!(all_ids(&tree, "Label:not(#box > *)"), ["message"]);
    assert!(all_ids(&tree, "Label:not(Box > *)").is_empty());
    assert_eq!(all_ids(&tree, "Box > :not(Label):not([label])"), ["help"]);
}

#[test]
fn test_custom_pseudo_class_and_element() {
    let tree = widget_tree();
    assert_eq!(all_ids(&tree, ":selected"), ["ok"]);
    assert_eq!(all_ids(&tree, "Box::first"), ["ok", "message"]);
    assert_eq!(all_ids(&tree, "#status::first"), ["message"]);
    assert_eq!(all_ids(&tree, "Box::first:selected"), ["ok"]);
    assert!(all_ids(&tree, "Label::first").is_empty());
}

#[test]
fn test_failing_pseudo_hook_warns_and_fails_the_step() {
    let tree = widget_tree();
    assert!(all_ids(&tree, "Label:frobnicate(7)").is_empty());
    assert!(all_ids(&tree, "Box::gizmo").is_empty());

    let warnings = recorded_warnings();
    assert!(warnings.contains(&"[Selector] test tree has no ':frobnicate(7)'".to_string()));
    assert!(warnings.contains(&"[Selector] test tree has no '::gizmo()'".to_string()));
}

/// ```text
/// Window#root
/// ├── Box#list
/// │   ├── Button#i1
/// │   ├── Label#i2
/// │   ├── Button#i3
/// │   ├── Label#i4
/// │   └── Button#i5
/// └── Box#solo
///     └── Label#only
/// ```
fn list_tree() -> TestTree {
    let mut tree = TestTree::new("Window", "root");
    let list = tree.add(0, "Box", "list");
    for (index, kind) in ["Button", "Label", "Button", "Label", "Button"].iter().enumerate() {
        let _ = tree.add(list, kind, &format!("i{}", index + 1));
    }
    let solo = tree.add(0, "Box", "solo");
    let _ = tree.add(solo, "Label", "only");
    tree
}

#[test]
fn test_root_and_empty() {
    let tree = list_tree();
    assert_eq!(all_ids(&tree, ":root"), ["root"]);
    assert_eq!(all_ids(&tree, ":empty"), ["i1", "i2", "i3", "i4", "i5", "only"]);
    assert!(!query_selector_bool(":first-child", &tree.root()).unwrap());
}

#[test]
fn test_child_position_pseudo_classes() {
    let tree = list_tree();
    assert_eq!(all_ids(&tree, "#list > :first-child"), ["i1"]);
    assert_eq!(all_ids(&tree, "#list > :last-child"), ["i5"]);
    assert_eq!(all_ids(&tree, ":only-child"), ["only"]);
    assert_eq!(all_ids(&tree, "#list > :nth-child(odd)"), ["i1", "i3", "i5"]);
    assert_eq!(all_ids(&tree, "#list > :NTH-CHILD(EVEN)"), ["i2", "i4"]);
    assert_eq!(all_ids(&tree, "#list > :nth-child(-n+2)"), ["i1", "i2"]);
    assert_eq!(all_ids(&tree, "#list > :nth-child(4)"), ["i4"]);
    assert_eq!(all_ids(&tree, "#list > :nth-last-child(1)"), ["i5"]);
    assert_eq!(all_ids(&tree, "#list > :nth-last-child(2n)"), ["i2", "i4"]);
}

#[test]
fn test_default_is_nth_child_handles_extreme_positions() {
    let tree = list_tree();
    let first = tree.node(2);
    let last = tree.node(6);
    assert!(first.is_nth_child(1));
    assert!(last.is_nth_child(-1));
    assert!(last.is_nth_child(5));
    for node in [first, last] {
        assert!(!node.is_nth_child(isize::MIN));
        assert!(!node.is_nth_child(isize::MAX));
        assert!(!node.is_nth_child(0));
    }
}

#[test]
fn test_of_type_pseudo_classes() {
    let tree = list_tree();
    assert_eq!(all_ids(&tree, "Button:nth-of-type(2)"), ["i3"]);
    assert_eq!(all_ids(&tree, "Label:nth-last-of-type(1)"), ["i4", "only"]);
    assert_eq!(all_ids(&tree, "Button:first-of-type"), ["i1"]);
    assert_eq!(all_ids(&tree, "Button:last-of-type"), ["i5"]);
    assert_eq!(all_ids(&tree, "Label:only-of-type"), ["only"]);
    assert_eq!(all_ids(&tree, "Box:first-of-type"), ["list"]);
    assert!(all_ids(&tree, "Box:only-of-type").is_empty());
}

#[test]
fn test_invalid_selectors_are_reported() {
    let tree = list_tree();
    let root = tree.root();
    assert!(matches!(
        query_selector_all("A >> B", &root),
        Err(SelectorError::Syntax { .. })
    ));
    assert_eq!(
        query_selector_first("!A > !B", &root).unwrap_err(),
        SelectorError::MultipleSubjects
    );
    assert!(matches!(
        query_selector_bool(":nth-child(banana)", &root),
        Err(SelectorError::InvalidPseudoArgument { pseudo, .. }) if pseudo == "nth-child"
    ));
}
