//! Missing-key detection between a base locale and a target locale.

use super::tree::{KeyPath, LocaleNode, LocaleTree};

/// Paths present in `base` but absent from `target`, depth-first in base order.
///
/// A nested object in the base that the target lacks (or holds as a non-object)
/// is reported once by its own path rather than leaf by leaf. For leaves only
/// key presence matters; an empty string in the target counts as translated.
pub fn find_missing(base: &LocaleTree, target: &LocaleTree) -> Vec<KeyPath> {
    let mut missing = Vec::new();
    walk(base, Some(target), &KeyPath::default(), &mut missing);
    missing
}

fn walk(base: &LocaleTree, target: Option<&LocaleTree>, prefix: &KeyPath, missing: &mut Vec<KeyPath>) {
    for (key, base_node) in base.iter() {
        let path = prefix.child(key);
        let target_node = target.and_then(|t| t.get(key));
        match base_node {
            LocaleNode::Branch(base_child) => match target_node {
                Some(LocaleNode::Branch(target_child)) => {
                    walk(base_child, Some(target_child), &path, missing)
                }
                _ => missing.push(path),
            },
            _ => {
                if target_node.is_none() {
                    missing.push(path);
                }
            }
        }
    }
}

/// Replace every reported subtree path by the leaf paths beneath it.
///
/// Leaf paths pass through unchanged; the depth-first order is kept.
pub fn expand_to_leaves(base: &LocaleTree, missing: &[KeyPath]) -> Vec<KeyPath> {
    let mut leaves = Vec::with_capacity(missing.len());
    for path in missing {
        match base.get_path(path) {
            Some(LocaleNode::Branch(subtree)) => {
                leaves.extend(subtree.leaf_paths().into_iter().map(|leaf| {
                    let mut segments = path.segments().to_vec();
                    segments.extend_from_slice(leaf.segments());
                    KeyPath::new(segments)
                }))
            }
            _ => leaves.push(path.clone()),
        }
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree(json: &str) -> LocaleTree {
        serde_json::from_str(json).expect("valid locale json")
    }

    #[test]
    fn test_empty_target_reports_top_level_keys() {
        let base = tree(r#"{"a": {"b": "Hello", "c": "World"}, "d": "x"}"#);
        let missing = find_missing(&base, &LocaleTree::new());
        // Whole subtree reported once, not descended into
        assert_eq!(missing, vec!["a", "d"]);
    }

    #[test]
    fn test_partial_target_reports_only_missing_leaves() {
        let base = tree(r#"{"a": {"b": "Hello", "c": "World"}, "d": "x"}"#);
        let target = tree(r#"{"a": {"b": "Privet"}, "d": "x"}"#);
        assert_eq!(find_missing(&base, &target), vec!["a.c"]);
    }

    #[test]
    fn test_target_leaf_where_base_has_object_reports_subtree() {
        let base = tree(r#"{"menu": {"open": "Open"}}"#);
        let target = tree(r#"{"menu": "Menu"}"#);
        assert_eq!(find_missing(&base, &target), vec!["menu"]);
    }

    #[test]
    fn test_empty_string_in_target_counts_as_present() {
        let base = tree(r#"{"title": "Title"}"#);
        let target = tree(r#"{"title": ""}"#);
        assert!(find_missing(&base, &target).is_empty());
    }

    #[test]
    fn test_target_object_where_base_has_leaf_counts_as_present() {
        let base = tree(r#"{"title": "Title"}"#);
        let target = tree(r#"{"title": {"short": "T"}}"#);
        assert!(find_missing(&base, &target).is_empty());
    }

    #[test]
    fn test_extra_target_keys_are_ignored() {
        let base = tree(r#"{"a": "1"}"#);
        let target = tree(r#"{"a": "1", "legacy": "old"}"#);
        assert!(find_missing(&base, &target).is_empty());
    }

    #[test]
    fn test_expand_to_leaves_flattens_reported_subtrees() {
        let base = tree(r#"{"a": {"b": "Hello", "c": {"d": "World"}}, "e": "x"}"#);
        let missing = find_missing(&base, &LocaleTree::new());
        assert_eq!(expand_to_leaves(&base, &missing), vec!["a.b", "a.c.d", "e"]);
    }

    #[test]
    fn test_expand_to_leaves_keeps_leaf_paths() {
        let base = tree(r#"{"a": {"b": "Hello"}}"#);
        let missing = vec![KeyPath::from("a.b")];
        assert_eq!(expand_to_leaves(&base, &missing), vec!["a.b"]);
    }

    #[test]
    fn test_dotted_key_is_reported_as_one_segment() {
        let base = tree(r#"{"errors.notFound": "Not found", "errors": {"gone": "Gone"}}"#);
        let target = tree(r#"{"errors": {}}"#);
        let missing = expand_to_leaves(&base, &find_missing(&base, &target));
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].segments(), ["errors.notFound"]);
        assert_eq!(missing[1].segments(), ["errors", "gone"]);
    }

    #[test]
    fn test_expand_keeps_dotted_keys_inside_subtrees() {
        let base = tree(r#"{"form": {"field.email": "Email"}}"#);
        let missing = expand_to_leaves(&base, &find_missing(&base, &LocaleTree::new()));
        assert_eq!(missing[0].segments(), ["form", "field.email"]);
    }

    #[test]
    fn test_depth_first_order_with_partial_branches() {
        let base = tree(r#"{"z": {"y": "1", "x": {"w": "2", "v": "3"}}, "a": "4"}"#);
        let target = tree(r#"{"z": {"x": {}}}"#);
        assert_eq!(find_missing(&base, &target), vec!["z.y", "z.x.w", "z.x.v", "a"]);
    }

    #[test]
    fn test_empty_object_target_reports_every_leaf() {
        let base = tree(r#"{"a": {"b": "1", "c": {"d": "2"}}}"#);
        let target = tree(r#"{"a": {"c": {}}}"#);
        assert_eq!(find_missing(&base, &target), vec!["a.b", "a.c.d"]);
    }

    // ==================== Properties ====================

    fn arb_tree() -> impl Strategy<Value = LocaleTree> {
        let leaf = "[a-zA-Z ]{0,12}".prop_map(LocaleNode::Leaf);
        let node = leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec(("[a-z]{1,6}", inner), 1..4).prop_map(|entries| {
                let mut t = LocaleTree::new();
                for (k, v) in entries {
                    t.insert(k, v);
                }
                LocaleNode::Branch(t)
            })
        });
        prop::collection::vec(("[a-z]{1,6}", node), 0..5).prop_map(|entries| {
            let mut t = LocaleTree::new();
            for (k, v) in entries {
                t.insert(k, v);
            }
            t
        })
    }

    /// Target mirroring every branch of `base` with no leaves.
    fn skeleton(base: &LocaleTree) -> LocaleTree {
        let mut t = LocaleTree::new();
        for (key, node) in base.iter() {
            if let LocaleNode::Branch(child) = node {
                t.insert(key, skeleton(child));
            }
        }
        t
    }

    proptest! {
        #[test]
        fn prop_skeleton_target_reports_every_leaf_once_in_order(base in arb_tree()) {
            let missing = find_missing(&base, &skeleton(&base));
            prop_assert_eq!(missing, base.leaf_paths());
        }

        #[test]
        fn prop_identical_target_reports_nothing(base in arb_tree()) {
            let target = base.clone();
            prop_assert!(find_missing(&base, &target).is_empty());
        }

        #[test]
        fn prop_expanded_against_empty_target_is_every_leaf_once(base in arb_tree()) {
            let target = LocaleTree::new();
            let expanded = expand_to_leaves(&base, &find_missing(&base, &target));
            prop_assert_eq!(expanded, base.leaf_paths());
        }
    }
}
