//! Tests for child registry operations on nested views
//!
//! Covers add/remove/rename/move, duplicate detection and the name
//! availability check used by the "new view" and "rename" forms.

use rstest::{fixture, rstest};

use nestview::domain::{DomainError, LeafKind, ValidationKind, ViewId, ViewTemplate, ViewTree};
use nestview::util::testing::{init_test_setup, sample_tree};

#[fixture]
fn tree() -> ViewTree {
    init_test_setup();
    sample_tree()
}

fn team(tree: &ViewTree) -> ViewId {
    tree.resolve_path("team").unwrap()
}

fn child_names(tree: &ViewTree, id: ViewId) -> Vec<String> {
    tree.list_children(id)
        .into_iter()
        .filter_map(|c| tree.name(c).map(str::to_string))
        .collect()
}

// ============================================================
// add_view() tests
// ============================================================

#[rstest]
fn given_nested_view_when_adding_then_child_exists(mut tree: ViewTree) {
    let team = team(&tree);

    let id = tree
        .add_view(team, "tests", ViewTemplate::Leaf(LeafKind::All))
        .unwrap();

    assert!(tree.exists(team, "tests"));
    assert_eq!(tree.get_child(team, "tests"), Some(id));
    assert_eq!(tree.get(id).unwrap().owner(), Some(team));
}

#[rstest]
fn given_existing_name_when_adding_again_then_duplicate_and_children_unchanged(mut tree: ViewTree) {
    let team = team(&tree);
    let before = tree.list_children(team);

    let result = tree.add_view(team, "builds", ViewTemplate::nested());

    assert_eq!(result, Err(DomainError::DuplicateName("builds".to_string())));
    assert_eq!(tree.list_children(team), before);
}

#[rstest]
fn given_added_views_when_listing_then_insertion_order_is_kept(mut tree: ViewTree) {
    let team = team(&tree);
    tree.add_view(team, "aaa", ViewTemplate::nested()).unwrap();

    assert_eq!(child_names(&tree, team), vec!["builds", "deploys", "aaa"]);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("a/b")]
fn given_invalid_name_when_adding_then_rejected(mut tree: ViewTree, #[case] name: &str) {
    let root = tree.root();

    let result = tree.add_view(root, name, ViewTemplate::nested());

    assert!(matches!(result, Err(DomainError::InvalidName { .. })), "{result:?}");
}

#[rstest]
fn given_leaf_parent_when_adding_then_not_nested(mut tree: ViewTree) {
    let everything = tree.resolve_path("everything").unwrap();

    let result = tree.add_view(everything, "child", ViewTemplate::nested());

    assert!(matches!(result, Err(DomainError::NotNested(_))));
}

#[rstest]
fn given_bad_pattern_when_adding_list_then_invalid_pattern(mut tree: ViewTree) {
    let root = tree.root();

    let result = tree.add_view(
        root,
        "broken",
        ViewTemplate::Leaf(LeafKind::list(Some("build-("), &[])),
    );

    assert!(matches!(result, Err(DomainError::InvalidPattern { .. })));
    assert!(!tree.exists(root, "broken"));
}

// ============================================================
// remove_view() tests
// ============================================================

#[rstest]
fn given_nested_child_when_removing_then_whole_subtree_goes(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);
    let builds = tree.get_child(team, "builds").unwrap();
    let len_before = tree.len();

    assert!(tree.remove_view(root, "team").unwrap());

    assert!(!tree.exists(root, "team"));
    assert!(tree.get(team).is_none());
    assert!(tree.get(builds).is_none());
    assert_eq!(tree.len(), len_before - 3);
}

#[rstest]
fn given_missing_name_when_removing_then_noop(mut tree: ViewTree) {
    let root = tree.root();
    let len_before = tree.len();

    assert!(!tree.remove_view(root, "ghost").unwrap());
    assert_eq!(tree.len(), len_before);
}

#[rstest]
fn given_default_child_when_removing_then_default_cleared(mut tree: ViewTree) {
    let team = team(&tree);
    tree.set_default_view(team, Some("builds")).unwrap();

    tree.remove_view(team, "builds").unwrap();

    assert_eq!(tree.default_view(team), None);
}

// ============================================================
// rename_view() tests
// ============================================================

#[rstest]
fn given_view_when_renaming_then_lookup_follows_new_name(mut tree: ViewTree) {
    let team = team(&tree);
    let builds = tree.get_child(team, "builds").unwrap();

    tree.rename_view(team, "builds", "ci").unwrap();

    assert_eq!(tree.get_child(team, "ci"), Some(builds));
    assert!(!tree.exists(team, "builds"));
}

#[rstest]
fn given_sibling_name_when_renaming_then_duplicate(mut tree: ViewTree) {
    let team = team(&tree);

    let result = tree.rename_view(team, "builds", "deploys");

    assert_eq!(result, Err(DomainError::DuplicateName("deploys".to_string())));
    assert!(tree.exists(team, "builds"));
}

#[rstest]
fn given_default_child_when_renaming_then_default_follows(mut tree: ViewTree) {
    let team = team(&tree);
    tree.set_default_view(team, Some("deploys")).unwrap();

    tree.rename_view(team, "deploys", "releases").unwrap();

    assert_eq!(tree.default_view(team), Some("releases"));
    assert_eq!(tree.resolve_default(team), tree.get_child(team, "releases"));
}

// ============================================================
// move_view() tests
// ============================================================

#[rstest]
fn given_leaf_when_moving_then_owner_and_children_update(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);
    let everything = tree.get_child(root, "everything").unwrap();

    tree.move_view(everything, team).unwrap();

    assert_eq!(tree.get(everything).unwrap().owner(), Some(team));
    assert!(tree.exists(team, "everything"));
    assert!(!tree.exists(root, "everything"));
    assert_eq!(tree.path_of(everything).unwrap(), "team/everything");
}

#[rstest]
fn given_view_when_moving_into_itself_then_cycle_detected(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);
    let sub = tree.add_view(team, "sub", ViewTemplate::nested()).unwrap();

    assert!(matches!(tree.move_view(team, sub), Err(DomainError::CycleDetected(_))));
    assert!(matches!(tree.move_view(team, team), Err(DomainError::CycleDetected(_))));
    assert_eq!(tree.get(team).unwrap().owner(), Some(root));
}

#[rstest]
fn given_root_when_moving_then_root_immutable(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);

    assert_eq!(tree.move_view(root, team), Err(DomainError::RootImmutable));
}

#[rstest]
fn given_name_taken_in_target_when_moving_then_duplicate(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);
    let other = tree.add_view(team, "everything", ViewTemplate::nested()).unwrap();
    let everything = tree.get_child(root, "everything").unwrap();

    let result = tree.move_view(everything, team);

    assert!(matches!(result, Err(DomainError::DuplicateName(_))));
    assert_eq!(tree.get_child(team, "everything"), Some(other));
    assert_eq!(tree.get(everything).unwrap().owner(), Some(root));
}

// ============================================================
// check_name_available() tests
// ============================================================

#[rstest]
#[case(None, None, true)]
#[case(Some(""), None, true)]
#[case(Some("  "), None, true)]
#[case(Some("fresh"), None, true)]
#[case(Some("builds"), None, false)]
#[case(Some("builds"), Some("builds"), true)]
#[case(Some("deploys"), Some("builds"), false)]
fn given_candidate_when_checking_name_then_matches_expectation(
    tree: ViewTree,
    #[case] candidate: Option<&str>,
    #[case] current: Option<&str>,
    #[case] expected_ok: bool,
) {
    let team = team(&tree);

    let validation = tree.check_name_available(team, candidate, current);

    assert_eq!(validation.is_ok(), expected_ok, "{validation:?}");
    if !expected_ok {
        assert_eq!(validation.kind, ValidationKind::Error);
        assert!(validation.message.unwrap().contains("already exists"));
    }
}

#[rstest]
fn given_padded_candidate_when_checked_and_added_then_both_agree(mut tree: ViewTree) {
    let team = team(&tree);

    let validation = tree.check_name_available(team, Some(" builds"), None);
    let added = tree.add_view(team, " builds", ViewTemplate::Leaf(LeafKind::All));

    assert!(validation.is_ok(), "{validation:?}");
    assert!(added.is_ok(), "{added:?}");
    let taken = tree.check_name_available(team, Some(" builds"), None);
    assert_eq!(taken.kind, ValidationKind::Error);
}

#[rstest]
fn given_stale_id_when_looking_up_then_absent(mut tree: ViewTree) {
    let root = tree.root();
    let team = team(&tree);
    tree.remove_view(root, "team").unwrap();

    assert!(!tree.contains(team));
    assert!(tree.list_children(team).is_empty());
    assert_eq!(tree.node(team).err(), Some(DomainError::StaleView));
}
