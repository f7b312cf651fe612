use super::*;

#[test]
fn package_path_normalizes_leading_and_trailing_slashes() {
    assert_eq!(PackagePath::new("//foo/bar/").as_str(), "foo/bar");
    assert_eq!(PackagePath::new("foo/bar"), PackagePath::new("/foo/bar"));
    assert_eq!(PackagePath::new("//").as_str(), "");
    assert!(PackagePath::root().is_root());
}

#[test]
fn package_path_is_under_respects_component_boundaries() {
    let base = PackagePath::new("foo/bar");
    assert!(PackagePath::new("foo/bar").is_under(&base));
    assert!(PackagePath::new("foo/bar/baz").is_under(&base));
    assert!(!PackagePath::new("foo/barbaz").is_under(&base));
    assert!(!PackagePath::new("foo").is_under(&base));
    assert!(PackagePath::new("anything/at/all").is_under(&PackagePath::root()));
}

#[test]
fn render_target_formats_double_slash_form() {
    let pkg = PackagePath::new("foo/bar");
    assert_eq!(render_target(&pkg, "a"), "//foo/bar:a");
    assert_eq!(render_target(&PackagePath::root(), "a"), "//:a");
}

#[test]
fn internal_raw_build_rule_sorts_and_dedups_deps() {
    let rule: InternalRawBuildRule<()> = InternalRawBuildRule::new((), vec![3, 1, 2, 1, 3]);
    assert_eq!(rule.deps, vec![1, 2, 3]);
}

#[test]
fn internal_raw_build_rule_equality_covers_node_and_deps() {
    let a: InternalRawBuildRule<i32> = InternalRawBuildRule::new(1, vec![1, 2]);
    let b: InternalRawBuildRule<i32> = InternalRawBuildRule::new(1, vec![2, 1]);
    let c: InternalRawBuildRule<i32> = InternalRawBuildRule::new(2, vec![1, 2]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn changes_is_empty_iff_all_three_lists_are_empty() {
    let mut changes: Changes<(i32, i32), ()> = Changes::new();
    assert!(changes.is_empty());
    changes.removed.push(PackagePath::new("x"));
    assert!(!changes.is_empty());
}
