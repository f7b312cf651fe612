use super::*;
use crate::error::Error;

fn pkg(dir: &str, rules: Vec<InternalRule<i32>>) -> InternalPackage<i32> {
    InternalPackage {
        dir: PackagePath::new(dir),
        rules,
    }
}

fn rule(name: &str, handle: TargetHandle, node: i32, deps: Vec<TargetHandle>) -> InternalRule<i32> {
    InternalRule {
        name: name.to_string(),
        handle,
        rule: InternalRawBuildRule::new(node, deps),
    }
}

fn no_resolve(_dir: &PackagePath, _name: &str) -> TargetHandle {
    panic!("resolve_handle should not be called in this scenario")
}

#[test]
fn adding_a_new_package_produces_one_package_delta_and_one_rule_delta_per_rule() {
    let package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();

    let changes = InternalChanges {
        added: vec![pkg("foo/bar", vec![rule("a", 0, 1, vec![])])],
        modified: vec![],
        removed: vec![],
    };

    let deltas = compute_deltas(&changes, 0, &package_map, &rule_map, no_resolve).unwrap();
    assert_eq!(deltas.package_deltas.len(), 1);
    assert_eq!(deltas.rule_deltas.len(), 1);
    assert!(matches!(
        &deltas.package_deltas[0],
        PackageDelta::Updated(dir, names) if dir.as_str() == "foo/bar" && names == &vec!["a".to_string()]
    ));
}

#[test]
fn adding_a_package_that_already_exists_at_g_is_an_error() {
    let mut package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();
    package_map.add_version(PackagePath::new("foo/bar"), Some(vec!["a".to_string()]), 1);

    let changes = InternalChanges {
        added: vec![pkg("foo/bar", vec![rule("a", 0, 1, vec![])])],
        modified: vec![],
        removed: vec![],
    };

    let err = compute_deltas(&changes, 1, &package_map, &rule_map, no_resolve).unwrap_err();
    assert!(matches!(err, Error::PackageAlreadyPresent(_, 1)));
}

#[test]
fn removing_an_absent_package_is_an_error() {
    let package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();

    let changes = InternalChanges {
        added: vec![],
        modified: vec![],
        removed: vec![PackagePath::new("foo/bar")],
    };

    let err = compute_deltas(&changes, 0, &package_map, &rule_map, no_resolve).unwrap_err();
    assert!(matches!(err, Error::PackageAbsent(_, 0)));
}

#[test]
fn removing_a_present_package_tombstones_the_package_and_every_one_of_its_rules() {
    let mut package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let mut rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();
    package_map.add_version(
        PackagePath::new("foo/bar"),
        Some(vec!["a".to_string(), "b".to_string()]),
        1,
    );
    rule_map.add_version(0, Some(InternalRawBuildRule::new(1, vec![])), 1);
    rule_map.add_version(1, Some(InternalRawBuildRule::new(2, vec![])), 1);

    let changes = InternalChanges {
        added: vec![],
        modified: vec![],
        removed: vec![PackagePath::new("foo/bar")],
    };

    let resolve = |_dir: &PackagePath, name: &str| -> TargetHandle {
        if name == "a" {
            0
        } else {
            1
        }
    };

    let deltas = compute_deltas(&changes, 1, &package_map, &rule_map, resolve).unwrap();
    assert_eq!(deltas.package_deltas, vec![PackageDelta::Removed(PackagePath::new("foo/bar"))]);
    assert_eq!(deltas.rule_deltas.len(), 2);
    assert!(deltas
        .rule_deltas
        .iter()
        .all(|d| matches!(d, RuleDelta::Removed(_))));
}

#[test]
fn a_modified_package_identical_to_the_current_state_produces_no_deltas() {
    let mut package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let mut rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();
    package_map.add_version(PackagePath::new("foo/bar"), Some(vec!["a".to_string()]), 1);
    rule_map.add_version(0, Some(InternalRawBuildRule::new(1, vec![])), 1);

    let changes = InternalChanges {
        added: vec![],
        modified: vec![pkg("foo/bar", vec![rule("a", 0, 1, vec![])])],
        removed: vec![],
    };

    let resolve = |_dir: &PackagePath, _name: &str| -> TargetHandle { 0 };

    let deltas = compute_deltas(&changes, 1, &package_map, &rule_map, resolve).unwrap();
    assert!(deltas.is_empty());
}

#[test]
fn a_modified_package_with_one_changed_rule_emits_only_that_rules_delta() {
    let mut package_map: GenerationMap<PackagePath, Vec<RuleName>> = GenerationMap::new();
    let mut rule_map: GenerationMap<TargetHandle, InternalRawBuildRule<i32>> = GenerationMap::new();
    package_map.add_version(
        PackagePath::new("foo/bar"),
        Some(vec!["a".to_string(), "b".to_string()]),
        1,
    );
    rule_map.add_version(0, Some(InternalRawBuildRule::new(1, vec![])), 1);
    rule_map.add_version(1, Some(InternalRawBuildRule::new(2, vec![])), 1);

    let changes = InternalChanges {
        added: vec![],
        modified: vec![pkg(
            "foo/bar",
            vec![rule("a", 0, 1, vec![]), rule("b", 1, 99, vec![])],
        )],
        removed: vec![],
    };

    let resolve = |_dir: &PackagePath, name: &str| -> TargetHandle { if name == "a" { 0 } else { 1 } };

    let deltas = compute_deltas(&changes, 1, &package_map, &rule_map, resolve).unwrap();
    assert_eq!(deltas.rule_deltas.len(), 1);
    assert!(matches!(&deltas.rule_deltas[0], RuleDelta::Updated(1, r) if r.target_node == 99));
}

#[test]
fn diff_rules_detects_additions_updates_and_removals() {
    let old = vec![
        (0, InternalRawBuildRule::new(1, vec![])),
        (1, InternalRawBuildRule::new(2, vec![])),
    ];
    let new = vec![
        (0, InternalRawBuildRule::new(1, vec![])),
        (2, InternalRawBuildRule::new(3, vec![])),
    ];

    let mut changes = diff_rules(&old, &new);
    changes.sort_by_key(|d| match d {
        RuleDelta::Updated(h, _) => *h,
        RuleDelta::Removed(h) => *h,
    });

    assert_eq!(changes.len(), 2);
    assert!(matches!(&changes[0], RuleDelta::Updated(2, _)));
    assert!(matches!(&changes[1], RuleDelta::Removed(1)));
}
