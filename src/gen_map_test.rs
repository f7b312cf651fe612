use super::*;

#[test]
fn get_version_before_any_write_is_none() {
    let map: GenerationMap<&str, i32> = GenerationMap::new();
    assert_eq!(map.get_version(&"k", 5), None);
}

#[test]
fn get_version_resolves_to_the_latest_entry_at_or_before_g() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("k", Some(1), 1);
    map.add_version("k", Some(2), 3);
    map.add_version("k", Some(3), 7);

    assert_eq!(map.get_version(&"k", 0), None);
    assert_eq!(map.get_version(&"k", 1), Some(&1));
    assert_eq!(map.get_version(&"k", 2), Some(&1));
    assert_eq!(map.get_version(&"k", 3), Some(&2));
    assert_eq!(map.get_version(&"k", 6), Some(&2));
    assert_eq!(map.get_version(&"k", 7), Some(&3));
    assert_eq!(map.get_version(&"k", 1000), Some(&3));
}

#[test]
fn tombstone_makes_the_key_absent_from_that_generation_onward() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("k", Some(1), 1);
    map.add_version("k", None, 2);

    assert_eq!(map.get_version(&"k", 1), Some(&1));
    assert_eq!(map.get_version(&"k", 2), None);
    assert_eq!(map.get_version(&"k", 100), None);
}

#[test]
fn history_before_a_removal_remains_queryable() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("k", Some(1), 1);
    map.add_version("k", None, 2);
    map.add_version("k", Some(2), 3);

    assert_eq!(map.get_version(&"k", 1), Some(&1));
    assert_eq!(map.get_version(&"k", 2), None);
    assert_eq!(map.get_version(&"k", 3), Some(&2));
}

#[test]
#[should_panic(expected = "non-increasing generation")]
fn add_version_rejects_non_increasing_generation() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("k", Some(1), 5);
    map.add_version("k", Some(2), 5);
}

#[test]
fn get_all_entries_skips_keys_not_yet_written_or_tombstoned_at_g() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("a", Some(1), 1);
    map.add_version("b", Some(2), 2);
    map.add_version("c", Some(3), 1);
    map.add_version("c", None, 2);

    let mut at_1: Vec<_> = map.get_all_entries(1).map(|(k, v)| (*k, *v)).collect();
    at_1.sort();
    assert_eq!(at_1, vec![("a", 1), ("c", 3)]);

    let mut at_2: Vec<_> = map.get_all_entries(2).map(|(k, v)| (*k, *v)).collect();
    at_2.sort();
    assert_eq!(at_2, vec![("a", 1), ("b", 2)]);
}

#[test]
fn get_entries_applies_the_key_predicate() {
    let mut map: GenerationMap<&str, i32> = GenerationMap::new();
    map.add_version("foo/a", Some(1), 1);
    map.add_version("foo/b", Some(2), 1);
    map.add_version("bar/a", Some(3), 1);

    let mut matched: Vec<_> = map
        .get_entries(1, |k| k.starts_with("foo/"))
        .map(|(k, v)| (*k, *v))
        .collect();
    matched.sort();
    assert_eq!(matched, vec![("foo/a", 1), ("foo/b", 2)]);
}
