//! Module `gen_map` implements a history-preserving key->value
//! dictionary: a [GenerationMap] records, for every key, the ordered
//! sequence of values (or tombstones) it has held across generations,
//! and can answer "what was the value of `k` as of generation `g`"
//! without copying the top-level keyset on every write.
//!
//! `GenerationMap` itself performs no locking: the facade
//! ([Index][crate::index::Index]) holds both instances behind one
//! `parking_lot::RwLock`, so that a commit's updates to
//! `buildPackageMap` and `ruleMap` become visible to readers atomically.

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::Generation;

/// One key's history: an ordered list of `(generation, value)` entries,
/// strictly increasing in `generation`, where `None` marks removal at
/// that generation.
struct Timeline<V> {
    entries: Vec<(Generation, Option<V>)>,
}

impl<V> Timeline<V> {
    fn new() -> Self {
        Timeline {
            entries: Vec::new(),
        }
    }

    fn last_generation(&self) -> Option<Generation> {
        self.entries.last().map(|(g, _)| *g)
    }

    /// Binary search for the latest entry with `generation <= g`.
    fn version_at(&self, g: Generation) -> Option<&V> {
        // `entries` is sorted ascending by generation; partition_point
        // finds the first index whose generation is > g, so the
        // preceding index (if any) is the latest entry <= g.
        let idx = self.entries.partition_point(|(eg, _)| *eg <= g);
        if idx == 0 {
            None
        } else {
            self.entries[idx - 1].1.as_ref()
        }
    }

    fn earliest_generation(&self) -> Option<Generation> {
        self.entries.first().map(|(g, _)| *g)
    }
}

/// History-preserving `K -> V` dictionary. See the module docs for the
/// full contract.
pub struct GenerationMap<K, V> {
    timelines: HashMap<K, Timeline<V>>,
}

impl<K, V> Default for GenerationMap<K, V> {
    fn default() -> Self {
        GenerationMap::new()
    }
}

impl<K, V> GenerationMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        GenerationMap {
            timelines: HashMap::new(),
        }
    }

    /// Value of `k` at the latest entry with generation `<= g`, or
    /// `None` if no such entry exists or if it is a tombstone. A `g`
    /// greater than every recorded generation for `k` resolves to the
    /// newest value, i.e. "read as of the current state".
    pub fn get_version(&self, k: &K, g: Generation) -> Option<&V> {
        self.timelines.get(k)?.version_at(g)
    }

    /// Append `(g, v)` to `k`'s timeline, creating the timeline if this
    /// is the first write for `k`. `g` must be strictly greater than
    /// the last recorded generation for `k`; violating this is a
    /// programming error in the caller (the facade only ever calls this
    /// with a freshly-allocated generation), so it is enforced with a
    /// debug assertion rather than a recoverable error.
    pub fn add_version(&mut self, k: K, v: Option<V>, g: Generation) {
        let timeline = self.timelines.entry(k).or_insert_with(Timeline::new);
        debug_assert!(
            timeline.last_generation().map_or(true, |last| g > last),
            "add_version called with non-increasing generation"
        );
        timeline.entries.push((g, v));
    }

    /// All `(k, v)` pairs whose latest-`<=`-`g` entry holds a value,
    /// optionally restricted to keys matching `pred`.
    pub fn get_entries<'a>(
        &'a self,
        g: Generation,
        mut pred: impl FnMut(&K) -> bool + 'a,
    ) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.timelines.iter().filter_map(move |(k, timeline)| {
            if !pred(k) {
                return None;
            }
            // Skip keys whose first write hasn't happened yet as of g.
            if timeline.earliest_generation().map_or(true, |eg| eg > g) {
                return None;
            }
            timeline.version_at(g).map(|v| (k, v))
        })
    }

    /// Convenience over [get_entries][GenerationMap::get_entries] with
    /// no key predicate.
    pub fn get_all_entries(&self, g: Generation) -> impl Iterator<Item = (&K, &V)> {
        self.get_entries(g, |_| true)
    }
}

#[cfg(test)]
#[path = "gen_map_test.rs"]
mod gen_map_test;
