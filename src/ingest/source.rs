//! Hole sources consumed by the analysis engine

use std::collections::HashMap;

use crate::types::{Blast, HoleRecord};

/// Anything that can hand over a read-only snapshot of a blast's holes.
pub trait HoleSource {
    /// Hole records for `blast_id`, or `None` if the blast is unknown.
    fn hole_records(&self, blast_id: &str) -> Option<Vec<HoleRecord>>;
}

/// In-memory blast registry keyed by blast id.
#[derive(Debug, Default, Clone)]
pub struct BlastStore {
    blasts: HashMap<String, Blast>,
}

impl BlastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a blast. Returns the previous blast under that id.
    pub fn insert(&mut self, blast_id: impl Into<String>, blast: Blast) -> Option<Blast> {
        self.blasts.insert(blast_id.into(), blast)
    }

    pub fn get(&self, blast_id: &str) -> Option<&Blast> {
        self.blasts.get(blast_id)
    }

    pub fn remove(&mut self, blast_id: &str) -> Option<Blast> {
        self.blasts.remove(blast_id)
    }

    pub fn len(&self) -> usize {
        self.blasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blasts.is_empty()
    }

    /// Blast ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.blasts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl HoleSource for BlastStore {
    fn hole_records(&self, blast_id: &str) -> Option<Vec<HoleRecord>> {
        self.blasts.get(blast_id).map(|b| b.holes.clone())
    }
}

impl HoleSource for Blast {
    /// A single blast answers for any id.
    fn hole_records(&self, _blast_id: &str) -> Option<Vec<HoleRecord>> {
        Some(self.holes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_snapshot_is_independent() {
        let mut store = BlastStore::new();
        store.insert("b1", Blast::new("B1", vec![HoleRecord::new("A1").with_burden(3.0)]));

        let mut snapshot = store.hole_records("b1").unwrap();
        snapshot[0].burden = Some(99.0);

        assert_eq!(store.get("b1").unwrap().holes[0].burden, Some(3.0));
    }

    #[test]
    fn test_unknown_blast_is_none() {
        let store = BlastStore::new();
        assert!(store.hole_records("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_sorted() {
        let mut store = BlastStore::new();
        store.insert("c", Blast::default());
        store.insert("a", Blast::default());
        store.insert("b", Blast::default());
        assert_eq!(store.ids(), vec!["a", "b", "c"]);
        assert_eq!(store.remove("b").map(|b| b.holes.len()), Some(0));
        assert_eq!(store.len(), 2);
    }
}
