//! The authoritative set of selected records.
//!
//! [`SelectionSet`] is independent of whatever page is currently displayed:
//! a record stays selected after the user pages or searches away from it.
//! Entries are unique by id and keep insertion order, which drives both the
//! chart series order and the persisted snapshot.

use indexmap::IndexMap;

use crate::error::LookupError;
use crate::models::Record;

/// Outcome of [`SelectionSet::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    /// The record was not selected and has been appended.
    Added(Record),
    /// The record was selected and has been removed.
    Removed(Record),
}

impl Toggled {
    /// Membership of the toggled id after the operation.
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    pub fn record(&self) -> &Record {
        match self {
            Self::Added(r) | Self::Removed(r) => r,
        }
    }
}

/// Ordered, id-unique collection of selected records.
///
/// Backed by an [`IndexMap`] keyed by record id, so `contains` and `toggle`
/// are constant time while iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: IndexMap<i64, Record>,
    seeded: bool,
    restored: bool,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load previously persisted contents.
    ///
    /// Duplicate ids keep their first occurrence. Any restore, including an
    /// empty one, marks the set as holding persisted data and disables
    /// seeding.
    pub fn restore(&mut self, records: impl IntoIterator<Item = Record>) {
        self.entries.clear();
        for record in records {
            self.entries.entry(record.id).or_insert(record);
        }
        self.restored = true;
    }

    /// Remove `id` if selected, otherwise resolve and append it.
    ///
    /// `resolve` is only called when the id is absent. If it cannot produce
    /// the record the set is left untouched.
    pub fn toggle<F>(&mut self, id: i64, resolve: F) -> Result<Toggled, LookupError>
    where
        F: FnOnce(i64) -> Option<Record>,
    {
        if let Some(removed) = self.entries.shift_remove(&id) {
            return Ok(Toggled::Removed(removed));
        }
        let record = resolve(id).ok_or(LookupError::NotOnPage { id })?;
        self.entries.insert(id, record.clone());
        Ok(Toggled::Added(record))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: i64) -> Option<&Record> {
        self.entries.get(&id)
    }

    /// Full contents in insertion order, for full-overwrite persistence.
    pub fn snapshot_for_persistence(&self) -> Vec<Record> {
        self.entries.values().cloned().collect()
    }

    /// Seed the set from the first page of the session.
    ///
    /// Runs at most once: after the first call the set is marked seeded and
    /// later calls return nothing. Seeding only takes effect while the set is
    /// empty and was not restored from storage. Returns the records added, in
    /// order.
    pub fn seed_if_empty(&mut self, candidates: &[Record], limit: usize) -> Vec<Record> {
        if self.seeded {
            return Vec::new();
        }
        self.seeded = true;
        if self.restored || !self.entries.is_empty() {
            return Vec::new();
        }

        let mut added = Vec::new();
        for record in candidates {
            if added.len() >= limit {
                break;
            }
            if self.entries.contains_key(&record.id) {
                continue;
            }
            self.entries.insert(record.id, record.clone());
            added.push(record.clone());
        }
        added
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Whether the contents came from persisted storage.
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entries.values()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(id: i64) -> Record {
        Record::new(id, format!("title {}", id), format!("body {}", id))
    }

    fn page(ids: impl IntoIterator<Item = i64>) -> Vec<Record> {
        ids.into_iter().map(record).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        let added = set.toggle(3, |id| Some(record(id))).unwrap();
        assert!(added.is_selected());
        assert!(set.contains(3));

        let removed = set.toggle(3, |_| panic!("resolve must not run on removal")).unwrap();
        assert!(!removed.is_selected());
        assert_eq!(removed.record().id, 3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_unresolvable_leaves_set_unchanged() {
        let mut set = SelectionSet::new();
        set.toggle(1, |id| Some(record(id))).unwrap();
        let err = set.toggle(99, |_| None).unwrap_err();
        assert_eq!(err, LookupError::NotOnPage { id: 99 });
        assert_eq!(set.ids(), vec![1]);
    }

    #[test]
    fn test_removal_preserves_order_of_rest() {
        let mut set = SelectionSet::new();
        for id in [5, 1, 4, 2] {
            set.toggle(id, |id| Some(record(id))).unwrap();
        }
        set.toggle(1, |_| None).unwrap();
        assert_eq!(set.ids(), vec![5, 4, 2]);
    }

    #[test]
    fn test_seed_takes_first_limit_candidates() {
        let mut set = SelectionSet::new();
        let added = set.seed_if_empty(&page(1..=8), 5);
        assert_eq!(added.len(), 5);
        assert_eq!(set.ids(), vec![1, 2, 3, 4, 5]);
        assert!(set.is_seeded());
    }

    #[test]
    fn test_seed_runs_once() {
        let mut set = SelectionSet::new();
        set.seed_if_empty(&page(1..=5), 5);
        set.toggle(2, |_| None).unwrap();
        let added = set.seed_if_empty(&page(6..=10), 5);
        assert!(added.is_empty());
        assert_eq!(set.ids(), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_seed_skipped_after_restore() {
        let mut set = SelectionSet::new();
        set.restore(page([9, 8]));
        let added = set.seed_if_empty(&page(1..=5), 5);
        assert!(added.is_empty());
        assert_eq!(set.ids(), vec![9, 8]);
        assert!(set.is_seeded());
    }

    #[test]
    fn test_seed_skipped_after_empty_restore() {
        let mut set = SelectionSet::new();
        set.restore(Vec::new());
        assert!(set.is_restored());
        assert!(set.seed_if_empty(&page(1..=5), 5).is_empty());
        assert!(set.is_empty());
        assert!(set.is_seeded());
    }

    #[test]
    fn test_seed_with_zero_limit_marks_seeded() {
        let mut set = SelectionSet::new();
        assert!(set.seed_if_empty(&page(1..=5), 0).is_empty());
        assert!(set.is_seeded());
        assert!(set.seed_if_empty(&page(1..=5), 5).is_empty());
    }

    #[test]
    fn test_restore_deduplicates() {
        let mut set = SelectionSet::new();
        let mut records = page([1, 2]);
        records.push(Record::new(1, "other", "other"));
        set.restore(records);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().title, "title 1");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut set = SelectionSet::new();
        for id in [4, 2, 7] {
            set.toggle(id, |id| Some(record(id))).unwrap();
        }
        let mut reloaded = SelectionSet::new();
        reloaded.restore(set.snapshot_for_persistence());
        assert_eq!(reloaded.snapshot_for_persistence(), set.snapshot_for_persistence());
    }

    proptest! {
        #[test]
        fn prop_toggles_never_duplicate_ids(ids in proptest::collection::vec(0i64..12, 0..64)) {
            let mut set = SelectionSet::new();
            for id in ids {
                set.toggle(id, |id| Some(record(id))).unwrap();
                let mut seen = set.ids();
                let len = seen.len();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), len);
            }
        }
    }
}
