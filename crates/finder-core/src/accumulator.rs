//! Accumulated working set.
//!
//! Pages are merged in arrival order. A record whose dedupe key was already
//! seen is dropped; the first occurrence wins. The set never grows past the
//! hard cap.

use std::collections::HashSet;

use finder_types::{CanonicalRecord, DedupeKey, HARD_CAP};

/// Merge `incoming` after `existing`, deduplicated, capped at [`HARD_CAP`].
pub fn merge(existing: &[CanonicalRecord], incoming: &[CanonicalRecord]) -> Vec<CanonicalRecord> {
    merge_with_cap(existing, incoming, HARD_CAP)
}

/// Merge with an explicit cap.
pub fn merge_with_cap(
    existing: &[CanonicalRecord],
    incoming: &[CanonicalRecord],
    cap: usize,
) -> Vec<CanonicalRecord> {
    let mut accumulator = Accumulator::with_cap(cap);
    accumulator.extend(existing);
    accumulator.extend(incoming);
    accumulator.into_records()
}

/// Whether a set of `len` records has reached `cap`.
pub fn is_at_cap(len: usize, cap: usize) -> bool {
    len >= cap
}

/// Incremental form of [`merge`], owned by one search session.
///
/// Keeps the seen-key index so each page merge costs only the page size.
#[derive(Debug, Clone)]
pub struct Accumulator {
    records: Vec<CanonicalRecord>,
    seen: HashSet<DedupeKey>,
    cap: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::with_cap(HARD_CAP)
    }
}

impl Accumulator {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    /// Append the new entries of `incoming`; returns how many were added.
    pub fn extend(&mut self, incoming: &[CanonicalRecord]) -> usize {
        let before = self.records.len();
        for record in incoming {
            if self.is_full() {
                break;
            }
            if self.seen.insert(record.dedupe_key()) {
                self.records.push(record.clone());
            }
        }
        self.records.len() - before
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn is_full(&self) -> bool {
        is_at_cap(self.records.len(), self.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, name: &str) -> CanonicalRecord {
        CanonicalRecord::new(id, name)
    }

    fn batch(range: std::ops::Range<u64>) -> Vec<CanonicalRecord> {
        range.map(|i| record(i, &format!("Athlete {}", i))).collect()
    }

    #[test]
    fn test_merge_preserves_order() {
        let a = vec![record(3, "C"), record(1, "A")];
        let b = vec![record(2, "B"), record(0, "Z")];
        let merged = merge(&a, &b);
        let names: Vec<_> = merged.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B", "Z"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let a = vec![record(1, "Ana Lima").with_location("Porto")];
        let b = vec![record(1, "  ANA LIMA").with_location("Lisbon"), record(2, "Rui")];
        let merged = merge(&a, &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].location_label.as_deref(), Some("Porto"));
    }

    #[test]
    fn test_same_name_different_id_is_kept() {
        let merged = merge(&[record(1, "Ana")], &[record(2, "Ana")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_duplicates_inside_incoming() {
        let merged = merge(&[], &[record(1, "Ana"), record(1, "ana"), record(1, "Ana ")]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = batch(0..20);
        let b = batch(10..40);
        let once = merge(&a, &b);
        let twice = merge(&once, &b);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cap_truncates() {
        let a = batch(0..4990);
        let b = batch(4990..5100);
        let merged = merge(&a, &b);
        assert_eq!(merged.len(), HARD_CAP);
        assert_eq!(merged.last().unwrap().id.as_str(), "4999");

        let again = merge(&merged, &batch(6000..6010));
        assert_eq!(again.len(), HARD_CAP);
        assert_eq!(again, merged);
    }

    #[test]
    fn test_accumulator_matches_pure_merge() {
        let pages = [batch(0..30), batch(20..50), batch(45..60)];
        let mut acc = Accumulator::with_cap(100);
        let mut pure: Vec<CanonicalRecord> = Vec::new();
        for page in &pages {
            acc.extend(page);
            pure = merge_with_cap(&pure, page, 100);
        }
        assert_eq!(acc.records(), pure.as_slice());
        assert_eq!(acc.len(), 60);
    }

    #[test]
    fn test_accumulator_reports_added_and_full() {
        let mut acc = Accumulator::with_cap(5);
        assert_eq!(acc.extend(&batch(0..3)), 3);
        assert_eq!(acc.extend(&batch(2..4)), 1);
        assert!(!acc.is_full());
        assert_eq!(acc.extend(&batch(4..10)), 1);
        assert!(acc.is_full());
        assert_eq!(acc.extend(&batch(10..12)), 0);
        assert_eq!(acc.len(), 5);
    }
}
