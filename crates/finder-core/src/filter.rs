//! Query filter.
//!
//! Plain case-insensitive substring matching over name, location and
//! affiliation. No ranking: results keep accumulator order.

use finder_types::{CanonicalRecord, MIN_QUERY_LEN};

/// Trim and lower-case a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Whether `query` is long enough to be matched at all.
pub fn is_searchable(query: &str, min_len: usize) -> bool {
    normalize_query(query).chars().count() >= min_len
}

/// Records matching `query`, gated at [`MIN_QUERY_LEN`].
pub fn filter<'a>(records: &'a [CanonicalRecord], query: &str) -> Vec<&'a CanonicalRecord> {
    filter_with_min_len(records, query, MIN_QUERY_LEN)
}

/// Records matching `query`; empty when the query is shorter than `min_len`.
pub fn filter_with_min_len<'a>(
    records: &'a [CanonicalRecord],
    query: &str,
    min_len: usize,
) -> Vec<&'a CanonicalRecord> {
    let needle = normalize_query(query);
    if needle.chars().count() < min_len {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| matches(record, &needle))
        .collect()
}

/// Number of records [`filter_with_min_len`] would return.
pub fn count_matches(records: &[CanonicalRecord], query: &str, min_len: usize) -> usize {
    let needle = normalize_query(query);
    if needle.chars().count() < min_len {
        return 0;
    }
    records.iter().filter(|record| matches(record, &needle)).count()
}

fn matches(record: &CanonicalRecord, needle: &str) -> bool {
    record
        .searchable_labels()
        .any(|label| label.to_lowercase().contains(needle))
}
