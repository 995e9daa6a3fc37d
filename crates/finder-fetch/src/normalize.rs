//! Record normalization.
//!
//! Upstream athlete payloads come in several shapes depending on which API
//! version and join produced them. Each canonical attribute is resolved from
//! an ordered list of [`Candidate`]s; the first one that yields a non-blank
//! string wins. Records without a resolvable owner id or name are dropped.

use serde_json::Value;
use tracing::trace;

use finder_types::{CanonicalRecord, RecordId};

/// One way of reading a string attribute out of a raw record.
#[derive(Debug, Clone, Copy)]
pub enum Candidate {
    /// JSON pointer to a string field
    Field(&'static str),

    /// Two string fields joined with a space (either side may be missing)
    FullName {
        first: &'static str,
        last: &'static str,
    },

    /// Array of team objects (or bare strings) joined with ", "
    JoinedNames(&'static str),
}

impl Candidate {
    fn extract(&self, record: &Value) -> Option<String> {
        match *self {
            Candidate::Field(pointer) => record
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string),
            Candidate::FullName { first, last } => {
                let first = record.pointer(first).and_then(Value::as_str).unwrap_or("");
                let last = record.pointer(last).and_then(Value::as_str).unwrap_or("");
                Some(format!("{} {}", first.trim(), last.trim()))
            }
            Candidate::JoinedNames(pointer) => {
                let items = record.pointer(pointer)?.as_array()?;
                let names: Vec<&str> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.as_str()),
                        Value::Object(_) => item.get("name").and_then(Value::as_str),
                        _ => None,
                    })
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect();
                Some(names.join(", "))
            }
        }
    }
}

pub const NAME_CANDIDATES: &[Candidate] = &[
    Candidate::Field("/name"),
    Candidate::Field("/fullName"),
    Candidate::Field("/displayName"),
    Candidate::FullName {
        first: "/firstName",
        last: "/lastName",
    },
];

pub const IMAGE_CANDIDATES: &[Candidate] = &[
    Candidate::Field("/avatar"),
    Candidate::Field("/avatarUrl"),
    Candidate::Field("/photoUrl"),
    Candidate::Field("/imageUrl"),
    Candidate::Field("/image"),
    Candidate::Field("/user/avatar"),
    Candidate::Field("/user/avatarUrl"),
];

pub const LOCATION_CANDIDATES: &[Candidate] = &[
    Candidate::Field("/location"),
    Candidate::Field("/city"),
    Candidate::Field("/user/location"),
    Candidate::Field("/country"),
];

pub const AFFILIATION_CANDIDATES: &[Candidate] = &[
    Candidate::Field("/club"),
    Candidate::Field("/team/name"),
    Candidate::Field("/teamName"),
    Candidate::JoinedNames("/teams"),
];

/// Owner object ids, in priority order.
pub const PRIMARY_ID_POINTERS: &[&str] = &["/user/id", "/owner/id"];

/// The profile's own ids, in priority order.
pub const SECONDARY_ID_POINTERS: &[&str] = &["/id", "/profileId"];

/// Return the first candidate that resolves to a non-blank string, trimmed.
pub fn resolve_first(record: &Value, candidates: &[Candidate]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        candidate
            .extract(record)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Return the first present id among `pointers`.
///
/// Numbers (including `0`) and non-blank strings are ids. `null`, missing
/// fields and any other JSON type are absent.
pub fn resolve_id(record: &Value, pointers: &[&str]) -> Option<RecordId> {
    pointers.iter().find_map(|pointer| match record.pointer(pointer)? {
        Value::Number(n) => Some(RecordId::new(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(RecordId::new(s.trim())),
        _ => None,
    })
}

/// Convert one raw upstream record, or reject it.
pub fn normalize_record(raw: &Value) -> Option<CanonicalRecord> {
    if !raw.is_object() {
        return None;
    }

    let id = resolve_id(raw, PRIMARY_ID_POINTERS)?;
    let display_name = resolve_first(raw, NAME_CANDIDATES)?;

    Some(CanonicalRecord {
        id,
        secondary_id: resolve_id(raw, SECONDARY_ID_POINTERS),
        display_name,
        image_ref: resolve_first(raw, IMAGE_CANDIDATES),
        location_label: resolve_first(raw, LOCATION_CANDIDATES),
        affiliation_label: resolve_first(raw, AFFILIATION_CANDIDATES),
    })
}

/// Normalize a batch, dropping rejected records.
pub fn normalize_records(raw: &[Value]) -> Vec<CanonicalRecord> {
    let records: Vec<CanonicalRecord> = raw.iter().filter_map(normalize_record).collect();
    let dropped = raw.len() - records.len();
    if dropped > 0 {
        trace!(dropped, kept = records.len(), "Dropped unresolvable records");
    }
    records
}
