//! Response envelope handling.
//!
//! The listing endpoint has shipped several envelope shapes over time. The
//! record array and the pagination signal are located by probing a fixed
//! list of JSON pointers.

use serde_json::Value;

/// Places the record array may live, in priority order.
pub const RECORD_CONTAINERS: &[&str] = &["/items", "/data/items", "/athletes", "/data/athletes"];

/// Explicit boolean "more pages" flags, in priority order.
pub const HAS_NEXT_FLAGS: &[&str] = &[
    "/hasNextPage",
    "/meta/hasNextPage",
    "/pagination/hasNextPage",
    "/data/hasNextPage",
];

/// "Next page" indicators; any non-null, non-false value means more pages.
pub const NEXT_PAGE_MARKERS: &[&str] = &["/nextPage", "/meta/nextPage", "/pagination/nextPage"];

/// Locate the raw record array in a payload.
///
/// The first container that is an array wins; a payload that is itself an
/// array is used as-is. Anything else yields an empty slice.
pub fn extract_records(payload: &Value) -> &[Value] {
    RECORD_CONTAINERS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_array))
        .or_else(|| payload.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Pagination signal carried by the payload itself, if any.
pub fn explicit_has_more(payload: &Value) -> Option<bool> {
    HAS_NEXT_FLAGS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_bool))
        .or_else(|| {
            NEXT_PAGE_MARKERS.iter().find_map(|pointer| {
                payload
                    .pointer(pointer)
                    .map(|marker| !matches!(marker, Value::Null | Value::Bool(false)))
            })
        })
}

/// Decide whether another page may exist.
///
/// Prefers an explicit signal. Without one, a full page is taken to mean
/// "maybe more"; this over-predicts when the total ends exactly on a page
/// boundary, costing one extra empty fetch.
pub fn resolve_has_more(payload: &Value, raw_count: usize, page_size: u32) -> bool {
    explicit_has_more(payload).unwrap_or(raw_count == page_size as usize)
}
