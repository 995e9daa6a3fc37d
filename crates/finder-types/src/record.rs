//! Canonical athlete record.
//!
//! Every upstream profile shape is reduced to a [`CanonicalRecord`] before it
//! enters a search session. Records are immutable once built.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque record identifier.
///
/// Upstream ids arrive as JSON numbers or strings; both are kept in their
/// textual form. Numeric `0` is a valid id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of a record inside the accumulated working set.
///
/// Two records with equal keys are the same entity: same primary id and the
/// same display name after trimming and lower-casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub id: String,
    pub name: String,
}

/// The normalized, minimal representation of an upstream athlete profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Primary (owner) identifier
    pub id: RecordId,

    /// The profile's own identifier, when distinct from the owner id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_id: Option<RecordId>,

    /// Non-blank display name
    pub display_name: String,

    /// Avatar or photo reference
    #[serde(default)]
    pub image_ref: Option<String>,

    /// Free-form location (city, region, country)
    #[serde(default)]
    pub location_label: Option<String>,

    /// Club/team label, comma-joined when the profile has several teams
    #[serde(default)]
    pub affiliation_label: Option<String>,
}

impl CanonicalRecord {
    /// Create a record with only the required fields set.
    pub fn new(id: impl Into<RecordId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secondary_id: None,
            display_name: display_name.into(),
            image_ref: None,
            location_label: None,
            affiliation_label: None,
        }
    }

    pub fn with_secondary_id(mut self, id: impl Into<RecordId>) -> Self {
        self.secondary_id = Some(id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image_ref = Some(image.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_label = Some(location.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation_label = Some(affiliation.into());
        self
    }

    /// Key used by the accumulator to detect duplicates.
    pub fn dedupe_key(&self) -> DedupeKey {
        DedupeKey {
            id: self.id.to_string(),
            name: self.display_name.trim().to_lowercase(),
        }
    }

    /// Labels the query filter searches, in display order.
    pub fn searchable_labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str())
            .chain(self.location_label.as_deref())
            .chain(self.affiliation_label.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_key_ignores_case_and_padding() {
        let a = CanonicalRecord::new(7u64, "  Ana Lima ");
        let b = CanonicalRecord::new(7u64, "ana lima");
        assert_eq!(a.dedupe_key(), b.dedupe_key());
    }

    #[test]
    fn test_dedupe_key_distinguishes_ids() {
        let a = CanonicalRecord::new(7u64, "Ana Lima");
        let b = CanonicalRecord::new(8u64, "Ana Lima");
        assert_ne!(a.dedupe_key(), b.dedupe_key());
    }

    #[test]
    fn test_zero_id_is_kept_verbatim() {
        let record = CanonicalRecord::new(0u64, "Zero");
        assert_eq!(record.id.as_str(), "0");
    }

    #[test]
    fn test_searchable_labels_skip_missing_fields() {
        let record = CanonicalRecord::new("u1", "Ana").with_affiliation("Porto RC");
        let labels: Vec<_> = record.searchable_labels().collect();
        assert_eq!(labels, vec!["Ana", "Porto RC"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = CanonicalRecord::new(3u64, "Ana")
            .with_secondary_id("p-9")
            .with_location("Lisbon");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["secondaryId"], "p-9");
        assert_eq!(json["displayName"], "Ana");
        assert_eq!(json["locationLabel"], "Lisbon");
        assert!(json["imageRef"].is_null());
    }
}
