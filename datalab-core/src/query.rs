//! Free-text and facet filtering over resident record collections.
//!
//! Filtering never re-ranks: output order is always input order, and the
//! input slice is left untouched.

use serde::{Deserialize, Serialize};

use crate::domain::{Record, RecordKind};

/// Facet value that disables the facet, as used by "All" selectors.
pub const ANY_FACET_VALUE: &str = "all";

/// Returns the records whose name, description or any tag contains the
/// trimmed query, ignoring case. An empty query matches everything.
pub fn match_records(query: &str, records: &[Record]) -> Vec<Record> {
    let needle = normalize(query);
    records
        .iter()
        .filter(|record| text_matches(&needle, record))
        .cloned()
        .collect()
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn text_matches(needle: &str, record: &Record) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Equality constraint on one metadata field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetFilter {
    pub key: String,
    pub value: String,
}

impl FacetFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.value.trim().eq_ignore_ascii_case(ANY_FACET_VALUE)
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.is_wildcard() {
            return true;
        }
        record
            .metadata_text(&self.key)
            .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(self.value.trim()))
    }
}

/// Text query plus optional kind and metadata facets, all AND-ed together.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordQuery {
    pub text: String,
    pub kind: Option<RecordKind>,
    pub facets: Vec<FacetFilter>,
}

impl RecordQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_facet(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.facets.push(FacetFilter::new(key, value));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        let needle = normalize(&self.text);
        self.matches_normalized(&needle, record)
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        let needle = normalize(&self.text);
        records
            .iter()
            .filter(|record| self.matches_normalized(&needle, record))
            .cloned()
            .collect()
    }

    fn matches_normalized(&self, needle: &str, record: &Record) -> bool {
        self.kind.map_or(true, |kind| record.kind == kind)
            && self.facets.iter().all(|facet| facet.matches(record))
            && text_matches(needle, record)
    }
}
