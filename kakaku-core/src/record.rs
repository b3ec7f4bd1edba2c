//! Feature records flowing through the transform pipeline.
//!
//! A [`Record`] is an ordered map from field name to [`FeatureValue`]. The
//! raw client input, the augmented record, and the final feature vector are
//! all the same type; the pipeline stages only change which tag each field
//! carries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A single feature value with its encoding tag.
///
/// The distinction between `Text` and `Categorical` is deliberate: the model
/// consumes categorical semantics directly, so "free text" and "declared
/// categorical symbol" must stay distinguishable even though both wrap a
/// string.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// Floating-point numeric value.
    Number(f64),
    /// Integer numeric value (e.g. epoch seconds after temporal encoding).
    Integer(i64),
    /// Free text, not yet declared categorical.
    Text(String),
    /// A categorical symbol. Same vocabulary as the text it was tagged from.
    Categorical(String),
    /// A point in time, prior to temporal encoding.
    Timestamp(DateTime<Utc>),
}

impl FeatureValue {
    /// Human-readable name of the value's tag, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::Categorical(_) => "categorical",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

/// An ordered field-name → value map.
///
/// Field order is deterministic (sorted by name), so repeated pipeline runs
/// over equal inputs produce equal records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FeatureValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.fields.insert(name.into(), value);
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    /// Remove a field, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<FeatureValue> {
        self.fields.remove(name)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in deterministic (sorted) order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate fields in deterministic (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
