//! Flat response records and the helpers used to reshape them
//!
//! Mock responders return a one-level mapping from string keys to scalars. List
//! positions and sub-objects are encoded in the key itself:
//!
//! ```text
//! hero_0_hero_id   = 11        ->  heroes[0].hero_id
//! hero_1_hero_id   = 25        ->  heroes[1].hero_id
//! metadata_cache   = "HIT"     ->  metadata.cache
//! content_0_tags_1 = "python"  ->  contents[0].tags[1]
//! ```
//!
//! Reshapers walk a record through [`Scope`] views, so every lookup is a
//! `Result` and a missing key surfaces as [`ReshapeError::MissingField`] instead of
//! a malformed response.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading a flat record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReshapeError {
    /// Record has no value under the key
    #[error("Missing field in mock response: {key}")]
    MissingField {
        /// Fully qualified key
        key: String,
    },

    /// Value exists but has a different scalar type
    #[error("Field {key} is not a valid {expected}")]
    TypeMismatch {
        /// Fully qualified key
        key: String,
        /// Expected scalar type
        expected: &'static str,
    },
}

/// Scalar value stored in a flat record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Absent value (`null`)
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
}

impl Scalar {
    /// Name of the scalar type, for error messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    /// Whether the scalar is `null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One-level mapping of indexed keys to scalar values
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRecord {
    fields: BTreeMap<String, Scalar>,
}

impl FlatRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a field
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove a field
    pub fn remove(&mut self, key: &str) -> Option<Scalar> {
        self.fields.remove(key)
    }

    /// Raw lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.get(key)
    }

    /// Whether the key is present (even if `null`)
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.fields.iter()
    }

    /// View of the whole record
    #[must_use]
    pub const fn root(&self) -> Scope<'_> {
        Scope {
            record: self,
            prefix: String::new(),
        }
    }

    /// View of the fields under `prefix_`
    #[must_use]
    pub fn scope(&self, prefix: &str) -> Scope<'_> {
        self.root().scope(prefix)
    }

    /// Sorted list indices present under `prefix_N_...` (or `prefix_N`)
    #[must_use]
    pub fn indices(&self, prefix: &str) -> Vec<usize> {
        self.root().indices(prefix)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Prefixed, read-only view into a [`FlatRecord`]
#[derive(Clone, Debug)]
pub struct Scope<'a> {
    record: &'a FlatRecord,
    prefix: String,
}

impl<'a> Scope<'a> {
    /// Fully qualified key for a field of this scope
    #[must_use]
    pub fn key(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}_{field}", self.prefix)
        }
    }

    /// Nested scope
    #[must_use]
    pub fn scope(&self, name: &str) -> Scope<'a> {
        Scope {
            record: self.record,
            prefix: self.key(name),
        }
    }

    /// Scope of list element `name_index`
    #[must_use]
    pub fn item(&self, name: &str, index: usize) -> Scope<'a> {
        Scope {
            record: self.record,
            prefix: self.key(&format!("{name}_{index}")),
        }
    }

    /// Sorted list indices present under `name_N_...` (or `name_N`)
    #[must_use]
    pub fn indices(&self, name: &str) -> Vec<usize> {
        let head = format!("{}_", self.key(name));
        let found: BTreeSet<usize> = self
            .record
            .fields
            .keys()
            .filter_map(|key| key.strip_prefix(&head))
            .filter_map(|rest| {
                let digits = rest.split('_').next()?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok()
            })
            .collect();
        found.into_iter().collect()
    }

    /// Whether the field exists
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.record.contains(&self.key(field))
    }

    /// Raw scalar
    ///
    /// # Errors
    ///
    /// Returns `ReshapeError::MissingField` if the key is absent
    pub fn scalar(&self, field: &str) -> Result<&'a Scalar, ReshapeError> {
        let key = self.key(field);
        self.record
            .get(&key)
            .ok_or(ReshapeError::MissingField { key })
    }

    /// String field
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a string
    pub fn string(&self, field: &str) -> Result<String, ReshapeError> {
        match self.scalar(field)? {
            Scalar::Str(s) => Ok(s.clone()),
            _ => Err(self.mismatch(field, "string")),
        }
    }

    /// Optional string field (`null` maps to `None`)
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or neither a string nor `null`
    pub fn opt_string(&self, field: &str) -> Result<Option<String>, ReshapeError> {
        match self.scalar(field)? {
            Scalar::Null => Ok(None),
            Scalar::Str(s) => Ok(Some(s.clone())),
            _ => Err(self.mismatch(field, "string")),
        }
    }

    /// Integer field
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not an integer
    pub fn int(&self, field: &str) -> Result<i64, ReshapeError> {
        match self.scalar(field)? {
            Scalar::Int(i) => Ok(*i),
            _ => Err(self.mismatch(field, "integer")),
        }
    }

    /// Float field (integers are widened)
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not numeric
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, field: &str) -> Result<f64, ReshapeError> {
        match self.scalar(field)? {
            Scalar::Float(x) => Ok(*x),
            Scalar::Int(i) => Ok(*i as f64),
            _ => Err(self.mismatch(field, "float")),
        }
    }

    /// Boolean field
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a boolean
    pub fn boolean(&self, field: &str) -> Result<bool, ReshapeError> {
        match self.scalar(field)? {
            Scalar::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(field, "boolean")),
        }
    }

    /// Contiguous string list `name_0`, `name_1`, ... (stops at the first gap)
    ///
    /// # Errors
    ///
    /// Returns an error if an element is not a string
    pub fn strings(&self, name: &str) -> Result<Vec<String>, ReshapeError> {
        let mut out = Vec::new();
        for index in 0.. {
            let field = format!("{name}_{index}");
            if !self.has(&field) {
                break;
            }
            out.push(self.string(&field)?);
        }
        Ok(out)
    }

    fn mismatch(&self, field: &str, expected: &'static str) -> ReshapeError {
        ReshapeError::TypeMismatch {
            key: self.key(field),
            expected,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn contents_record() -> FlatRecord {
        FlatRecord::new()
            .with("content_0_id", "c1")
            .with("content_0_tags_0", "ai")
            .with("content_0_tags_1", "ml")
            .with("content_1_id", "c2")
            .with("content_1_tags_0", "rust")
            .with("metadata_cache_status", "HIT")
            .with("metadata_processing_time_ms", 45)
            .with("has_more", true)
            .with("error", Scalar::Null)
    }

    #[test]
    fn test_indices_are_sorted_and_unique() {
        let record = contents_record();
        assert_eq!(record.indices("content"), vec![0, 1]);
        assert!(record.indices("metadata").is_empty());
        assert!(record.indices("missing").is_empty());
    }

    #[test]
    fn test_indices_ignore_longer_prefixes() {
        let record = FlatRecord::new()
            .with("match_0_match_id", 1)
            .with("matches_total", 3)
            .with("match_x_id", 2);
        assert_eq!(record.indices("match"), vec![0]);
    }

    #[test]
    fn test_nested_scope_lookup() {
        let record = contents_record();
        let item = record.root().item("content", 0);
        assert_eq!(item.string("id").expect("id"), "c1");
        assert_eq!(item.strings("tags").expect("tags"), vec!["ai", "ml"]);

        let metadata = record.scope("metadata");
        assert_eq!(metadata.string("cache_status").expect("status"), "HIT");
        assert_eq!(metadata.int("processing_time_ms").expect("time"), 45);
        assert!((metadata.float("processing_time_ms").expect("widened") - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_and_mismatched_fields() {
        let record = contents_record();
        let err = record.root().string("absent").expect_err("should be missing");
        assert_eq!(
            err,
            ReshapeError::MissingField {
                key: "absent".to_string()
            }
        );

        let err = record.root().int("has_more").expect_err("should mismatch");
        assert!(matches!(err, ReshapeError::TypeMismatch { expected: "integer", .. }));
    }

    #[test]
    fn test_null_is_optional_string() {
        let record = contents_record();
        assert_eq!(record.root().opt_string("error").expect("null ok"), None);
        assert!(record.get("error").is_some_and(Scalar::is_null));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = FlatRecord::new().with("a", 1).with("b", "x").with("c", Scalar::Null);
        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value, serde_json::json!({"a": 1, "b": "x", "c": null}));
    }

    proptest! {
        #[test]
        fn prop_indices_match_inserted(set in proptest::collection::btree_set(0usize..50, 0..10)) {
            let record: FlatRecord = set
                .iter()
                .flat_map(|i| [(format!("item_{i}_name"), Scalar::from("n")), (format!("item_{i}_score"), Scalar::from(1))])
                .collect();
            let expected: Vec<usize> = set.into_iter().collect();
            prop_assert_eq!(record.indices("item"), expected);
        }
    }
}
