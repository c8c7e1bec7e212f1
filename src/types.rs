//! Core data model types for marshalling.
//!
//! A [`FieldMap`] describes which record attributes become which grid columns, a
//! [`UniqueKeySpec`] names the composite business key checked on import, and [`Value`] /
//! [`ValueType`] carry attribute values between records and cell text.

use std::collections::HashSet;
use std::fmt;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ErrorCause, MarshalError, MarshalResult};

/// The one supported on-wire date/time format (`MM/dd/yyyy HH:mm`, 24-hour clock).
///
/// Cells are parsed with this pattern on import and date/time attributes are rendered with it
/// on export.
pub const DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Declared type of a record attribute. Drives cell-text coercion on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// UTF-8 text, passed through unchanged.
    Text,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point number.
    Float32,
    /// 64-bit floating point number.
    Float64,
    /// A single character (first character of the cell).
    Char,
    /// Arbitrary-precision decimal.
    Decimal,
    /// Date and time, see [`DATE_TIME_FORMAT`].
    DateTime,
    /// Any other type: the raw cell text is handed to the attribute unchanged.
    Other(&'static str),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Int16 => f.write_str("i16"),
            Self::Int32 => f.write_str("i32"),
            Self::Int64 => f.write_str("i64"),
            Self::Float32 => f.write_str("f32"),
            Self::Float64 => f.write_str("f64"),
            Self::Char => f.write_str("char"),
            Self::Decimal => f.write_str("decimal"),
            Self::DateTime => f.write_str("date/time"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// A single attribute value moving between a record and a grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value. Rendered as an empty cell.
    Null,
    /// UTF-8 text.
    Text(String),
    /// 16-bit signed integer.
    Int16(i16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
    /// Single character.
    Char(char),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// Date and time (minute precision on the wire).
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Canonical display form used for export: `Null` is the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
        }
    }
}

/// One `attribute path -> column label` pair of a [`FieldMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Dotted attribute path (`"name"`, `"college.name"`).
    pub path: String,
    /// Column label written to / expected in the header row.
    pub label: String,
}

/// Ordered mapping from attribute path to column label.
///
/// Order defines column order on export. On import every label must be present in the header
/// row. A field map is never empty and never maps the same path twice.
///
/// ```rust
/// use tabular_marshal::types::FieldMap;
///
/// # fn main() -> Result<(), tabular_marshal::MarshalError> {
/// let map = FieldMap::from_pairs([("id", "ID"), ("name", "Name"), ("college.name", "College")])?;
/// assert_eq!(map.labels().collect::<Vec<_>>(), vec!["ID", "Name", "College"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<FieldMapping>,
}

impl FieldMap {
    /// Build a field map from `(path, label)` pairs, keeping their order.
    pub fn from_pairs<P, L>(pairs: impl IntoIterator<Item = (P, L)>) -> MarshalResult<Self>
    where
        P: Into<String>,
        L: Into<String>,
    {
        let entries: Vec<FieldMapping> = pairs
            .into_iter()
            .map(|(path, label)| FieldMapping {
                path: path.into(),
                label: label.into(),
            })
            .collect();

        if entries.is_empty() {
            return Err(MarshalError::new(ErrorCause::EmptyFieldMap));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for e in &entries {
            if !seen.insert(e.path.as_str()) {
                return Err(MarshalError::new(ErrorCause::DuplicateFieldPath(e.path.clone())));
            }
        }

        Ok(Self { entries })
    }

    /// Iterate mappings in order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.entries.iter()
    }

    /// Iterate attribute paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Iterate column labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Returns the label mapped to `path`, if present.
    pub fn label_of(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.label.as_str())
    }

    /// Number of mappings (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for e in &self.entries {
            map.serialize_entry(&e.path, &e.label)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute path to column label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
                // Entries arrive in document order.
                let mut pairs: Vec<(String, String)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((path, label)) = access.next_entry::<String, String>()? {
                    pairs.push((path, label));
                }
                FieldMap::from_pairs(pairs).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

/// Ordered set of attribute paths (or column labels) forming a composite business key.
///
/// On import, no two data rows may agree on every key column. An empty spec disables duplicate
/// detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueKeySpec {
    keys: Vec<String>,
}

impl UniqueKeySpec {
    /// Create a key spec from attribute paths or column labels.
    pub fn new<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
        let mut out: Vec<String> = Vec::new();
        for k in keys {
            let k = k.into();
            if !out.contains(&k) {
                out.push(k);
            }
        }
        Self { keys: out }
    }

    /// A spec with no key columns (no duplicate detection).
    pub fn none() -> Self {
        Self::default()
    }

    /// Iterate keys in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_str())
    }

    /// Returns `true` if no key columns are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
