// Typed field values and the ordered parameter store.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

// Instrument exports stamp dates as "01.12.2021", optionally with a
// clock, and standalone clocks as "14:32:11".
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{1,2}\.\d{1,2}\.\d{2,4}(?: \d{1,2}:\d{2}(?::\d{2})?)?|\d{1,2}:\d{2}:\d{2})$")
        .unwrap()
});

/// A single metadata or parameter value with its inferred type.
///
/// Classification happens once, at parse time; downstream code matches
/// on the variant instead of re-interpreting strings.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    /// Recognized date/time token, kept as text.
    Timestamp(String),
    Text(String),
}

impl FieldValue {
    /// Classify a raw token. Priority: integer, float, timestamp,
    /// trimmed text.
    pub fn classify(raw: &str) -> FieldValue {
        let token = raw.trim();
        if let Ok(i) = token.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = token.parse::<f64>() {
            // "inf"/"nan" parse as f64 but are not measurement values
            if f.is_finite() {
                return FieldValue::Float(f);
            }
        }
        if TIMESTAMP_RE.is_match(token) {
            return FieldValue::Timestamp(token.to_string());
        }
        FieldValue::Text(token.to_string())
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow the textual content of `Timestamp` and `Text` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Timestamp(s) | FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Timestamp(s) | FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered key/value store for file metadata, scan parameters and
/// trace metadata. Keys are unique; insertion order is preserved for
/// display. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    entries: Vec<(String, FieldValue)>,
}

impl ParamMap {
    pub fn new() -> Self {
        ParamMap::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<'a> IntoIterator for &'a ParamMap {
    type Item = (&'a str, &'a FieldValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a FieldValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
