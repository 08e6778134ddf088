use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt::Write;

/// Name of the paging field used by [`QueryDescriptor::page`].
pub const PAGE_FIELD: &str = "page";

/// A single filter value.
///
/// `Absent`, empty text and non-finite floats carry no filter and are ignored when deriving
/// the cache key.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Absent,
}

impl FilterValue {
    /// Returns `true` when this value is dropped from the derived key.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.is_empty(),
            Self::Float(f) => !f.is_finite(),
            Self::Int(_) | Self::Bool(_) => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(f) if f.is_finite() && *f == (*f as i64) as f64 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            Self::Text(s) => {
                out.push('"');
                push_escaped(out, s);
                out.push('"');
            }
            Self::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Self::Float(f) => {
                // `-0.0` and `0.0` are the same filter.
                let f = if *f == 0.0 { 0.0 } else { *f };
                let _ = write!(out, "{f}");
            }
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Absent => {}
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u64> for FilterValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Self::Int(v),
            Err(_) => Self::Float(v as f64),
        }
    }
}

impl From<usize> for FilterValue {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

/// The caller's current filter selection.
///
/// Field order never matters: two descriptors are equivalent when their non-blank fields are
/// identical, which is exactly when [`derive_key`] returns the same string for both.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryDescriptor {
    fields: BTreeMap<String, FilterValue>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FilterValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.fields.get(name)
    }

    /// Number of fields, blank ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The 1-based page number, defaulting to 1 when unset or not an integer.
    pub fn page(&self) -> u32 {
        self.get(PAGE_FIELD)
            .and_then(FilterValue::as_int)
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0)
            .unwrap_or(1)
    }

    pub fn with_page(self, page: u32) -> Self {
        self.with(PAGE_FIELD, page)
    }

    /// Same filters, paging field removed.
    pub fn without_page(mut self) -> Self {
        self.fields.remove(PAGE_FIELD);
        self
    }

    pub fn key(&self) -> String {
        derive_key(self)
    }

    pub fn is_equivalent(&self, other: &Self) -> bool {
        derive_key(self) == derive_key(other)
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for QueryDescriptor {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        for (k, v) in iter {
            d.set(k, v);
        }
        d
    }
}

/// Derives the canonical cache key for a descriptor.
///
/// Blank fields are dropped, the rest are emitted in byte-lexicographic key order as
/// `name=value` pairs joined by `&`. Text values are quoted so that `"1"` and `1` differ.
pub fn derive_key(descriptor: &QueryDescriptor) -> String {
    let mut out = String::new();
    // BTreeMap iteration is already sorted by key.
    for (name, value) in descriptor.fields.iter().filter(|(_, v)| !v.is_blank()) {
        if !out.is_empty() {
            out.push('&');
        }
        push_escaped(&mut out, name);
        out.push('=');
        value.write_canonical(&mut out);
    }
    out
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '"' => out.push_str("%22"),
            c => out.push(c),
        }
    }
}
