//! Render context: placeholder name to typed value

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

/// Pre-rendered HTML produced by a content generator.
///
/// Inserted verbatim and never scanned for placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate two fragments
    pub fn join(mut self, other: Fragment) -> Self {
        self.0.push_str(&other.0);
        self
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// A value bound to a placeholder name
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Free text, HTML-escaped on output
    Text(String),
    Number(f64),
    /// Monetary amount in whole currency units
    Currency(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Branch selector for conditional blocks
    Flag(bool),
    Fragment(Fragment),
}

impl Value {
    /// Truthiness used by `{{#if}}`: non-empty, non-zero, or true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Text(text) => !text.is_empty(),
            Value::Number(n) | Value::Currency(n) => *n != 0.0,
            Value::Date(_) | Value::DateTime(_) => true,
            Value::Flag(flag) => *flag,
            Value::Fragment(fragment) => !fragment.is_empty(),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Flag(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Fragment> for Value {
    fn from(value: Fragment) -> Self {
        Value::Fragment(value)
    }
}

/// Placeholder bindings for one render
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: HashMap<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, replacing any previous binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Builder-style `insert`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind `value` when it is present and non-empty, otherwise `default`
    pub fn insert_or(
        &mut self,
        name: impl Into<String>,
        value: Option<&str>,
        default: &str,
    ) -> &mut Self {
        let text = value.filter(|v| !v.trim().is_empty()).unwrap_or(default);
        self.insert(name, text)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Unknown names are falsy
    pub fn is_truthy(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(Value::is_truthy)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
