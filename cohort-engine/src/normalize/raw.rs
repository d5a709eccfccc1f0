//! Header-keyed raw rows as delivered by a dataset source.

use std::collections::HashMap;

/// A single raw row. Keys and values are stored trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::new();
        for (key, value) in pairs {
            row.insert(key.as_ref(), value.as_ref());
        }
        row
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.fields
            .insert(column.trim().to_string(), value.trim().to_string());
    }

    /// Returns the trimmed value of a column, or `""` when absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Returns the value of a column when present and non-blank.
    pub fn get_opt(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the value of a column or a default when blank.
    pub fn get_or<'a>(&'a self, column: &str, default: &'a str) -> &'a str {
        self.get_opt(column).unwrap_or(default)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|value| value.is_empty())
    }
}

/// Rows of one dataset together with the header they were read under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Trimmed column names in file order.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Builds a table whose header is taken from the first row.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut headers: Vec<String> = rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();
        headers.sort();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
