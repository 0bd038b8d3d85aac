use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DsvError, Result};

/// Table of named delimiters, e.g. `"csv"` → `,`.
///
/// The default table knows `csv` and `tsv`; callers extend it before building
/// a parser. Each parser receives its own table, so adding an entry never
/// affects parsers that are already running.
///
/// # Examples
///
/// ```
/// use dsv_batch::Delimiters;
///
/// let mut delimiters = Delimiters::default();
/// delimiters.insert("psv", '|');
///
/// assert_eq!(delimiters.resolve("psv").unwrap(), b'|');
/// assert_eq!(delimiters.resolve("tsv").unwrap(), b'\t');
/// assert!(delimiters.resolve("ssv").is_err());
/// ```
///
/// The table can also come from configuration:
///
/// ```
/// use dsv_batch::Delimiters;
///
/// let delimiters: Delimiters = serde_json::from_str(r#"{"psv": "|", "ssv": ";"}"#).unwrap();
/// assert_eq!(delimiters.get("ssv"), Some(';'));
/// assert_eq!(delimiters.get("csv"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delimiters {
    table: HashMap<String, char>,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::empty().with("csv", ',').with("tsv", '\t')
    }
}

impl Delimiters {
    /// Creates a table with no entries.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Adds or replaces an entry, returning the previous delimiter.
    pub fn insert(&mut self, name: impl Into<String>, delimiter: char) -> Option<char> {
        self.table.insert(name.into(), delimiter)
    }

    /// Adds an entry (builder pattern).
    pub fn with(mut self, name: impl Into<String>, delimiter: char) -> Self {
        self.insert(name, delimiter);
        self
    }

    /// The delimiter registered under `name`.
    pub fn get(&self, name: &str) -> Option<char> {
        self.table.get(name).copied()
    }

    /// Looks up `name` and converts it to the byte handed to the tokenizer.
    pub fn resolve(&self, name: &str) -> Result<u8> {
        let delimiter = self
            .get(name)
            .ok_or_else(|| DsvError::UnknownDelimiter(name.to_string()))?;
        delimiter_byte(delimiter)
    }
}

/// Checks that `delimiter` can separate fields.
///
/// The tokenizer works on bytes, so only ASCII characters qualify; quotes and
/// line terminators are rejected as well.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    match delimiter {
        '"' | '\r' | '\n' => Err(DsvError::InvalidDelimiter(delimiter)),
        c if c.is_ascii() => Ok(c as u8),
        c => Err(DsvError::InvalidDelimiter(c)),
    }
}
