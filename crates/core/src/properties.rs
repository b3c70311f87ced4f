//! Properties file parsing
//!
//! Reads the plain, line-oriented `key=value` format used by Gradle projects
//! for files such as `key.properties` and `local.properties`.
//!
//! Rules:
//! - Blank lines and lines starting with `#` or `!` are ignored
//! - A line is split at the first `=`; the key is trimmed
//! - Leading whitespace of the value is dropped, trailing whitespace is kept
//! - No escapes, quoting or line continuations
//! - When a key repeats, the last value wins
//! - Files are ISO-8859-1, as `java.util.Properties.load(InputStream)` reads
//!   them: every byte is one character
//!
//! # Example
//!
//! ```rust
//! use dersplan_core::properties::{MalformedLinePolicy, Properties};
//!
//! let props = Properties::parse("keyAlias=upload\n# comment\n", MalformedLinePolicy::Skip)
//!     .unwrap();
//! assert_eq!(props.get("keyAlias"), Some("upload"));
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What to do with a non-comment line that has no `=` or an empty key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Ignore the line and log a warning
    #[default]
    Skip,
    /// Stop parsing and report the line number
    Fail,
}

impl std::str::FromStr for MalformedLinePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Unknown malformed line policy: {}", other),
            )
            .with_suggestion("Use 'skip' or 'fail'")),
        }
    }
}

/// Parsed properties, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty set of properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties text
    pub fn parse(content: &str, policy: MalformedLinePolicy) -> Result<Self> {
        parse_lines(content, policy).map_err(|line| {
            Error::new(
                ErrorCode::MalformedProperties,
                format!("Malformed properties line {}: expected key=value", line),
            )
        })
    }

    /// Read and parse a properties file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path, policy: MalformedLinePolicy) -> Result<Option<Self>> {
        let content = match std::fs::read(path) {
            Ok(bytes) => decode_latin1(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "properties file not present");
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::from(e).with_context(format!("While reading {}", path.display())));
            }
        };

        let props = parse_lines(&content, policy)
            .map_err(|line| Error::malformed_properties(path, line))?;

        tracing::debug!(
            path = %path.display(),
            entries = props.len(),
            "loaded properties file"
        );

        Ok(Some(props))
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a value and return it
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render back to `key=value` lines
    pub fn to_properties_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}\n", k, v))
            .collect()
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Parse line by line. On failure returns the 1-based malformed line number.
/// Decode ISO-8859-1 bytes
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encode text as ISO-8859-1, failing with the first character outside it
pub fn encode_latin1(text: &str) -> std::result::Result<Vec<u8>, char> {
    text.chars().map(|c| u8::try_from(c).map_err(|_| c)).collect()
}

fn parse_lines(content: &str, policy: MalformedLinePolicy) -> std::result::Result<Properties, usize> {
    let mut props = Properties::new();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_start();

        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        match parse_line(line) {
            Some((key, value)) => props.insert(key, value),
            None => match policy {
                MalformedLinePolicy::Skip => {
                    // Line content may hold a secret; only the number is logged.
                    tracing::warn!(line = line_no, "skipping malformed properties line");
                }
                MalformedLinePolicy::Fail => return Err(line_no),
            },
        }
    }

    Ok(props)
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim_start()))
}
