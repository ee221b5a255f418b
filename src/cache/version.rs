//! Dotted numeric versions in cache directory names.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version such as `2023.2` or `2.10.1`.
///
/// Ordering compares components left to right as integers, so `2.10` is
/// greater than `2.9`. When one version is a prefix of the other, the
/// longer one is greater (`2023.1.1 > 2023.1`).
///
/// Components may carry leading zeros; they are compared by numeric value
/// and arbitrarily long digit runs are supported.
#[derive(Debug, Clone)]
pub struct DottedVersion {
    raw: String,
    components: Vec<String>,
}

/// Error returned when a string is not a dotted numeric version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(pub String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid dotted version: '{}'", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl DottedVersion {
    /// Returns the version as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false; a version has at least one component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromStr for DottedVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = Vec::new();
        for part in s.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseVersionError(s.to_string()));
            }
            let trimmed = part.trim_start_matches('0');
            components.push(if trimmed.is_empty() { "0" } else { trimmed }.to_string());
        }
        Ok(Self {
            raw: s.to_string(),
            components,
        })
    }
}

/// Compares two digit strings without leading zeros by numeric value.
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.components.iter().zip(&other.components) {
            match cmp_numeric(a, b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.components.len().cmp(&other.components.len())
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
