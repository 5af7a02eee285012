// ── Scan code identity type ──
//
// ScanCode is the primary key of the whole system: a normalized decimal
// digit string as emitted by the scan decoder. Leading zeros are
// significant, so it is never stored as a number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced when a string cannot be a scan code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeParseError {
    #[error("scan code is empty")]
    Empty,

    #[error("scan code contains non-digit characters: {0:?}")]
    NotNumeric(String),
}

/// A normalized EAN-style scan code: one or more decimal digits,
/// leading zeros preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanCode(String);

impl ScanCode {
    /// Parse and validate a code string.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, CodeParseError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(CodeParseError::Empty);
        }
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeParseError::NotNumeric(raw.to_owned()));
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value for range-selector comparison.
    ///
    /// `None` only for codes too long to fit in a `u64` (20+ digits,
    /// beyond any EAN width this system accepts).
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScanCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScanCode {
    type Error = CodeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ScanCode> for String {
    fn from(code: ScanCode) -> Self {
        code.0
    }
}
