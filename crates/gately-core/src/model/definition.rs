// ── Code definitions (priced ticket classes) ──
//
// A CodeDefinition maps a set of scan codes to a product: allowed
// duration, face price, and the per-minute overstay rate. The selector
// is stored as a human-editable string ("1000-1999", "200*", or an
// exact code) and parsed into a structured form at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::code::ScanCode;

/// Error produced when a selector string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    #[error("selector is empty")]
    Empty,

    #[error("selector contains non-digit characters: {0:?}")]
    NotNumeric(String),

    #[error("range bound does not fit in 64 bits: {0:?}")]
    BoundTooLarge(String),

    #[error("range lower bound {lo} exceeds upper bound {hi}")]
    InvertedRange { lo: u64, hi: u64 },

    #[error("wildcard must be a digit prefix followed by a single trailing '*': {0:?}")]
    MalformedWildcard(String),
}

/// How a definition claims scan codes.
///
/// Range bounds compare numerically. The stored string form keeps the
/// zero-padded display width, but matching parses both the bounds and
/// the code as integers so "0999-1100" claims exactly 999..=1100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CodeSelector {
    /// Inclusive numeric range: `"A-B"`.
    Range { lo: u64, hi: u64, display: String },
    /// Digit prefix: `"P*"`.
    Prefix(String),
    /// Exact code match.
    Exact(String),
}

impl CodeSelector {
    /// Parse the stored string form of a selector.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, SelectorParseError> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            return Err(SelectorParseError::Empty);
        }

        if let Some((lo, hi)) = raw.split_once('-') {
            let lo = parse_bound(lo.trim())?;
            let hi = parse_bound(hi.trim())?;
            if lo > hi {
                return Err(SelectorParseError::InvertedRange { lo, hi });
            }
            return Ok(Self::Range {
                lo,
                hi,
                display: raw.to_owned(),
            });
        }

        if raw.contains('*') {
            let prefix = raw
                .strip_suffix('*')
                .ok_or_else(|| SelectorParseError::MalformedWildcard(raw.to_owned()))?;
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(SelectorParseError::MalformedWildcard(raw.to_owned()));
            }
            return Ok(Self::Prefix(prefix.to_owned()));
        }

        if !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(SelectorParseError::NotNumeric(raw.to_owned()));
        }
        Ok(Self::Exact(raw.to_owned()))
    }

    /// Does this selector claim the given code?
    pub fn matches(&self, code: &ScanCode) -> bool {
        match self {
            Self::Range { lo, hi, .. } => code
                .numeric()
                .is_some_and(|n| (*lo..=*hi).contains(&n)),
            Self::Prefix(prefix) => code.as_str().starts_with(prefix.as_str()),
            Self::Exact(exact) => code.as_str() == exact,
        }
    }
}

fn parse_bound(raw: &str) -> Result<u64, SelectorParseError> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(SelectorParseError::NotNumeric(raw.to_owned()));
    }
    raw.parse()
        .map_err(|_| SelectorParseError::BoundTooLarge(raw.to_owned()))
}

impl fmt::Display for CodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { display, .. } => write!(f, "{display}"),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
            Self::Exact(exact) => write!(f, "{exact}"),
        }
    }
}

impl FromStr for CodeSelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CodeSelector {
    type Error = SelectorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CodeSelector> for String {
    fn from(selector: CodeSelector) -> Self {
        selector.to_string()
    }
}

/// A priced ticket class.
///
/// Active definitions are supplied to the resolver in load order;
/// the first structural match wins. Keeping selectors non-overlapping
/// is the loader's responsibility, not the engine's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub selector: CodeSelector,
    /// Kiosk/admin display color; not interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub duration_minutes: u32,
    pub price: u32,
    pub price_per_extra_minute: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
