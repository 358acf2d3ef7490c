//! Dotted section numbers.
//!
//! Section numbers compare by numeric segment, so `1.10` sorts after `1.9`.
//! Trailing `.0` segments carry no meaning and are dropped when parsing:
//! `2.1.0` and `2.1` are the same section.

use std::fmt;
use std::str::FromStr;

/// A dotted section number such as `3.1.2`.
///
/// The derived ordering compares segment vectors element by element, which
/// gives numeric per-segment ordering with parents sorting before children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionNumber {
    segments: Vec<u32>,
}

/// Error returned when a section number cannot be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid section number `{input}`")]
pub struct SectionNumberError {
    input: String,
}

impl SectionNumber {
    /// Build a section number from raw segments.
    ///
    /// Returns `None` for an empty segment list.
    #[must_use]
    pub fn from_segments(segments: impl Into<Vec<u32>>) -> Option<Self> {
        let mut segments = segments.into();
        if segments.is_empty() {
            return None;
        }
        while segments.len() > 1 && segments.last() == Some(&0) {
            segments.pop();
        }
        Some(Self { segments })
    }

    /// Numeric segments, trailing zeros already removed.
    #[must_use]
    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Nesting depth (`1` for `3`, `3` for `3.1.2`).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The enclosing section, or `None` at the top level.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Self::from_segments(&self.segments[..self.segments.len() - 1])
    }

    /// The `n`th subsection of this section.
    #[must_use]
    pub fn child(&self, n: u32) -> Self {
        let mut segments = self.segments.clone();
        segments.push(n);
        Self { segments }
    }

    /// All ancestors from the top level down, excluding `self`.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        (1..self.segments.len())
            .map(|len| Self {
                segments: self.segments[..len].to_vec(),
            })
            .collect()
    }

    /// True if `self` lies strictly inside `other`.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        self.segments.len() > other.segments.len() && self.segments.starts_with(&other.segments)
    }
}

impl FromStr for SectionNumber {
    type Err = SectionNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SectionNumberError {
            input: s.to_owned(),
        };
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(err());
        }
        let segments = trimmed
            .split('.')
            .map(|seg| seg.trim().parse::<u32>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_segments(segments).ok_or_else(err)
    }
}

impl fmt::Display for SectionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SectionNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
