//! Component version strings with a total order.
//!
//! Manifest versions are free-form (`18.19`, `3.11.7`, `2024.02`, `17-lts`),
//! so comparison is done segment by segment: numeric segments compare
//! numerically, text segments lexically, and a numeric segment outranks a
//! text one. Missing trailing segments count as `0`, which makes `18.19`
//! and `18.19.0` equal.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// A declared component version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Number(u64),
    Text(String),
}

impl Segment {
    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

impl Version {
    /// Parse a version string. Never fails; unparseable input compares lexically.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let stripped = raw.strip_prefix('v').unwrap_or(raw);
        let segments = stripped
            .split(['.', '-', '+', '_'])
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) => Segment::Text(s.to_lowercase()),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The version exactly as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment::Number(0);
        let len = self.segments.len().max(other.segments.len());

        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&zero);
            let b = other.segments.get(i).unwrap_or(&zero);
            match a.compare(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn numeric_segments_compare_numerically() {
        assert!(v("18.19") > v("18.18"));
        assert!(v("18.10") > v("18.9"));
        assert!(v("3.11.7") < v("3.12"));
    }

    #[test]
    fn missing_segments_count_as_zero() {
        assert_eq!(v("18.19"), v("18.19.0"));
        assert!(v("18.19.1") > v("18.19"));
    }

    #[test]
    fn leading_v_is_ignored() {
        assert_eq!(v("v20.11.0"), v("20.11.0"));
    }

    #[test]
    fn release_outranks_text_label() {
        assert!(v("1.0.0") > v("1.0.0-rc1"));
        assert!(v("17-lts") < v("17.1"));
    }

    #[test]
    fn text_segments_compare_lexically() {
        assert!(v("1.0-beta") > v("1.0-alpha"));
    }

    #[test]
    fn display_keeps_raw_form() {
        assert_eq!(v(" 18.19 ").to_string(), "18.19");
        assert_eq!(v("v1.2").as_str(), "v1.2");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&v("3.11")).unwrap();
        assert_eq!(json, "\"3.11\"");
    }
}
