use crate::{SelectorErrorKind, SelectorParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A set of inclusive `u32` ranges parsed from text like `1-3,7,9-12`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    ranges: Vec<(u32, u32)>,
}

impl Selector {
    /// Parse a selector expression.
    ///
    /// Grammar: `segment (',' segment)*` where a segment is `INT` or `INT-INT`.
    /// Integers are plain ASCII digits; whitespace and signs are rejected.
    pub fn parse(text: &str) -> Result<Self, SelectorParseError> {
        let err = |kind| SelectorParseError {
            input: text.to_string(),
            kind,
        };

        let mut ranges = Vec::new();
        for segment in text.split(',') {
            if segment.is_empty() {
                return Err(err(SelectorErrorKind::EmptySegment));
            }

            let range = match segment.split_once('-') {
                None => {
                    let v = parse_int(segment).map_err(err)?;
                    (v, v)
                }
                Some((lo, hi)) => {
                    if hi.contains('-') {
                        return Err(err(SelectorErrorKind::MalformedRange));
                    }
                    let lo = parse_int(lo).map_err(err)?;
                    let hi = parse_int(hi).map_err(err)?;
                    if lo > hi {
                        return Err(err(SelectorErrorKind::ReversedRange { lo, hi }));
                    }
                    (lo, hi)
                }
            };
            ranges.push(range);
        }

        Ok(Selector { ranges })
    }

    /// Whether `value` falls inside any of the ranges
    pub fn matches(&self, value: u32) -> bool {
        self.ranges
            .iter()
            .any(|&(lo, hi)| value >= lo && value <= hi)
    }

    /// The parsed ranges, in source order
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }
}

fn parse_int(s: &str) -> Result<u32, SelectorErrorKind> {
    // ASCII digits only
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectorErrorKind::InvalidInteger(s.to_string()));
    }
    s.parse()
        .map_err(|_| SelectorErrorKind::InvalidInteger(s.to_string()))
}

impl FromStr for Selector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Selector::parse(&s)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if lo == hi {
                write!(f, "{}", lo)?;
            } else {
                write!(f, "{}-{}", lo, hi)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_value() {
        let selector: Selector = "5".parse().unwrap();
        assert!(selector.matches(5));
        assert!(!selector.matches(4));
        assert!(!selector.matches(6));
        assert_eq!(selector.ranges(), &[(5, 5)]);
    }

    #[test]
    fn test_multiple_ranges() {
        let selector: Selector = "1-3,7-9".parse().unwrap();
        for v in [1, 2, 3, 7, 8, 9] {
            assert!(selector.matches(v), "{} should match", v);
        }
        for v in [0, 4, 5, 6, 10, 1000] {
            assert!(!selector.matches(v), "{} should not match", v);
        }
    }

    #[test]
    fn test_mixed_segments() {
        let selector: Selector = "20010101,20020101-20020199".parse().unwrap();
        assert!(selector.matches(20010101));
        assert!(selector.matches(20020150));
        assert!(!selector.matches(20010102));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = Selector::parse("3-1").unwrap_err();
        assert_eq!(err.kind, SelectorErrorKind::ReversedRange { lo: 3, hi: 1 });
        assert_eq!(err.input, "3-1");
    }

    #[test]
    fn test_invalid_integer_rejected() {
        let err = Selector::parse("a-3").unwrap_err();
        assert_eq!(err.kind, SelectorErrorKind::InvalidInteger("a".to_string()));
    }

    #[test]
    fn test_empty_segment_rejected() {
        for input in ["1,,2", "", ",1", "1,"] {
            let err = Selector::parse(input).unwrap_err();
            assert_eq!(err.kind, SelectorErrorKind::EmptySegment, "input {:?}", input);
        }
    }

    #[test]
    fn test_malformed_ranges_rejected() {
        assert_eq!(
            Selector::parse("1-2-3").unwrap_err().kind,
            SelectorErrorKind::MalformedRange
        );
        assert!(Selector::parse("5-").is_err());
        assert!(Selector::parse("-5").is_err());
    }

    #[test]
    fn test_whitespace_and_signs_rejected() {
        for input in [" 1", "1 ", "1, 2", "1 - 2", "+5", "1-+5"] {
            assert!(Selector::parse(input).is_err(), "input {:?}", input);
        }
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(Selector::parse("4294967295").is_ok());
        assert!(Selector::parse("4294967296").is_err());
    }

    #[test]
    fn test_display_canonical() {
        let selector: Selector = "1-3,5-5,7".parse().unwrap();
        assert_eq!(selector.to_string(), "1-3,5,7");
    }

    #[test]
    fn test_serde_as_string() {
        let selector: Selector = serde_json::from_str("\"10-20,30\"").unwrap();
        assert!(selector.matches(15));
        assert_eq!(serde_json::to_string(&selector).unwrap(), "\"10-20,30\"");
        assert!(serde_json::from_str::<Selector>("\"3-1\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_range_matches_exactly_its_bounds(a in 0u32..100_000, b in 0u32..100_000, v in 0u32..100_001) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let selector = Selector::parse(&format!("{}-{}", lo, hi)).unwrap();
            prop_assert_eq!(selector.matches(v), v >= lo && v <= hi);
        }

        #[test]
        fn prop_display_reparses_to_same_selector(values in proptest::collection::vec((0u32..1000, 0u32..1000), 1..6)) {
            let text = values
                .iter()
                .map(|&(a, b)| format!("{}-{}", a.min(b), a.max(b)))
                .collect::<Vec<_>>()
                .join(",");
            let selector = Selector::parse(&text).unwrap();
            let reparsed = Selector::parse(&selector.to_string()).unwrap();
            prop_assert_eq!(selector, reparsed);
        }
    }
}
