use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A user-defined global value attached to one snapshot.
///
/// The type of a value is fixed when it is parsed from a dump file: a token
/// that reads as an integer becomes `Int`, one that reads as a float becomes
/// `Float`, anything else is kept verbatim as `Str`. A `Str` value must not
/// contain newlines, since it is written back as a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Property {
    /// Parse a dump token, preferring the narrowest type that fits.
    pub fn parse(token: &str) -> Property {
        if let Ok(value) = token.parse::<i64>() {
            return Property::Int(value);
        }
        match fast_float::parse(token) {
            Ok(value) => Property::Float(value),
            Err(_) => Property::Str(token.to_string()),
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Property::Int(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    pub fn expect_int(&self) -> i64 {
        match *self {
            Property::Int(value) => value,
            ref other => panic!("expected Int, found {other:?}"),
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        if let Property::Float(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    pub fn expect_float(&self) -> f64 {
        match *self {
            Property::Float(value) => value,
            ref other => panic!("expected Float, found {other:?}"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Property::Str(ref value) = *self {
            Some(value)
        } else {
            None
        }
    }

    pub fn expect_str(&self) -> &str {
        match *self {
            Property::Str(ref value) => value,
            ref other => panic!("expected Str, found {other:?}"),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Int(value) => write!(f, "{value}"),
            Property::Float(value) => f.write_str(&format_float(*value)),
            Property::Str(value) => f.write_str(value),
        }
    }
}

/// Format a float so that it reads back as a float: plain `{}` drops the
/// decimal point for whole values, which would turn the token into an
/// integer on the next parse.
pub(crate) fn format_float(value: f64) -> String {
    let repr = value.to_string();
    if repr.contains(['.', 'e', 'E']) || repr.contains("inf") || repr.contains("NaN") {
        repr
    } else {
        format!("{repr}.0")
    }
}

/// The custom global properties of a snapshot, keyed by item name.
///
/// Key order is not significant; the map keeps its keys sorted so that
/// written dump files are deterministic.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Properties(BTreeMap<String, Property>);

impl Properties {
    pub fn new() -> Self {
        Properties(BTreeMap::new())
    }
}

impl Deref for Properties {
    type Target = BTreeMap<String, Property>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Properties {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for Properties {
    type Item = (String, Property);
    type IntoIter = <BTreeMap<String, Property> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Property);
    type IntoIter = <&'a BTreeMap<String, Property> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut Properties {
    type Item = (&'a String, &'a mut Property);
    type IntoIter = <&'a mut BTreeMap<String, Property> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn parse_prefers_int() {
        assert_eq!(Property::parse("42"), Property::Int(42));
        assert_eq!(Property::parse("-7"), Property::Int(-7));
        assert_eq!(Property::parse("0"), Property::Int(0));
    }

    #[test]
    fn parse_float() {
        assert_eq!(Property::parse("-3.5"), Property::Float(-3.5));
        assert_eq!(Property::parse("1e6"), Property::Float(1_000_000.0));
        assert_eq!(Property::parse("2."), Property::Float(2.0));
    }

    #[test]
    fn parse_string_fallback() {
        assert_eq!(
            Property::parse("quench"),
            Property::Str("quench".to_string())
        );
        assert_eq!(Property::parse("1.2.3"), Property::Str("1.2.3".to_string()));
    }

    #[test]
    fn accessors() {
        let prop = Property::Int(3);
        assert_eq!(prop.as_int(), Some(3));
        assert_eq!(prop.expect_int(), 3);
        assert_eq!(prop.as_float(), None);

        let prop = Property::Float(1.25);
        assert_approx_eq!(prop.expect_float(), 1.25);
        assert_eq!(prop.as_int(), None);

        let prop = Property::Str("abc".to_string());
        assert_eq!(prop.as_str(), Some("abc"));
        assert_eq!(prop.expect_str(), "abc");
    }

    #[test]
    #[should_panic(expected = "expected Int")]
    fn expect_int_panics() {
        Property::Float(1.0).expect_int();
    }

    #[test]
    #[should_panic(expected = "expected Float")]
    fn expect_float_panics() {
        Property::Str("x".to_string()).expect_float();
    }

    #[test]
    fn display_round_trips_type() {
        // A whole-valued float must not come back as an integer.
        let prop = Property::Float(2.0);
        let token = prop.to_string();
        assert_eq!(token, "2.0");
        assert_eq!(Property::parse(&token), prop);

        assert_eq!(Property::Int(2).to_string(), "2");
        assert_eq!(Property::Float(0.5).to_string(), "0.5");
        assert_eq!(Property::Str("run-a".to_string()).to_string(), "run-a");
    }

    #[test]
    fn format_float_keeps_marker() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(-1.0), "-1.0");
        assert_eq!(format_float(0.25), "0.25");
        let big = format_float(1e300);
        let reparsed: f64 = big.parse().unwrap();
        assert_eq!(reparsed, 1e300);
    }

    #[test]
    fn properties_container() {
        let mut properties = Properties::new();
        properties.insert("ENERGY".to_string(), Property::Float(-3.5));
        properties.insert("STEPS DONE".to_string(), Property::Int(42));

        assert_approx_eq!(properties.get("ENERGY").unwrap().expect_float(), -3.5);
        assert_eq!(properties.get("STEPS DONE").unwrap().expect_int(), 42);
        assert!(properties.get("missing").is_none());

        properties.remove("ENERGY");
        assert!(properties.get("ENERGY").is_none());

        // Keys come back sorted.
        properties.insert("A".to_string(), Property::Int(1));
        let keys: Vec<_> = properties.keys().cloned().collect();
        assert_eq!(keys, vec!["A".to_string(), "STEPS DONE".to_string()]);
    }
}
