//! Attribute value type with plain-JSON serialization.
//!
//! Values travel as ordinary JSON (`"a"`, `3`, `true`, `null`, `[...]`,
//! `{...}`). Numbers are stored string-encoded, the way DynamoDB carries
//! them. Integers that fit in `i64`/`u64` are exact; every other JSON number
//! is read as an `f64` first and keeps only `f64` precision.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String value.
    S(String),
    /// Number value, string-encoded.
    N(String),
    /// Boolean value.
    Bool(bool),
    /// Null value.
    Null,
    /// Ordered list of values.
    L(Vec<AttributeValue>),
    /// Nested mapping of values.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns `true` if this is a null value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value if this is an `S` variant.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number string if this is an `N` variant.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool` variant.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list if this is an `L` variant.
    #[must_use]
    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::L(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the map if this is an `M` variant.
    #[must_use]
    pub fn as_m(&self) -> Option<&HashMap<String, AttributeValue>> {
        match self {
            Self::M(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the DynamoDB type descriptor string (e.g., "S", "N", "BOOL").
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Null => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

impl Eq for AttributeValue {}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) => write!(f, "{{S: {s}}}"),
            Self::N(n) => write!(f, "{{N: {n}}}"),
            Self::Bool(b) => write!(f, "{{BOOL: {b}}}"),
            Self::Null => f.write_str("{NULL}"),
            Self::L(v) => write!(f, "{{L: {} items}}", v.len()),
            Self::M(m) => write!(f, "{{M: {} keys}}", m.len()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::S(s.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::S(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::N(n.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::N(n.to_string())
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        Self::N(n.to_string())
    }
}

/// Non-finite floats have no JSON representation and become `Null`.
impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        if n.is_finite() {
            Self::N(n.to_string())
        } else {
            Self::Null
        }
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(l: Vec<AttributeValue>) -> Self {
        Self::L(l)
    }
}

impl From<HashMap<String, AttributeValue>> for AttributeValue {
    fn from(m: HashMap<String, AttributeValue>) -> Self {
        Self::M(m)
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::S(s) => serializer.serialize_str(s),
            Self::N(n) => {
                let number: serde_json::Number = n
                    .parse()
                    .map_err(|_| ser::Error::custom(format!("invalid number: {n}")))?;
                number.serialize(serializer)
            }
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
            Self::L(list) => list.serialize(serializer),
            Self::M(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AttributeValueVisitor)
    }
}

struct AttributeValueVisitor;

impl<'de> Visitor<'de> for AttributeValueVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON string, number, boolean, null, array, or object")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(AttributeValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(AttributeValue::N(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(AttributeValue::N(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(AttributeValue::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(AttributeValue::S(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(AttributeValue::S(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AttributeValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AttributeValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        AttributeValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut list = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            list.push(value);
        }
        Ok(AttributeValue::L(list))
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut m = HashMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, AttributeValue>()? {
            m.insert(key, value);
        }
        Ok(AttributeValue::M(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_scalars_as_plain_json() {
        assert_eq!(
            serde_json::to_string(&AttributeValue::from("hello")).unwrap(),
            r#""hello""#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::from(42)).unwrap(),
            "42"
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::from(true)).unwrap(),
            "true"
        );
        assert_eq!(serde_json::to_string(&AttributeValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_should_serialize_list_value() {
        let val = AttributeValue::L(vec![AttributeValue::from("a"), AttributeValue::from(1)]);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, r#"["a",1]"#);
    }

    #[test]
    fn test_should_keep_number_precision_as_string() {
        let val: AttributeValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(val, AttributeValue::N("12.5".to_owned()));
        let val: AttributeValue = serde_json::from_str("-7").unwrap();
        assert_eq!(val.as_n(), Some("-7"));
        let val: AttributeValue = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(val.as_n(), Some("18446744073709551615"));
    }

    #[test]
    fn test_should_round_numbers_beyond_integer_range_to_f64() {
        let wide = "123456789012345678901234567890";
        let val: AttributeValue = serde_json::from_str(wide).unwrap();
        assert_eq!(val, AttributeValue::from(wide.parse::<f64>().unwrap()));
        assert_ne!(val.as_n(), Some(wide));
    }

    #[test]
    fn test_should_deserialize_nested_map() {
        let val: AttributeValue =
            serde_json::from_str(r#"{"coop": {"size": 3, "tags": ["red", null]}}"#).unwrap();
        let coop = val.as_m().unwrap().get("coop").unwrap().as_m().unwrap();
        assert_eq!(coop.get("size"), Some(&AttributeValue::N("3".to_owned())));
        let tags = coop.get("tags").unwrap().as_l().unwrap();
        assert_eq!(tags, &[AttributeValue::from("red"), AttributeValue::Null]);
    }

    #[test]
    fn test_should_reject_unparseable_number_on_serialize() {
        let val = AttributeValue::N("not-a-number".to_owned());
        assert!(serde_json::to_string(&val).is_err());
    }

    #[test]
    fn test_should_map_non_finite_float_to_null() {
        assert!(AttributeValue::from(f64::NAN).is_null());
        assert_eq!(AttributeValue::from(2.5).as_n(), Some("2.5"));
    }
}
