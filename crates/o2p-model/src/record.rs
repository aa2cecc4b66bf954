//! Record and attribute collection types.
//!
//! A [`Record`] is serialized as one flat JSON object whose `id` member is the
//! primary key and whose remaining members are the attributes. Attribute
//! order is preserved from the document, which makes the order in which an
//! update request names its attributes observable downstream.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::attribute_value::AttributeValue;
use crate::error::ModelError;

/// Name of the primary key attribute.
pub const KEY_ATTRIBUTE: &str = "id";

/// The stored shape of a record: every attribute, the key included.
pub type Item = HashMap<String, AttributeValue>;

/// Insertion-ordered attribute mapping.
///
/// Equality ignores order: two collections are equal when they hold the same
/// names bound to equal values.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
    /// Position of each name in `entries`.
    index: HashMap<String, usize>,
}

impl Attributes {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    /// Returns `true` if an attribute with this name is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Set an attribute. An existing attribute keeps its position and its
    /// previous value is returned.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: AttributeValue,
    ) -> Option<AttributeValue> {
        let name = name.into();
        if let Some(&pos) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Remove an attribute, returning its value. Later attributes keep their
    /// relative order.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        let pos = self.index.remove(name)?;
        let (_, value) = self.entries.remove(pos);
        for (n, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(n) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl Eq for Attributes {}

impl FromIterator<(String, AttributeValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttributeValue);
    type IntoIter = std::vec::IntoIter<(String, AttributeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributesVisitor)
    }
}

struct AttributesVisitor;

impl<'de> Visitor<'de> for AttributesVisitor {
    type Value = Attributes;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object of attributes")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut attributes = Attributes::new();
        while let Some((name, value)) = map.next_entry::<String, AttributeValue>()? {
            attributes.insert(name, value);
        }
        Ok(attributes)
    }
}

/// A stored record: primary key plus open attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Primary key.
    pub id: String,
    /// Every attribute other than `id`.
    pub attributes: Attributes,
}

impl Record {
    /// Create a record with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute setter. The key attribute is not an attribute
    /// and is ignored here; set it through [`Record::new`].
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let name = name.into();
        if name != KEY_ATTRIBUTE {
            self.attributes.insert(name, value.into());
        }
        self
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Split into the key and the attributes.
    #[must_use]
    pub fn into_parts(self) -> (String, Attributes) {
        (self.id, self.attributes)
    }

    /// Convert into the backend's stored shape.
    #[must_use]
    pub fn into_item(self) -> Item {
        let mut item: Item = self.attributes.into_iter().collect();
        item.insert(KEY_ATTRIBUTE.to_owned(), AttributeValue::S(self.id));
        item
    }

    /// Rebuild a record from a stored item. Attributes are ordered by name
    /// since stored items carry no order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the item has no string `id`.
    pub fn from_item(mut item: Item) -> Result<Self, ModelError> {
        let id = match item.remove(KEY_ATTRIBUTE) {
            Some(AttributeValue::S(id)) => id,
            Some(other) => {
                return Err(ModelError::InvalidKeyType {
                    actual: other.type_descriptor(),
                });
            }
            None => return Err(ModelError::MissingKey),
        };
        let mut entries: Vec<_> = item.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(Self {
            id,
            attributes: entries.into_iter().collect(),
        })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(KEY_ATTRIBUTE, &self.id)?;
        for (name, value) in self.attributes.iter() {
            if name != KEY_ATTRIBUTE {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object with a string `id` member")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut id: Option<String> = None;
        let mut attributes = Attributes::new();

        while let Some(name) = map.next_key::<String>()? {
            if name == KEY_ATTRIBUTE {
                if id.is_some() {
                    return Err(de::Error::duplicate_field(KEY_ATTRIBUTE));
                }
                id = Some(map.next_value()?);
            } else {
                let value: AttributeValue = map.next_value()?;
                attributes.insert(name, value);
            }
        }

        let id = id.ok_or_else(|| de::Error::missing_field(KEY_ATTRIBUTE))?;
        Ok(Record { id, attributes })
    }
}
