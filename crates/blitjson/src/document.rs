//! The binary document model contract the writer reads.
//!
//! The tree is immutable and externally owned; the writer only walks it.
//! Objects keep two property orders: the physical storage order and, as a
//! separate permutation, the order properties were originally inserted.

use crate::{
    float::FloatLiteral,
    lazy::{LazyCompressedBuf, LazyStrBuf},
    token::Token,
};

/// A value node. Exactly one [`Token`] corresponds to each variant.
#[derive(Debug, Clone)]
pub enum BlitValue {
    /// Plain lazy string.
    String(LazyStrBuf),
    /// LZ4-compressed lazy string.
    CompressedString(LazyCompressedBuf),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Floating value with pre-rendered text.
    Float(FloatLiteral),
    /// Boolean literal.
    Boolean(bool),
    /// Null literal.
    Null,
    /// Nested array.
    Array(BlitArray),
    /// Nested object.
    Object(BlitObject),
    /// A pre-encoded document stored as a value; encodes as an object.
    Embedded(BlitObject),
}

impl BlitValue {
    /// The token tag accompanying this value.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Self::String(_) => Token::String,
            Self::CompressedString(_) => Token::CompressedString,
            Self::Integer(_) => Token::Integer,
            Self::Float(_) => Token::FloatLiteral,
            Self::Boolean(_) => Token::Boolean,
            Self::Null => Token::Null,
            Self::Array(_) => Token::StartArray,
            Self::Object(_) => Token::StartObject,
            Self::Embedded(_) => Token::EmbeddedDocument,
        }
    }
}

/// One property entry: name, value and the token for the value.
#[derive(Debug, Clone)]
pub struct Property {
    /// Property name as a lazy string.
    pub name: LazyStrBuf,
    /// Property value.
    pub value: BlitValue,
}

impl Property {
    /// Builds a property from a plain-text name.
    #[must_use]
    pub fn new(name: &str, value: BlitValue) -> Self {
        Self {
            name: LazyStrBuf::from_text(name),
            value,
        }
    }

    /// The token of the value node.
    #[must_use]
    pub fn token(&self) -> Token {
        self.value.token()
    }
}

/// An object: properties in physical order plus the insertion-order
/// permutation.
#[derive(Debug, Clone, Default)]
pub struct BlitObject {
    properties: Vec<Property>,
    insertion_order: Vec<usize>,
}

impl BlitObject {
    /// Empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Object whose insertion order equals its physical order.
    #[must_use]
    pub fn from_properties(properties: Vec<Property>) -> Self {
        let insertion_order = (0..properties.len()).collect();
        Self {
            properties,
            insertion_order,
        }
    }

    /// Object with a precomputed insertion-order permutation mapping
    /// insertion index to physical index.
    ///
    /// # Panics
    ///
    /// Panics unless `insertion_order` is a permutation of
    /// `0..properties.len()`.
    #[must_use]
    pub fn with_insertion_order(properties: Vec<Property>, insertion_order: Vec<usize>) -> Self {
        assert_eq!(
            insertion_order.len(),
            properties.len(),
            "permutation length must match property count"
        );
        let mut seen = vec![false; properties.len()];
        for &idx in &insertion_order {
            assert!(
                idx < properties.len() && !seen[idx],
                "insertion order is not a permutation"
            );
            seen[idx] = true;
        }
        Self {
            properties,
            insertion_order,
        }
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the object has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Properties in physical storage order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The permutation mapping insertion index to physical index.
    #[must_use]
    pub fn insertion_order(&self) -> &[usize] {
        &self.insertion_order
    }

    /// Properties in the order they were originally inserted.
    pub fn properties_in_insertion_order(&self) -> impl Iterator<Item = &Property> {
        self.insertion_order.iter().map(|&i| &self.properties[i])
    }
}

/// An array of value nodes.
#[derive(Debug, Clone, Default)]
pub struct BlitArray {
    items: Vec<BlitValue>,
}

impl BlitArray {
    /// Empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Array over existing items.
    #[must_use]
    pub fn from_items(items: Vec<BlitValue>) -> Self {
        Self { items }
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in order.
    #[must_use]
    pub fn items(&self) -> &[BlitValue] {
        &self.items
    }
}

impl FromIterator<BlitValue> for BlitArray {
    fn from_iter<T: IntoIterator<Item = BlitValue>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlitObject, BlitValue, Property};

    fn props() -> Vec<Property> {
        vec![
            Property::new("a", BlitValue::Integer(1)),
            Property::new("b", BlitValue::Integer(2)),
            Property::new("c", BlitValue::Integer(3)),
        ]
    }

    #[test]
    fn default_insertion_order_is_physical() {
        let obj = BlitObject::from_properties(props());
        assert_eq!(obj.insertion_order(), &[0, 1, 2]);
    }

    #[test]
    fn insertion_order_is_a_separate_permutation() {
        let obj = BlitObject::with_insertion_order(props(), vec![2, 0, 1]);
        let names: Vec<_> = obj
            .properties_in_insertion_order()
            .map(|p| p.name.as_lazy().payload().to_vec())
            .collect();
        assert_eq!(names, vec![b"c".to_vec(), b"a".to_vec(), b"b".to_vec()]);
        // physical order untouched
        assert_eq!(obj.properties()[0].name.as_lazy().payload(), b"a");
    }

    #[test]
    #[should_panic(expected = "not a permutation")]
    fn duplicate_indices_are_rejected() {
        let _ = BlitObject::with_insertion_order(props(), vec![0, 0, 1]);
    }
}
