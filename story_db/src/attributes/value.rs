//! Attribute values.

use serde::{Deserialize, Serialize};

/// The value of a characteristic or the operand of a condition.
///
/// Serialized untagged, so story files write plain `true` or `5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
}

/// The kind of an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean,
    Integer,
}

impl AttributeValue {
    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            AttributeValue::Bool(_) => ValueKind::Boolean,
            AttributeValue::Int(_) => ValueKind::Integer,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Bool(_) => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Integer => write!(f, "integer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_values() {
        let values: Vec<AttributeValue> = serde_json::from_str("[true, 5, -3]").unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Bool(true),
                AttributeValue::Int(5),
                AttributeValue::Int(-3)
            ]
        );
        assert_eq!(serde_json::to_string(&AttributeValue::Int(7)).unwrap(), "7");
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(AttributeValue::from(true).kind(), ValueKind::Boolean);
        assert_eq!(AttributeValue::from(3i64).kind(), ValueKind::Integer);
        assert_eq!(AttributeValue::Int(3).as_bool(), None);
        assert_eq!(AttributeValue::Bool(true).to_string(), "true");
    }
}
