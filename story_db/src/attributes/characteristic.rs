//! Characteristics - materialized attribute values for one character.

use serde::{Deserialize, Serialize};

use super::AttributeValue;
use crate::conditions::Mutation;
use crate::error::ConfigurationError;
use crate::registry::{AttributeCategory, Range};

/// A `(category, subtype, value)` triple owned by one character.
///
/// Carries a copy of the category's range taken when it was created, so later
/// registry growth does not change how it clamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub category: String,
    pub subtype: String,
    pub value: AttributeValue,
    /// None for boolean characteristics.
    pub range: Option<Range>,
}

impl Characteristic {
    /// Create a characteristic holding the category default.
    pub fn from_category(category: &AttributeCategory, subtype: impl Into<String>) -> Self {
        Self {
            category: category.name.clone(),
            subtype: subtype.into(),
            value: category.default_value(),
            range: category.range(),
        }
    }

    /// Check if the characteristic holds a boolean.
    pub fn is_boolean(&self) -> bool {
        self.range.is_none()
    }

    /// `category:subtype`, used in error reports.
    pub fn attribute(&self) -> String {
        format!("{}:{}", self.category, self.subtype)
    }

    /// Apply a mutation and report what changed.
    ///
    /// `+` and `-` clamp to the range; `=` stores the value as given.
    pub fn apply(&mut self, op: Mutation, operand: AttributeValue) -> Result<Change, ConfigurationError> {
        let before = self.value;

        let after = match (op, self.range, before, operand) {
            (Mutation::Assign, None, AttributeValue::Bool(_), AttributeValue::Bool(v)) => {
                AttributeValue::Bool(v)
            }
            (Mutation::Assign, Some(_), AttributeValue::Int(_), AttributeValue::Int(v)) => {
                AttributeValue::Int(v)
            }
            (Mutation::Add | Mutation::Subtract, None, _, _) => {
                return Err(ConfigurationError::BooleanArithmetic {
                    attribute: self.attribute(),
                    op,
                })
            }
            (Mutation::Add, Some(range), AttributeValue::Int(v), AttributeValue::Int(delta)) => {
                AttributeValue::Int(v.saturating_add(delta).min(range.max))
            }
            (Mutation::Subtract, Some(range), AttributeValue::Int(v), AttributeValue::Int(delta)) => {
                AttributeValue::Int(v.saturating_sub(delta).max(range.min))
            }
            _ => {
                return Err(ConfigurationError::KindMismatch {
                    attribute: self.attribute(),
                    expected: before.kind(),
                    found: operand,
                })
            }
        };

        self.value = after;
        Ok(Change {
            before,
            after,
            range: self.range,
        })
    }
}

/// The effect of one applied expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub before: AttributeValue,
    pub after: AttributeValue,
    pub range: Option<Range>,
}

impl Change {
    /// Did the value actually move?
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    /// How much of the attribute's span this change covered, in `[0, 1]`.
    ///
    /// Booleans flip fully or not at all. Integers use `|after - before|`
    /// over the range width; a zero-width range counts any change as full.
    pub fn magnitude(&self) -> f32 {
        match (self.before, self.after) {
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            (AttributeValue::Int(a), AttributeValue::Int(b)) => {
                let delta = a.abs_diff(b);
                if delta == 0 {
                    return 0.0;
                }
                match self.range {
                    Some(range) if range.width() > 0 => {
                        (delta as f32 / range.width() as f32).min(1.0)
                    }
                    _ => 1.0,
                }
            }
            _ => 1.0,
        }
    }
}
