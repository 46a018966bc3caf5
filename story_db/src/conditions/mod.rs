//! Conditions - preconditions that gate actions and expressions that change
//! characteristics when an action executes.

mod evaluator;

pub use evaluator::*;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeValue;
use crate::error::ValidationError;
use crate::registry::AttributeRegistry;

/// Separates the parts of a `character:category:subtype` key.
pub const KEY_SEPARATOR: char = ':';

/// Reject a character, category or subtype name that would make keys
/// ambiguous.
pub fn check_key_part(name: &str) -> Result<(), ValidationError> {
    if name.contains(KEY_SEPARATOR) {
        return Err(ValidationError::ReservedSeparator(name.to_string()));
    }
    Ok(())
}

/// Comparison operators for preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "==")]
    Equal,
}

impl Comparison {
    /// Compare the current value against the operand.
    ///
    /// Returns `None` when the two values are of different kinds.
    pub fn compare(&self, actual: AttributeValue, operand: AttributeValue) -> Option<bool> {
        match (actual, operand) {
            (AttributeValue::Int(a), AttributeValue::Int(b)) => Some(self.holds(a, b)),
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => Some(self.holds(a, b)),
            _ => None,
        }
    }

    fn holds<T: PartialOrd>(&self, actual: T, operand: T) -> bool {
        match self {
            Comparison::Greater => actual > operand,
            Comparison::Less => actual < operand,
            Comparison::Equal => actual == operand,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::Equal => "==",
        }
    }
}

/// Mutation operators for expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

impl Mutation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Mutation::Assign => "=",
            Mutation::Add => "+",
            Mutation::Subtract => "-",
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A read-only comparison gating whether an action may be taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precondition {
    /// Whose characteristic is compared; not necessarily the acting character.
    pub character: String,
    #[serde(rename = "class", alias = "category")]
    pub category: String,
    #[serde(rename = "type", alias = "subtype")]
    pub subtype: String,
    #[serde(rename = "operation", alias = "op")]
    pub op: Comparison,
    pub value: AttributeValue,
}

impl Precondition {
    pub fn new(
        character: impl Into<String>,
        category: impl Into<String>,
        subtype: impl Into<String>,
        op: Comparison,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            character: character.into(),
            category: category.into(),
            subtype: subtype.into(),
            op,
            value: value.into(),
        }
    }

    /// `category:subtype`.
    pub fn attribute(&self) -> String {
        format!("{}:{}", self.category, self.subtype)
    }

    /// Check the operand kind against the registry, if the category is known.
    ///
    /// Unknown categories are left for evaluation time.
    pub fn validate(&self, registry: &AttributeRegistry) -> Result<(), ValidationError> {
        check_kind(registry, &self.category, &self.subtype, self.value)
    }
}

/// A mutation applied to a characteristic when an action executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Whose characteristic changes; may be another character such as "World".
    pub character: String,
    #[serde(rename = "class", alias = "category")]
    pub category: String,
    #[serde(rename = "type", alias = "subtype")]
    pub subtype: String,
    #[serde(rename = "operation", alias = "op")]
    pub op: Mutation,
    pub value: AttributeValue,
}

impl Expression {
    pub fn new(
        character: impl Into<String>,
        category: impl Into<String>,
        subtype: impl Into<String>,
        op: Mutation,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            character: character.into(),
            category: category.into(),
            subtype: subtype.into(),
            op,
            value: value.into(),
        }
    }

    /// `category:subtype`.
    pub fn attribute(&self) -> String {
        format!("{}:{}", self.category, self.subtype)
    }

    /// `character:category:subtype`, the key memories record changes under.
    pub fn memory_key(&self) -> String {
        format!("{}:{}:{}", self.character, self.category, self.subtype)
    }

    /// Check operand kind and operator against the registry, if the category
    /// is known.
    pub fn validate(&self, registry: &AttributeRegistry) -> Result<(), ValidationError> {
        check_kind(registry, &self.category, &self.subtype, self.value)?;
        let is_boolean = registry
            .category(&self.category)
            .is_some_and(|c| c.is_boolean());
        if is_boolean && self.op != Mutation::Assign {
            return Err(ValidationError::BooleanMutation {
                category: self.category.clone(),
                subtype: self.subtype.clone(),
                op: self.op,
            });
        }
        Ok(())
    }
}

/// Anything that points at one character's `category:subtype` pair.
pub trait AttributeRef {
    fn character(&self) -> &str;
    fn category(&self) -> &str;
    fn subtype(&self) -> &str;
}

impl AttributeRef for Precondition {
    fn character(&self) -> &str {
        &self.character
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn subtype(&self) -> &str {
        &self.subtype
    }
}

impl AttributeRef for Expression {
    fn character(&self) -> &str {
        &self.character
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn subtype(&self) -> &str {
        &self.subtype
    }
}

fn check_kind(
    registry: &AttributeRegistry,
    category: &str,
    subtype: &str,
    value: AttributeValue,
) -> Result<(), ValidationError> {
    let Some(definition) = registry.category(category) else {
        return Ok(());
    };
    let expected = definition.default_value().kind();
    if value.kind() != expected {
        return Err(ValidationError::ValueKind {
            category: category.to_string(),
            subtype: subtype.to_string(),
            expected,
            found: value,
        });
    }
    Ok(())
}
