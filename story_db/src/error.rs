//! Error types for authoring and evaluation.

use thiserror::Error;

use crate::attributes::{AttributeValue, ValueKind};
use crate::conditions::Mutation;

/// Malformed author input, caught while definitions are loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Category name must not be empty")]
    EmptyCategoryName,
    #[error("Category '{0}' is already defined")]
    DuplicateCategory(String),
    #[error("Category '{0}' is not defined")]
    UnknownCategory(String),
    #[error("Boolean category '{category}' needs a boolean default, found {found}")]
    BooleanDefault {
        category: String,
        found: AttributeValue,
    },
    #[error("Numeric category '{category}' needs an integer default, found {found}")]
    NumericDefault {
        category: String,
        found: AttributeValue,
    },
    #[error("Numeric category '{category}' is missing its min/max range")]
    MissingRange { category: String },
    #[error("Category '{category}' has min {min} greater than max {max}")]
    InvertedRange { category: String, min: i64, max: i64 },
    #[error("Category '{category}' default {default} lies outside [{min}, {max}]")]
    DefaultOutOfRange {
        category: String,
        default: i64,
        min: i64,
        max: i64,
    },
    #[error("'{category}:{subtype}' does not exist in the story database")]
    UnknownAttribute { category: String, subtype: String },
    #[error("'{category}:{subtype}' holds {expected} values, found {found}")]
    ValueKind {
        category: String,
        subtype: String,
        expected: ValueKind,
        found: AttributeValue,
    },
    #[error("Boolean attribute '{category}:{subtype}' only supports '=', found '{op}'")]
    BooleanMutation {
        category: String,
        subtype: String,
        op: Mutation,
    },
    #[error("Name '{0}' must not contain ':'")]
    ReservedSeparator(String),
    #[error("Character name must not be empty")]
    EmptyCharacterName,
    #[error("Character '{0}' is already defined")]
    DuplicateCharacter(String),
    #[error("Character '{0}' is not defined")]
    UnknownCharacter(String),
}

/// A reference that cannot be resolved while evaluating or executing.
///
/// These abort the operation: the engine never substitutes a guessed value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("There's no category called '{0}'")]
    UnknownCategory(String),
    #[error("There's no subtype '{subtype}' in category '{category}'")]
    UnknownSubtype { category: String, subtype: String },
    #[error("There's no character named '{0}'")]
    UnknownCharacter(String),
    #[error("'{attribute}' holds {expected} values but was used with {found}")]
    KindMismatch {
        attribute: String,
        expected: ValueKind,
        found: AttributeValue,
    },
    #[error("Boolean attribute '{attribute}' cannot be changed with '{op}'")]
    BooleanArithmetic { attribute: String, op: Mutation },
}
