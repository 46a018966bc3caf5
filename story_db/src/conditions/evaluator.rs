//! Evaluates preconditions and applies expressions against attribute stores.

use super::{Expression, Mutation, Precondition};
use crate::attributes::{AttributeValue, Change, StoreLookup};
use crate::error::ConfigurationError;
use crate::registry::AttributeRegistry;

/// Resolves conditions against attribute stores, falling back to registry
/// defaults for pairs a character has never referenced.
#[derive(Debug, Clone, Copy)]
pub struct ConditionEvaluator<'a> {
    registry: &'a AttributeRegistry,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(registry: &'a AttributeRegistry) -> Self {
        Self { registry }
    }

    /// Check that a category/subtype pair is defined.
    pub fn check(&self, category: &str, subtype: &str) -> Result<(), ConfigurationError> {
        let definition = self
            .registry
            .category(category)
            .ok_or_else(|| ConfigurationError::UnknownCategory(category.to_string()))?;
        if !definition.has_subtype(subtype) {
            return Err(ConfigurationError::UnknownSubtype {
                category: category.to_string(),
                subtype: subtype.to_string(),
            });
        }
        Ok(())
    }

    /// Check that an expression can be applied: the pair exists, the operand
    /// has the category's kind, and booleans are only assigned.
    pub fn check_expression(&self, expression: &Expression) -> Result<(), ConfigurationError> {
        self.check(&expression.category, &expression.subtype)?;
        let Some(definition) = self.registry.category(&expression.category) else {
            return Err(ConfigurationError::UnknownCategory(expression.category.clone()));
        };
        let expected = definition.default_value().kind();
        if expression.value.kind() != expected {
            return Err(ConfigurationError::KindMismatch {
                attribute: expression.attribute(),
                expected,
                found: expression.value,
            });
        }
        if definition.is_boolean() && expression.op != Mutation::Assign {
            return Err(ConfigurationError::BooleanArithmetic {
                attribute: expression.attribute(),
                op: expression.op,
            });
        }
        Ok(())
    }

    /// Read the current value of a pair without materializing it.
    pub fn resolve<S: StoreLookup + ?Sized>(
        &self,
        stores: &S,
        character: &str,
        category: &str,
        subtype: &str,
    ) -> Result<AttributeValue, ConfigurationError> {
        let store = stores
            .store(character)
            .ok_or_else(|| ConfigurationError::UnknownCharacter(character.to_string()))?;
        self.check(category, subtype)?;

        match store.value(category, subtype) {
            Some(value) => Ok(value),
            None => self
                .registry
                .category(category)
                .map(|c| c.default_value())
                .ok_or_else(|| ConfigurationError::UnknownCategory(category.to_string())),
        }
    }

    /// Evaluate a precondition as a pure query.
    pub fn evaluate<S: StoreLookup + ?Sized>(
        &self,
        precondition: &Precondition,
        stores: &S,
    ) -> Result<bool, ConfigurationError> {
        let actual = self.resolve(
            stores,
            &precondition.character,
            &precondition.category,
            &precondition.subtype,
        )?;
        compare(precondition, actual)
    }

    /// Evaluate a precondition, materializing the characteristic first.
    pub fn evaluate_materializing<S: StoreLookup + ?Sized>(
        &self,
        precondition: &Precondition,
        stores: &mut S,
    ) -> Result<bool, ConfigurationError> {
        let store = stores
            .store_mut(&precondition.character)
            .ok_or_else(|| ConfigurationError::UnknownCharacter(precondition.character.clone()))?;
        let actual = store
            .materialize(self.registry, &precondition.category, &precondition.subtype)?
            .value;
        compare(precondition, actual)
    }

    /// Apply an expression to the store of the character it targets.
    pub fn apply<S: StoreLookup + ?Sized>(
        &self,
        expression: &Expression,
        stores: &mut S,
    ) -> Result<Change, ConfigurationError> {
        let store = stores
            .store_mut(&expression.character)
            .ok_or_else(|| ConfigurationError::UnknownCharacter(expression.character.clone()))?;
        store.apply(
            self.registry,
            &expression.category,
            &expression.subtype,
            expression.op,
            expression.value,
        )
    }
}

fn compare(precondition: &Precondition, actual: AttributeValue) -> Result<bool, ConfigurationError> {
    precondition
        .op
        .compare(actual, precondition.value)
        .ok_or_else(|| ConfigurationError::KindMismatch {
            attribute: precondition.attribute(),
            expected: actual.kind(),
            found: precondition.value,
        })
}
