//! Per-character attribute storage.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{AttributeValue, Change, Characteristic};
use crate::conditions::Mutation;
use crate::error::ConfigurationError;
use crate::registry::AttributeRegistry;

/// One character's characteristics: category -> subtype -> characteristic.
///
/// Populated lazily: the first reference to a pair materializes the registry
/// default, after which the stored value is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttributeStore {
    characteristics: BTreeMap<String, BTreeMap<String, Characteristic>>,
}

impl AttributeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a materialized characteristic.
    pub fn get(&self, category: &str, subtype: &str) -> Option<&Characteristic> {
        self.characteristics.get(category)?.get(subtype)
    }

    /// Get a materialized value without touching the registry.
    pub fn value(&self, category: &str, subtype: &str) -> Option<AttributeValue> {
        self.get(category, subtype).map(|c| c.value)
    }

    /// Insert or replace a characteristic.
    pub fn insert(&mut self, characteristic: Characteristic) {
        self.characteristics
            .entry(characteristic.category.clone())
            .or_default()
            .insert(characteristic.subtype.clone(), characteristic);
    }

    /// Return the characteristic for a pair, creating it from the registry
    /// default if it has never been referenced.
    pub fn materialize(
        &mut self,
        registry: &AttributeRegistry,
        category: &str,
        subtype: &str,
    ) -> Result<&mut Characteristic, ConfigurationError> {
        let definition = registry
            .category(category)
            .ok_or_else(|| ConfigurationError::UnknownCategory(category.to_string()))?;
        if !definition.has_subtype(subtype) {
            return Err(ConfigurationError::UnknownSubtype {
                category: category.to_string(),
                subtype: subtype.to_string(),
            });
        }

        Ok(self
            .characteristics
            .entry(category.to_string())
            .or_default()
            .entry(subtype.to_string())
            .or_insert_with(|| Characteristic::from_category(definition, subtype)))
    }

    /// Materialize a pair and apply a mutation to it.
    pub fn apply(
        &mut self,
        registry: &AttributeRegistry,
        category: &str,
        subtype: &str,
        op: Mutation,
        operand: AttributeValue,
    ) -> Result<Change, ConfigurationError> {
        self.materialize(registry, category, subtype)?.apply(op, operand)
    }

    /// Drop every characteristic of a category. Returns whether any existed.
    pub fn remove_category(&mut self, category: &str) -> bool {
        self.characteristics.remove(category).is_some()
    }

    /// Drop one characteristic. Returns whether it existed.
    pub fn remove_subtype(&mut self, category: &str, subtype: &str) -> bool {
        let Some(subtypes) = self.characteristics.get_mut(category) else {
            return false;
        };
        let removed = subtypes.remove(subtype).is_some();
        if subtypes.is_empty() {
            self.characteristics.remove(category);
        }
        removed
    }

    /// Check if any characteristic of a category is materialized.
    pub fn has_category(&self, category: &str) -> bool {
        self.characteristics.contains_key(category)
    }

    /// Iterate over all characteristics, ordered by category then subtype.
    pub fn iter(&self) -> impl Iterator<Item = &Characteristic> {
        self.characteristics.values().flat_map(|m| m.values())
    }

    /// Get the total number of materialized characteristics.
    pub fn len(&self) -> usize {
        self.characteristics.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }
}

/// Access to the attribute stores of every character by name.
///
/// Conditions name the character they target, so evaluation needs to reach
/// stores other than the acting character's own.
pub trait StoreLookup {
    fn store(&self, character: &str) -> Option<&AttributeStore>;
    fn store_mut(&mut self, character: &str) -> Option<&mut AttributeStore>;
}

impl StoreLookup for HashMap<String, AttributeStore> {
    fn store(&self, character: &str) -> Option<&AttributeStore> {
        self.get(character)
    }

    fn store_mut(&mut self, character: &str) -> Option<&mut AttributeStore> {
        self.get_mut(character)
    }
}

impl StoreLookup for BTreeMap<String, AttributeStore> {
    fn store(&self, character: &str) -> Option<&AttributeStore> {
        self.get(character)
    }

    fn store_mut(&mut self, character: &str) -> Option<&mut AttributeStore> {
        self.get_mut(character)
    }
}
