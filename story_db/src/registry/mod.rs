//! The attribute registry - every category an author may reference.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::attributes::AttributeValue;
use crate::conditions::check_key_part;
use crate::error::ValidationError;

/// Inclusive numeric range of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    /// Create a new range.
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check if a value lies within the range.
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Distance between the bounds.
    pub fn width(&self) -> i64 {
        self.max.saturating_sub(self.min)
    }
}

/// Whether a category holds booleans or bounded integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    Boolean { default: bool },
    Numeric { range: Range, default: i64 },
}

/// Author-facing definition of a category, as delivered by a loader.
///
/// Field names follow the story file format (`class`, `types`, `isBoolean`,
/// `defaultVal`); the snake-case names are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    #[serde(rename = "class", alias = "name")]
    pub name: String,
    #[serde(rename = "types", alias = "subtypes", default)]
    pub subtypes: Vec<String>,
    #[serde(rename = "isBoolean", alias = "is_boolean", default)]
    pub is_boolean: bool,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(rename = "defaultVal", alias = "default")]
    pub default: AttributeValue,
}

impl CategoryDef {
    /// Define a boolean category.
    pub fn boolean(
        name: impl Into<String>,
        subtypes: impl IntoIterator<Item = impl Into<String>>,
        default: bool,
    ) -> Self {
        Self {
            name: name.into(),
            subtypes: subtypes.into_iter().map(Into::into).collect(),
            is_boolean: true,
            min: None,
            max: None,
            default: AttributeValue::Bool(default),
        }
    }

    /// Define a numeric category.
    pub fn numeric(
        name: impl Into<String>,
        subtypes: impl IntoIterator<Item = impl Into<String>>,
        min: i64,
        max: i64,
        default: i64,
    ) -> Self {
        Self {
            name: name.into(),
            subtypes: subtypes.into_iter().map(Into::into).collect(),
            is_boolean: false,
            min: Some(min),
            max: Some(max),
            default: AttributeValue::Int(default),
        }
    }
}

/// A typed attribute family (e.g. "Trust") with its subtypes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeCategory {
    pub name: String,
    pub subtypes: BTreeSet<String>,
    pub kind: CategoryKind,
}

impl AttributeCategory {
    /// Build a category from its definition, checking kinds and ranges.
    pub fn from_def(def: CategoryDef) -> Result<Self, ValidationError> {
        if def.name.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
        check_key_part(&def.name)?;
        for subtype in &def.subtypes {
            check_key_part(subtype)?;
        }

        let kind = if def.is_boolean {
            match def.default {
                AttributeValue::Bool(default) => CategoryKind::Boolean { default },
                found => {
                    return Err(ValidationError::BooleanDefault {
                        category: def.name,
                        found,
                    })
                }
            }
        } else {
            let default = match def.default {
                AttributeValue::Int(default) => default,
                found => {
                    return Err(ValidationError::NumericDefault {
                        category: def.name,
                        found,
                    })
                }
            };
            let (min, max) = match (def.min, def.max) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err(ValidationError::MissingRange { category: def.name }),
            };
            if min > max {
                return Err(ValidationError::InvertedRange {
                    category: def.name,
                    min,
                    max,
                });
            }
            let range = Range::new(min, max);
            if !range.contains(default) {
                return Err(ValidationError::DefaultOutOfRange {
                    category: def.name,
                    default,
                    min,
                    max,
                });
            }
            CategoryKind::Numeric { range, default }
        };

        Ok(Self {
            name: def.name,
            subtypes: def.subtypes.into_iter().collect(),
            kind,
        })
    }

    /// Check if the category holds booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, CategoryKind::Boolean { .. })
    }

    /// The numeric range, `None` for boolean categories.
    pub fn range(&self) -> Option<Range> {
        match self.kind {
            CategoryKind::Boolean { .. } => None,
            CategoryKind::Numeric { range, .. } => Some(range),
        }
    }

    /// The value a characteristic starts with.
    pub fn default_value(&self) -> AttributeValue {
        match self.kind {
            CategoryKind::Boolean { default } => AttributeValue::Bool(default),
            CategoryKind::Numeric { default, .. } => AttributeValue::Int(default),
        }
    }

    /// Check if the category has a specific subtype.
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.contains(subtype)
    }
}

/// The story database: category name -> category.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttributeRegistry {
    categories: BTreeMap<String, AttributeCategory>,
}

impl AttributeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a category. Duplicate names are rejected.
    pub fn add_category(&mut self, def: CategoryDef) -> Result<&AttributeCategory, ValidationError> {
        if self.categories.contains_key(&def.name) {
            return Err(ValidationError::DuplicateCategory(def.name));
        }
        let category = AttributeCategory::from_def(def)?;
        let name = category.name.clone();
        Ok(self.categories.entry(name).or_insert(category))
    }

    /// Grow an existing category with more subtypes.
    pub fn add_subtypes(
        &mut self,
        name: &str,
        subtypes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), ValidationError> {
        let category = self
            .categories
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownCategory(name.to_string()))?;
        let subtypes: Vec<String> = subtypes.into_iter().map(Into::into).collect();
        for subtype in &subtypes {
            check_key_part(subtype)?;
        }
        category.subtypes.extend(subtypes);
        Ok(())
    }

    /// Get a category by name.
    pub fn category(&self, name: &str) -> Option<&AttributeCategory> {
        self.categories.get(name)
    }

    /// Check if a category/subtype pair is defined.
    pub fn contains(&self, category: &str, subtype: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|c| c.has_subtype(subtype))
    }

    /// Remove a whole category.
    ///
    /// Characteristics and conditions referencing it are not touched here; the
    /// owner of those is responsible for the cascade.
    pub fn remove_category(&mut self, name: &str) -> Option<AttributeCategory> {
        self.categories.remove(name)
    }

    /// Remove one subtype from a category. Returns whether it existed.
    pub fn remove_subtype(&mut self, name: &str, subtype: &str) -> bool {
        self.categories
            .get_mut(name)
            .is_some_and(|c| c.subtypes.remove(subtype))
    }

    /// Iterate over all categories, ordered by name.
    pub fn categories(&self) -> impl Iterator<Item = &AttributeCategory> {
        self.categories.values()
    }

    /// Get the total number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_boolean_category() {
        let mut registry = AttributeRegistry::new();
        registry
            .add_category(CategoryDef::boolean("Trust", ["loyal"], false))
            .unwrap();

        let trust = registry.category("Trust").unwrap();
        assert!(trust.is_boolean());
        assert_eq!(trust.default_value(), AttributeValue::Bool(false));
        assert!(trust.range().is_none());
        assert!(registry.contains("Trust", "loyal"));
        assert!(!registry.contains("Trust", "fearful"));
    }

    #[test]
    fn test_add_numeric_category() {
        let mut registry = AttributeRegistry::new();
        registry
            .add_category(CategoryDef::numeric("Mood", ["happy", "angry"], 0, 10, 5))
            .unwrap();

        let mood = registry.category("Mood").unwrap();
        assert_eq!(mood.range(), Some(Range::new(0, 10)));
        assert_eq!(mood.default_value(), AttributeValue::Int(5));
        assert_eq!(mood.subtypes.len(), 2);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut registry = AttributeRegistry::new();
        let err = registry
            .add_category(CategoryDef::numeric("Mood", ["happy"], 10, 0, 5))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvertedRange { min: 10, max: 0, .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_default_outside_range_rejected() {
        let mut registry = AttributeRegistry::new();
        let err = registry
            .add_category(CategoryDef::numeric("Mood", ["happy"], 0, 10, 11))
            .unwrap_err();
        assert!(matches!(err, ValidationError::DefaultOutOfRange { default: 11, .. }));

        // Bounds themselves are valid defaults
        registry
            .add_category(CategoryDef::numeric("Fear", ["dark"], 0, 10, 10))
            .unwrap();
    }

    #[test]
    fn test_wrong_default_kinds_rejected() {
        let mut def = CategoryDef::boolean("Trust", ["loyal"], false);
        def.default = AttributeValue::Int(1);
        assert!(matches!(
            AttributeCategory::from_def(def),
            Err(ValidationError::BooleanDefault { .. })
        ));

        let mut def = CategoryDef::numeric("Mood", ["happy"], 0, 10, 5);
        def.default = AttributeValue::Bool(true);
        assert!(matches!(
            AttributeCategory::from_def(def),
            Err(ValidationError::NumericDefault { .. })
        ));

        let mut def = CategoryDef::numeric("Mood", ["happy"], 0, 10, 5);
        def.max = None;
        assert!(matches!(
            AttributeCategory::from_def(def),
            Err(ValidationError::MissingRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut registry = AttributeRegistry::new();
        registry
            .add_category(CategoryDef::boolean("Trust", ["loyal"], false))
            .unwrap();
        let err = registry
            .add_category(CategoryDef::boolean("Trust", ["fearful"], true))
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateCategory("Trust".to_string()));
        assert!(!registry.contains("Trust", "fearful"));
    }

    #[test]
    fn test_add_subtypes() {
        let mut registry = AttributeRegistry::new();
        registry
            .add_category(CategoryDef::boolean("Trust", ["loyal"], false))
            .unwrap();
        registry.add_subtypes("Trust", ["fearful"]).unwrap();
        assert!(registry.contains("Trust", "fearful"));

        assert!(registry.add_subtypes("Nope", ["x"]).is_err());
    }

    #[test]
    fn test_separator_in_names_rejected() {
        let mut registry = AttributeRegistry::new();
        let err = registry
            .add_category(CategoryDef::boolean("Trust:deep", ["loyal"], false))
            .unwrap_err();
        assert_eq!(err, ValidationError::ReservedSeparator("Trust:deep".to_string()));

        let err = registry
            .add_category(CategoryDef::boolean("Trust", ["loyal:very"], false))
            .unwrap_err();
        assert_eq!(err, ValidationError::ReservedSeparator("loyal:very".to_string()));
        assert!(registry.category("Trust").is_none());

        registry
            .add_category(CategoryDef::boolean("Trust", ["loyal"], false))
            .unwrap();
        assert!(registry.add_subtypes("Trust", ["wary", "a:b"]).is_err());
        assert!(!registry.contains("Trust", "wary"));
    }

    #[test]
    fn test_remove_category_and_subtype() {
        let mut registry = AttributeRegistry::new();
        registry
            .add_category(CategoryDef::numeric("Mood", ["happy", "angry"], 0, 10, 5))
            .unwrap();

        assert!(registry.remove_subtype("Mood", "angry"));
        assert!(!registry.remove_subtype("Mood", "angry"));
        assert!(registry.contains("Mood", "happy"));

        assert!(registry.remove_category("Mood").is_some());
        assert!(registry.category("Mood").is_none());
    }

    #[test]
    fn test_category_def_from_story_json() {
        let json = r#"{"class": "Mood", "types": ["happy"], "isBoolean": false,
                       "min": -5, "max": 5, "defaultVal": 0}"#;
        let def: CategoryDef = serde_json::from_str(json).unwrap();
        assert_eq!(def, CategoryDef::numeric("Mood", ["happy"], -5, 5, 0));

        let json = r#"{"name": "Trust", "subtypes": ["loyal"], "is_boolean": true, "default": false}"#;
        let def: CategoryDef = serde_json::from_str(json).unwrap();
        assert_eq!(def, CategoryDef::boolean("Trust", ["loyal"], false));
    }
}
