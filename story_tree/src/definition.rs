//! Loader input: typed definitions in the story file format.
//!
//! Field names follow the JSON files authors already write (`class`, `type`,
//! `leadsTo`, ...). Snake-case names are accepted as aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use story_db::{AttributeValue, CategoryDef, Expression, Precondition};

use crate::action_tree::{Action, Uid};

/// Initial value for one character's characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicDef {
    #[serde(rename = "name", alias = "character")]
    pub character: String,
    #[serde(rename = "class", alias = "category")]
    pub category: String,
    #[serde(rename = "type", alias = "subtype")]
    pub subtype: String,
    pub value: AttributeValue,
}

impl CharacteristicDef {
    pub fn new(
        character: impl Into<String>,
        category: impl Into<String>,
        subtype: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            character: character.into(),
            category: category.into(),
            subtype: subtype.into(),
            value: value.into(),
        }
    }
}

/// One action node as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub uid: Uid,
    pub name: String,
    /// Marks a first action.
    #[serde(default)]
    pub first: bool,
    #[serde(rename = "class", alias = "category", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(rename = "leadsTo", alias = "leads_to", default)]
    pub leads_to: Vec<Uid>,
}

impl ActionDef {
    pub fn new(uid: Uid, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            first: false,
            category: None,
            preconditions: Vec::new(),
            expressions: Vec::new(),
            leads_to: Vec::new(),
        }
    }

    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    pub fn leads_to(mut self, children: impl IntoIterator<Item = Uid>) -> Self {
        self.leads_to.extend(children);
        self
    }

    /// The node without its edges.
    pub fn to_action(&self) -> Action {
        let mut action = Action::new(self.uid, self.name.clone());
        action.preconditions = self.preconditions.clone();
        action.expressions = self.expressions.clone();
        if let Some(category) = &self.category {
            action = action.with_category(category.clone());
        }
        action
    }
}

/// A complete story: everything [`crate::StoryTree::load`] needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoryDefinition {
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub characteristics: Vec<CharacteristicDef>,
    /// Action lists by character name.
    #[serde(default)]
    pub actions: BTreeMap<String, Vec<ActionDef>>,
}

impl StoryDefinition {
    /// Parse a definition from JSON.
    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}
