//! Removing definitions, and everything that refers to them.

use story_db::{AttributeRef, KEY_SEPARATOR};

use super::StoryTree;
use crate::action_tree::{Action, Uid};
use crate::character::Character;
use crate::error::{LookupMiss, Result};

/// Selects preconditions or expressions for removal.
///
/// Every field left unset matches anything, so an empty filter matches every
/// condition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionFilter {
    /// Owner of the action tree the condition lives in.
    pub character: Option<String>,
    pub uid: Option<Uid>,
    /// Character the condition reads or writes.
    pub target: Option<String>,
    pub category: Option<String>,
    pub subtype: Option<String>,
}

impl ConditionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    pub fn uid(mut self, uid: Uid) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    fn matches_action(&self, owner: &str, uid: Uid) -> bool {
        self.character.as_deref().map_or(true, |c| c == owner)
            && self.uid.map_or(true, |u| u == uid)
    }

    /// Does a condition in the given tree and action match?
    pub fn matches<C: AttributeRef>(&self, owner: &str, uid: Uid, condition: &C) -> bool {
        self.matches_action(owner, uid)
            && self.target.as_deref().map_or(true, |t| t == condition.character())
            && self.category.as_deref().map_or(true, |c| c == condition.category())
            && self.subtype.as_deref().map_or(true, |s| s == condition.subtype())
    }
}

impl StoryTree {
    /// Remove a category along with every characteristic, condition and
    /// remembered change that refers to it.
    pub fn remove_category(&mut self, category: &str) -> Result<()> {
        self.registry
            .remove_category(category)
            .ok_or_else(|| LookupMiss::UnknownCategory(category.to_string()))?;

        for character in self.characters.iter_mut() {
            character.attributes.remove_category(category);
            character
                .memory
                .retain_keys(|key| key_category(key) != Some(category));
        }
        let filter = ConditionFilter::new().category(category);
        let removed = self.remove_preconditions(&filter) + self.remove_expressions(&filter);

        tracing::info!(
            "StoryTree {}: removed category '{}' ({} conditions)",
            self.id,
            category,
            removed
        );
        Ok(())
    }

    /// Remove one subtype along with everything that refers to it.
    pub fn remove_subtype(&mut self, category: &str, subtype: &str) -> Result<()> {
        if self.registry.category(category).is_none() {
            return Err(LookupMiss::UnknownCategory(category.to_string()).into());
        }
        if !self.registry.remove_subtype(category, subtype) {
            return Err(LookupMiss::UnknownSubtype {
                category: category.to_string(),
                subtype: subtype.to_string(),
            }
            .into());
        }

        for character in self.characters.iter_mut() {
            character.attributes.remove_subtype(category, subtype);
            character.memory.retain_keys(|key| {
                key_category(key) != Some(category) || key_subtype(key) != Some(subtype)
            });
        }
        let filter = ConditionFilter::new().category(category).subtype(subtype);
        let removed = self.remove_preconditions(&filter) + self.remove_expressions(&filter);

        tracing::info!(
            "StoryTree {}: removed subtype '{}:{}' ({} conditions)",
            self.id,
            category,
            subtype,
            removed
        );
        Ok(())
    }

    /// Remove a character. Conditions in other trees that target it are
    /// removed too, as are remembered changes to its attributes.
    pub fn remove_character(&mut self, name: &str) -> Result<Character> {
        let removed = self
            .characters
            .remove(name)
            .ok_or_else(|| LookupMiss::UnknownCharacter(name.to_string()))?;

        let prefix = format!("{}{}", name, KEY_SEPARATOR);
        for character in self.characters.iter_mut() {
            character.memory.retain_keys(|key| !key.starts_with(&prefix));
        }
        let filter = ConditionFilter::new().target(name);
        let conditions = self.remove_preconditions(&filter) + self.remove_expressions(&filter);

        tracing::info!(
            "StoryTree {}: removed character '{}' ({} conditions)",
            self.id,
            name,
            conditions
        );
        Ok(removed)
    }

    /// Remove one action from a character's tree.
    pub fn remove_action(&mut self, character: &str, uid: Uid) -> Result<Action> {
        let owner = self.character_mut(character)?;
        let removed = owner.tree.remove_action(uid).ok_or_else(|| LookupMiss::UnknownAction {
            character: character.to_string(),
            uid,
        })?;

        tracing::debug!(
            "StoryTree {}: removed action {} from '{}'",
            self.id,
            uid,
            character
        );
        Ok(removed)
    }

    /// Remove matching preconditions. Returns how many were removed.
    pub fn remove_preconditions(&mut self, filter: &ConditionFilter) -> usize {
        self.retain_conditions(filter, |action| &mut action.preconditions)
    }

    /// Remove matching expressions. Returns how many were removed.
    pub fn remove_expressions(&mut self, filter: &ConditionFilter) -> usize {
        self.retain_conditions(filter, |action| &mut action.expressions)
    }

    fn retain_conditions<C: AttributeRef>(
        &mut self,
        filter: &ConditionFilter,
        conditions: impl Fn(&mut Action) -> &mut Vec<C>,
    ) -> usize {
        let mut removed = 0;
        for character in self.characters.iter_mut() {
            let owner = character.name.as_str();
            for action in character.tree.actions_mut() {
                if !filter.matches_action(owner, action.uid) {
                    continue;
                }
                let uid = action.uid;
                let list = conditions(action);
                let before = list.len();
                list.retain(|c| !filter.matches(owner, uid, c));
                removed += before - list.len();
            }
        }
        removed
    }
}

// Memory keys are `character:category:subtype`; names never contain the
// separator.
fn key_category(key: &str) -> Option<&str> {
    key.split(KEY_SEPARATOR).nth(1)
}

fn key_subtype(key: &str) -> Option<&str> {
    key.split(KEY_SEPARATOR).nth(2)
}
