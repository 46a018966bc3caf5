//! Character definitions and the database that owns them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use story_db::{check_key_part, AttributeStore, StoreLookup, ValidationError};

use crate::action_tree::ActionTree;
use crate::memory::MemoryBank;

/// A character with its own attributes, action tree and memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,

    /// Characteristics referenced so far; the rest read as registry defaults.
    pub attributes: AttributeStore,

    pub tree: ActionTree,

    pub memory: MemoryBank,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeStore::new(),
            tree: ActionTree::new(),
            memory: MemoryBank::new(),
        }
    }

    pub fn with_memory(mut self, memory: MemoryBank) -> Self {
        self.memory = memory;
        self
    }
}

/// All characters of a story, by name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterDb {
    characters: BTreeMap<String, Character>,
}

impl CharacterDb {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh character by name.
    pub fn add(&mut self, name: impl Into<String>) -> Result<&mut Character, ValidationError> {
        self.insert(Character::new(name))
    }

    /// Add a character. Names must be non-empty and unique.
    pub fn insert(&mut self, character: Character) -> Result<&mut Character, ValidationError> {
        if character.name.is_empty() {
            return Err(ValidationError::EmptyCharacterName);
        }
        check_key_part(&character.name)?;
        if self.characters.contains_key(&character.name) {
            return Err(ValidationError::DuplicateCharacter(character.name));
        }
        Ok(self
            .characters
            .entry(character.name.clone())
            .or_insert(character))
    }

    /// Get character by name.
    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// Get mutable character by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Character> {
        self.characters.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.characters.contains_key(name)
    }

    /// Character names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.values_mut()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl StoreLookup for CharacterDb {
    fn store(&self, character: &str) -> Option<&AttributeStore> {
        self.characters.get(character).map(|c| &c.attributes)
    }

    fn store_mut(&mut self, character: &str) -> Option<&mut AttributeStore> {
        self.characters.get_mut(character).map(|c| &mut c.attributes)
    }
}
