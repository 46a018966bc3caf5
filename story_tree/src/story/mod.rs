//! The story orchestrator - owns the registry, the characters and the
//! configuration, and exposes every operation callers use.

mod removal;

pub use removal::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

use story_db::{
    AttributeCategory, AttributeRegistry, AttributeStore, AttributeValue, CategoryDef,
    ConditionEvaluator, ConfigurationError, Mutation, StoryId, ValidationError,
};

use crate::action_tree::Uid;
use crate::character::{Character, CharacterDb};
use crate::config::StoryConfig;
use crate::definition::{ActionDef, CharacteristicDef, StoryDefinition};
use crate::error::{LookupMiss, Result, StoryError};
use crate::memory::{Memory, MemoryBank};
use crate::options::{Candidate, OptionEngine};

/// One independent story instance.
#[derive(Debug)]
pub struct StoryTree {
    id: StoryId,
    config: StoryConfig,
    registry: AttributeRegistry,
    characters: CharacterDb,
    rng: StdRng,
}

impl StoryTree {
    /// Create an empty story with the given configuration.
    pub fn new(config: StoryConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let id = StoryId::new();
        tracing::debug!("StoryTree {}: created (seed={:?})", id, config.seed);

        Ok(Self {
            id,
            config,
            registry: AttributeRegistry::new(),
            characters: CharacterDb::new(),
            rng,
        })
    }

    /// Create an empty story with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            id: StoryId::new(),
            config: StoryConfig::default(),
            registry: AttributeRegistry::new(),
            characters: CharacterDb::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a story and load a complete definition into it.
    pub fn from_definition(config: StoryConfig, definition: &StoryDefinition) -> Result<Self> {
        let mut story = Self::new(config)?;
        story.load(definition)?;
        Ok(story)
    }

    /// Load categories, characters, characteristics and actions, in that
    /// order.
    pub fn load(&mut self, definition: &StoryDefinition) -> Result<()> {
        self.load_categories(definition.categories.iter().cloned())?;
        self.load_characters(definition.characters.iter().cloned())?;
        self.load_characteristics(&definition.characteristics)?;
        for (character, actions) in &definition.actions {
            self.load_actions(character, actions)?;
        }
        Ok(())
    }

    /// Define categories. A category that already exists gains the new
    /// subtypes instead.
    pub fn load_categories(&mut self, definitions: impl IntoIterator<Item = CategoryDef>) -> Result<()> {
        let mut added = 0;
        for def in definitions {
            if self.registry.category(&def.name).is_none() {
                self.registry.add_category(def)?;
                added += 1;
                continue;
            }

            let category = AttributeCategory::from_def(def)?;
            tracing::warn!(
                "StoryTree {}: category '{}' already defined, adding subtypes only",
                self.id,
                category.name
            );
            self.registry.add_subtypes(&category.name, category.subtypes)?;
        }

        tracing::info!(
            "StoryTree {}: {} categories loaded ({} total)",
            self.id,
            added,
            self.registry.len()
        );
        Ok(())
    }

    /// Add characters by name. Names already present are skipped.
    pub fn load_characters(&mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Result<()> {
        for name in names {
            let name = name.into();
            if self.characters.contains(&name) {
                tracing::warn!(
                    "StoryTree {}: character '{}' already exists, skipping",
                    self.id,
                    name
                );
                continue;
            }
            let memory = MemoryBank::new().with_recency_weight(self.config.recency_weight);
            self.characters
                .insert(Character::new(name).with_memory(memory))?;
        }

        tracing::info!(
            "StoryTree {}: {} characters",
            self.id,
            self.characters.len()
        );
        Ok(())
    }

    /// Set starting values for characteristics.
    pub fn load_characteristics(&mut self, definitions: &[CharacteristicDef]) -> Result<()> {
        for def in definitions {
            let category = self
                .registry
                .category(&def.category)
                .filter(|c| c.has_subtype(&def.subtype))
                .ok_or_else(|| ValidationError::UnknownAttribute {
                    category: def.category.clone(),
                    subtype: def.subtype.clone(),
                })?;
            let expected = category.default_value().kind();
            if def.value.kind() != expected {
                return Err(ValidationError::ValueKind {
                    category: def.category.clone(),
                    subtype: def.subtype.clone(),
                    expected,
                    found: def.value,
                }
                .into());
            }

            let store = self
                .characters
                .get_mut(&def.character)
                .map(|c| &mut c.attributes)
                .ok_or_else(|| ValidationError::UnknownCharacter(def.character.clone()))?;
            store.apply(
                &self.registry,
                &def.category,
                &def.subtype,
                Mutation::Assign,
                def.value,
            )?;
        }

        tracing::info!(
            "StoryTree {}: {} characteristics set",
            self.id,
            definitions.len()
        );
        Ok(())
    }

    /// Build a character's action tree.
    ///
    /// The tree is only replaced once every action has been checked and the
    /// finished tree validates; on error the previous tree is kept.
    pub fn load_actions(&mut self, character: &str, definitions: &[ActionDef]) -> Result<()> {
        let owner = self
            .characters
            .get_mut(character)
            .ok_or_else(|| ValidationError::UnknownCharacter(character.to_string()))?;
        let mut tree = owner.tree.clone();
        let structural = |e| StoryError::structural(character, e);

        for def in definitions {
            for precondition in &def.preconditions {
                precondition.validate(&self.registry)?;
            }
            for expression in &def.expressions {
                expression.validate(&self.registry)?;
            }
            tree.insert(def.to_action()).map_err(structural)?;
            if def.first {
                tree.add_first(def.uid);
            }
        }
        for def in definitions {
            for &child in &def.leads_to {
                tree.add_child(def.uid, child).map_err(structural)?;
            }
        }

        tree.validate().map_err(structural)?;
        for def in definitions {
            if let Some(category) = def.category.as_deref().filter(|c| !c.is_empty()) {
                tree.propagate_category(def.uid, category)
                    .map_err(structural)?;
            }
        }

        tracing::info!(
            "StoryTree {}: {} actions loaded for '{}' ({} first)",
            self.id,
            definitions.len(),
            character,
            tree.roots().len()
        );
        owner.tree = tree;
        Ok(())
    }

    /// Up to `max_options` paths the character can take, best first.
    pub fn options(&mut self, character: &str, max_options: usize) -> Result<Vec<Vec<Uid>>> {
        let scored = self.scored_options(character, max_options)?;
        Ok(scored.into_iter().map(|c| c.path).collect())
    }

    /// Options using the configured default count.
    pub fn default_options(&mut self, character: &str) -> Result<Vec<Vec<Uid>>> {
        self.options(character, self.config.default_max_options)
    }

    /// Like [`StoryTree::options`], keeping scores and category labels.
    pub fn scored_options(&mut self, character: &str, max_options: usize) -> Result<Vec<Candidate>> {
        let owner = self
            .characters
            .get(character)
            .ok_or_else(|| LookupMiss::UnknownCharacter(character.to_string()))?;
        let engine = OptionEngine::new(
            &self.registry,
            &self.characters,
            self.config.conversation_type,
        );
        engine.options(owner, max_options, &mut self.rng)
    }

    /// Take a path: apply every expression along it in order and remember
    /// what changed.
    ///
    /// Every uid and every expression is checked before anything changes, so
    /// a rejected path leaves the story untouched.
    pub fn execute(&mut self, character: &str, path: &[Uid]) -> Result<()> {
        let owner = self.character(character)?;
        if path.is_empty() {
            tracing::warn!("StoryTree {}: empty path for '{}' ignored", self.id, character);
            return Ok(());
        }

        let mut expressions = Vec::new();
        for &uid in path {
            let action = owner.tree.action(uid).ok_or_else(|| LookupMiss::UnknownAction {
                character: character.to_string(),
                uid,
            })?;
            expressions.extend(action.expressions.iter().cloned());
        }

        let evaluator = ConditionEvaluator::new(&self.registry);
        for expression in &expressions {
            evaluator.check_expression(expression)?;
            if !self.characters.contains(&expression.character) {
                return Err(ConfigurationError::UnknownCharacter(expression.character.clone()).into());
            }
        }

        let mut memory = Memory::new(path);
        for expression in &expressions {
            let change = evaluator.apply(expression, &mut self.characters)?;
            memory.encode(expression, &change);
        }

        tracing::info!(
            "StoryTree {}: '{}' took {} ({} attributes changed)",
            self.id,
            character,
            memory.path_key(),
            memory.vector.len()
        );
        self.character_mut(character)?.memory.add(memory);
        Ok(())
    }

    /// Display name of an action.
    pub fn action_name(&self, character: &str, uid: Uid) -> Result<&str> {
        let owner = self.character(character)?;
        owner
            .tree
            .action(uid)
            .map(|a| a.name.as_str())
            .ok_or_else(|| {
                LookupMiss::UnknownAction {
                    character: character.to_string(),
                    uid,
                }
                .into()
            })
    }

    /// A character's materialized characteristics.
    pub fn characteristics(&self, character: &str) -> Result<&AttributeStore> {
        Ok(&self.character(character)?.attributes)
    }

    /// Current value of one characteristic, materializing it from the
    /// registry default on first read.
    pub fn value(&mut self, character: &str, category: &str, subtype: &str) -> Result<AttributeValue> {
        let owner = self
            .characters
            .get_mut(character)
            .ok_or_else(|| LookupMiss::UnknownCharacter(character.to_string()))?;
        let characteristic = owner
            .attributes
            .materialize(&self.registry, category, subtype)?;
        Ok(characteristic.value)
    }

    /// Every root-to-leaf path of a character's tree, ignoring preconditions.
    pub fn all_paths(&self, character: &str) -> Result<Vec<Vec<Uid>>> {
        self.character(character)?
            .tree
            .all_paths()
            .map_err(|e| StoryError::structural(character, e))
    }

    pub fn memory(&self, character: &str) -> Result<&MemoryBank> {
        Ok(&self.character(character)?.memory)
    }

    /// Names of all characters, sorted.
    pub fn character_names(&self) -> Vec<&str> {
        self.characters.names().collect()
    }

    pub fn character(&self, name: &str) -> Result<&Character> {
        self.characters
            .get(name)
            .ok_or_else(|| LookupMiss::UnknownCharacter(name.to_string()).into())
    }

    pub fn character_mut(&mut self, name: &str) -> Result<&mut Character> {
        self.characters
            .get_mut(name)
            .ok_or_else(|| LookupMiss::UnknownCharacter(name.to_string()).into())
    }

    /// Change the target salience used for ranking.
    pub fn set_conversation_type(&mut self, conversation_type: f32) -> Result<()> {
        let config = self.config.clone().with_conversation_type(conversation_type);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn id(&self) -> StoryId {
        self.id
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn characters(&self) -> &CharacterDb {
        &self.characters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use story_db::{Comparison, Expression, Precondition};

    fn story() -> StoryTree {
        let mut story = StoryTree::new(StoryConfig::default().with_seed(11)).unwrap();
        story
            .load_categories([
                CategoryDef::boolean("Trust", ["loyal"], false),
                CategoryDef::numeric("Mood", ["happy", "angry"], 0, 10, 5),
            ])
            .unwrap();
        story.load_characters(["Bob", "World"]).unwrap();
        story
            .load_actions(
                "Bob",
                &[
                    ActionDef::new(1, "Greet")
                        .first()
                        .with_expression(Expression::new(
                            "Bob",
                            "Trust",
                            "loyal",
                            Mutation::Assign,
                            true,
                        ))
                        .with_expression(Expression::new(
                            "World",
                            "Mood",
                            "happy",
                            Mutation::Add,
                            2i64,
                        ))
                        .leads_to([2]),
                    ActionDef::new(2, "Confide").with_precondition(Precondition::new(
                        "Bob",
                        "Trust",
                        "loyal",
                        Comparison::Equal,
                        true,
                    )),
                ],
            )
            .unwrap();
        story
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = StoryTree::new(StoryConfig::default().with_conversation_type(2.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_load_categories_merges_subtypes() {
        let mut story = story();
        story
            .load_categories([CategoryDef::numeric("Mood", ["bored"], 0, 10, 5)])
            .unwrap();

        let mood = story.registry().category("Mood").unwrap();
        assert!(mood.has_subtype("happy"));
        assert!(mood.has_subtype("bored"));
    }

    #[test]
    fn test_load_characters_skips_duplicates() {
        let mut story = story();
        story.load_characters(["Bob", "Alice"]).unwrap();
        assert_eq!(story.character_names(), vec!["Alice", "Bob", "World"]);

        let err = story.load_characters([""]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_load_characteristics() {
        let mut story = story();
        story
            .load_characteristics(&[CharacteristicDef::new("Bob", "Mood", "angry", 9i64)])
            .unwrap();
        assert_eq!(story.value("Bob", "Mood", "angry").unwrap(), AttributeValue::Int(9));

        let err = story
            .load_characteristics(&[CharacteristicDef::new("Bob", "Mood", "angry", true)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = story
            .load_characteristics(&[CharacteristicDef::new("Alice", "Mood", "angry", 1i64)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_load_actions_rejects_cycle_and_keeps_old_tree() {
        let mut story = story();
        let err = story
            .load_actions(
                "Bob",
                &[
                    ActionDef::new(3, "Loop").leads_to([4]),
                    ActionDef::new(4, "Back").leads_to([3]),
                ],
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(story.character("Bob").unwrap().tree.action(3).is_none());
        assert_eq!(story.all_paths("Bob").unwrap(), vec![vec![1, 2]]);
    }

    #[test]
    fn test_load_actions_duplicate_uid() {
        let mut story = story();
        let err = story
            .load_actions("Bob", &[ActionDef::new(1, "Again")])
            .unwrap_err();
        assert!(matches!(
            err,
            StoryError::Structural {
                source: crate::error::StructuralError::DuplicateUid(1),
                ..
            }
        ));
    }

    #[test]
    fn test_load_actions_unknown_character() {
        let mut story = story();
        let err = story.load_actions("Alice", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_options_and_execute() {
        let mut story = story();
        assert_eq!(story.options("Bob", 3).unwrap(), Vec::<Vec<Uid>>::new());

        // The leaf is gated, so nothing is offered until loyal is set
        story.execute("Bob", &[1]).unwrap();
        assert_eq!(story.value("Bob", "Trust", "loyal").unwrap(), AttributeValue::Bool(true));
        assert_eq!(story.value("World", "Mood", "happy").unwrap(), AttributeValue::Int(7));
        assert_eq!(story.options("Bob", 3).unwrap(), vec![vec![1, 2]]);

        let memory = story.memory("Bob").unwrap();
        assert_eq!(memory.steps(), 1);
        assert_eq!(memory.last().unwrap().path_key(), "[1]");
        assert!((memory.aggregate().get("Bob:Trust:loyal") - 1.0).abs() < 0.001);
        assert!((memory.aggregate().get("World:Mood:happy") - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_execute_unknown_uid_changes_nothing() {
        let mut story = story();
        let err = story.execute("Bob", &[1, 9]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LookupMiss);
        assert!(story.characteristics("Bob").unwrap().is_empty());
        assert!(story.characteristics("World").unwrap().is_empty());
        assert!(story.memory("Bob").unwrap().is_empty());
    }

    #[test]
    fn test_execute_unknown_target_changes_nothing() {
        let mut story = story();
        story
            .character_mut("Bob")
            .unwrap()
            .tree
            .action_mut(2)
            .unwrap()
            .expressions
            .push(Expression::new("Alice", "Mood", "happy", Mutation::Add, 1i64));

        let err = story.execute("Bob", &[1, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(story.characteristics("Bob").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_character_is_lookup_miss() {
        let mut story = story();
        assert_eq!(story.options("Alice", 1).unwrap_err().kind(), ErrorKind::LookupMiss);
        assert_eq!(story.execute("Alice", &[1]).unwrap_err().kind(), ErrorKind::LookupMiss);
        assert_eq!(story.action_name("Alice", 1).unwrap_err().kind(), ErrorKind::LookupMiss);
    }

    #[test]
    fn test_action_name() {
        let story = story();
        assert_eq!(story.action_name("Bob", 2).unwrap(), "Confide");
        assert_eq!(story.action_name("Bob", 7).unwrap_err().kind(), ErrorKind::LookupMiss);
    }

    #[test]
    fn test_value_materializes() {
        let mut story = story();
        assert!(story.characteristics("World").unwrap().is_empty());
        assert_eq!(story.value("World", "Mood", "angry").unwrap(), AttributeValue::Int(5));
        assert_eq!(story.characteristics("World").unwrap().len(), 1);

        let err = story.value("World", "Mood", "sleepy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_set_conversation_type() {
        let mut story = story();
        story.set_conversation_type(0.9).unwrap();
        assert!((story.config().conversation_type - 0.9).abs() < 0.001);

        assert!(story.set_conversation_type(-0.1).is_err());
        assert!((story.config().conversation_type - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = story();
        let second = story();
        first.execute("Bob", &[1]).unwrap();

        assert_ne!(first.id(), second.id());
        assert!(second.characteristics("Bob").unwrap().is_empty());
    }
}
