//! Option Engine - finds the paths a character can take and ranks them.
//!
//! Discovery works as follows:
//! 1. **Walk**: Depth-first from each first action
//! 2. **Gate**: A node whose preconditions fail prunes its subtree
//! 3. **Imagine**: Each visited node's expressions run against a scratch
//!    overlay, building the memory the path would leave behind
//! 4. **Score**: At a leaf, compare the memory bank's aggregate with and
//!    without that hypothetical memory
//! 5. **Select**: Best scores first, at most one path per category label

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use story_db::{AttributeRegistry, ConditionEvaluator, StoreLookup, StoreOverlay};

use crate::action_tree::{ActionTree, Uid};
use crate::character::Character;
use crate::error::{Result, StoryError};
use crate::memory::{Memory, MemoryBank, MemoryVector};

/// A leaf-terminated path that passed every precondition along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Uids from a first action to a leaf.
    pub path: Vec<Uid>,

    /// Distance from the conversation type; lower is better.
    pub score: f32,

    /// First category label found along the path.
    pub category: Option<String>,
}

/// Discovers and ranks candidate paths against a read-only view of the
/// world.
pub struct OptionEngine<'a, S: StoreLookup + ?Sized> {
    evaluator: ConditionEvaluator<'a>,
    stores: &'a S,
    conversation_type: f32,
}

// Per-branch state carried down the tree.
struct Walk<'a, S: StoreLookup + ?Sized> {
    memory: Memory,
    scratch: StoreOverlay<'a, S>,
    category: Option<String>,
}

impl<S: StoreLookup + ?Sized> Walk<'_, S> {
    fn fork(&self) -> Self {
        Self {
            memory: self.memory.clone(),
            scratch: self.scratch.clone(),
            category: self.category.clone(),
        }
    }
}

impl<'a, S: StoreLookup + ?Sized> OptionEngine<'a, S> {
    /// Create a new engine.
    pub fn new(registry: &'a AttributeRegistry, stores: &'a S, conversation_type: f32) -> Self {
        Self {
            evaluator: ConditionEvaluator::new(registry),
            stores,
            conversation_type,
        }
    }

    /// Find, score and select up to `max_options` paths for a character.
    pub fn options<R: Rng + ?Sized>(
        &self,
        character: &Character,
        max_options: usize,
        rng: &mut R,
    ) -> Result<Vec<Candidate>> {
        let candidates = self.candidates(character)?;
        Ok(select(candidates, max_options, rng))
    }

    /// Every reachable path with its score, unranked.
    pub fn candidates(&self, character: &Character) -> Result<Vec<Candidate>> {
        character
            .tree
            .ensure_validated()
            .map_err(|e| StoryError::structural(character.name.clone(), e))?;

        let target = character.memory.aggregate().normalized();
        let mut found = Vec::new();

        for &root in character.tree.roots() {
            let walk = Walk {
                memory: Memory::new(Vec::new()),
                scratch: StoreOverlay::new(self.stores),
                category: None,
            };
            self.visit(&character.tree, &character.memory, &target, root, walk, &mut found)?;
        }

        tracing::debug!(
            "OptionEngine: {} candidate paths for '{}'",
            found.len(),
            character.name
        );
        Ok(found)
    }

    fn visit(
        &self,
        tree: &ActionTree,
        bank: &MemoryBank,
        target: &MemoryVector,
        uid: Uid,
        mut walk: Walk<'a, S>,
        found: &mut Vec<Candidate>,
    ) -> Result<()> {
        let Some(action) = tree.action(uid) else {
            return Ok(());
        };

        for precondition in &action.preconditions {
            if !self.evaluator.evaluate(precondition, self.stores)? {
                tracing::trace!("  Action {} pruned by {}", uid, precondition.attribute());
                return Ok(());
            }
        }

        walk.memory.path.push(uid);
        for expression in &action.expressions {
            let change = self.evaluator.apply(expression, &mut walk.scratch)?;
            walk.memory.encode(expression, &change);
        }
        if walk.category.is_none() {
            walk.category = action.category.clone();
        }

        if action.is_leaf() {
            let score = self.score(bank, target, &walk.memory.vector);
            tracing::debug!(
                "  Path {}: score={} (category={:?})",
                walk.memory.path_key(),
                score,
                walk.category
            );
            found.push(Candidate {
                path: walk.memory.path,
                score,
                category: walk.category,
            });
            return Ok(());
        }

        for &child in action.children() {
            self.visit(tree, bank, target, child, walk.fork(), found)?;
        }
        Ok(())
    }

    /// `|conversation_type - similarity|` between the aggregate as it is and
    /// as it would be with the hypothetical memory added.
    pub fn score(&self, bank: &MemoryBank, target: &MemoryVector, hypothetical: &MemoryVector) -> f32 {
        let preview = bank.preview(hypothetical).normalized();
        (self.conversation_type - preview.similarity(target)).abs()
    }
}

/// Rank candidates and keep at most `max_options`, one per category label.
///
/// Ties are broken by a shuffle before the stable sort, so equally scored
/// paths come back in an order decided by `rng`. Unlabelled paths never
/// conflict.
pub fn select<R: Rng + ?Sized>(
    mut candidates: Vec<Candidate>,
    max_options: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    candidates.shuffle(rng);
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));

    let mut labels = HashSet::new();
    let mut selected = Vec::new();
    for candidate in candidates {
        if selected.len() >= max_options {
            break;
        }
        if let Some(label) = &candidate.category {
            if !labels.insert(label.clone()) {
                tracing::trace!(
                    "  Path {:?} skipped: category '{}' already offered",
                    candidate.path,
                    label
                );
                continue;
            }
        }
        selected.push(candidate);
    }
    selected
}
