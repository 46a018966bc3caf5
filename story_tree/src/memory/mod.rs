//! Memory Model - what a character's executed paths changed, weighted by
//! recency.
//!
//! Each executed path becomes a [`Memory`]: a sparse vector keyed by
//! `character:category:subtype`. A [`MemoryBank`] keeps them in order and
//! maintains an aggregate in which later memories count for more. Candidate
//! paths are scored by how similar the aggregate would look if they ran next.

mod entry;
mod vector;

pub use entry::*;
pub use vector::*;

use serde::{Deserialize, Serialize};

/// Default boost per interaction step.
pub const DEFAULT_RECENCY_WEIGHT: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryBank {
    memories: Vec<Memory>,
    steps: u32,
    aggregate: MemoryVector,
    recency_weight: f32,
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self {
            memories: Vec::new(),
            steps: 0,
            aggregate: MemoryVector::new(),
            recency_weight: DEFAULT_RECENCY_WEIGHT,
        }
    }
}

impl MemoryBank {
    /// Create a new empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recency_weight(mut self, recency_weight: f32) -> Self {
        self.recency_weight = recency_weight;
        self
    }

    /// Record a memory as the next step.
    ///
    /// Every key is added to the aggregate with a boost of
    /// `recency_weight * (steps - 1)`, counting this step.
    pub fn add(&mut self, memory: Memory) {
        self.steps += 1;
        let boost = self.boost_for(self.steps);
        for (key, weight) in memory.vector.iter() {
            self.aggregate.add(key, weight + boost);
        }
        self.memories.push(memory);
    }

    /// The aggregate as it would look if `hypothetical` were the next step.
    pub fn preview(&self, hypothetical: &MemoryVector) -> MemoryVector {
        self.aggregate
            .combine(hypothetical, self.boost_for(self.steps + 1))
    }

    fn boost_for(&self, step: u32) -> f32 {
        self.recency_weight * step.saturating_sub(1) as f32
    }

    /// Forget every key for which the predicate returns false, in the
    /// aggregate and in each stored memory.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.aggregate.retain(&mut keep);
        for memory in &mut self.memories {
            memory.vector.retain(&mut keep);
        }
    }

    pub fn aggregate(&self) -> &MemoryVector {
        &self.aggregate
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    /// Most recent memory.
    pub fn last(&self) -> Option<&Memory> {
        self.memories.last()
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn recency_weight(&self) -> f32 {
        self.recency_weight
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }
}
