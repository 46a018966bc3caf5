//! One executed path and what it changed.

use serde::{Deserialize, Serialize};
use story_db::{Change, Expression};

use super::MemoryVector;
use crate::action_tree::Uid;

/// Largest weight a single key may carry within one memory.
pub const MAX_KEY_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Memory {
    /// Uids of the executed path, root first.
    pub path: Vec<Uid>,

    /// How far each touched attribute moved.
    pub vector: MemoryVector,
}

impl Memory {
    /// Create a new empty memory for a path.
    pub fn new(path: impl Into<Vec<Uid>>) -> Self {
        Self {
            path: path.into(),
            vector: MemoryVector::new(),
        }
    }

    /// Record the effect of one expression. Changes that moved nothing are
    /// not recorded.
    pub fn encode(&mut self, expression: &Expression, change: &Change) {
        if change.is_noop() {
            return;
        }
        self.vector
            .add_capped(expression.memory_key(), change.magnitude(), MAX_KEY_WEIGHT);
    }

    /// Fingerprint of the path, e.g. `[1:2:5]`.
    pub fn path_key(&self) -> String {
        let uids: Vec<String> = self.path.iter().map(|uid| uid.to_string()).collect();
        format!("[{}]", uids.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_db::{AttributeValue, Mutation, Range};

    fn numeric(before: i64, after: i64) -> Change {
        Change {
            before: AttributeValue::Int(before),
            after: AttributeValue::Int(after),
            range: Some(Range::new(0, 10)),
        }
    }

    #[test]
    fn test_path_key() {
        assert_eq!(Memory::new(vec![1, 2, 5]).path_key(), "[1:2:5]");
        assert_eq!(Memory::new(vec![7]).path_key(), "[7]");
    }

    #[test]
    fn test_encode_numeric() {
        let exp = Expression::new("Bob", "Mood", "happy", Mutation::Add, 3i64);
        let mut memory = Memory::new(vec![1]);
        memory.encode(&exp, &numeric(5, 8));
        assert!((memory.vector.get("Bob:Mood:happy") - 0.3).abs() < 0.001);
    }

    #[test]
    fn test_encode_boolean() {
        let exp = Expression::new("Bob", "Trust", "loyal", Mutation::Assign, true);
        let change = Change {
            before: AttributeValue::Bool(false),
            after: AttributeValue::Bool(true),
            range: None,
        };
        let mut memory = Memory::new(vec![1]);
        memory.encode(&exp, &change);
        assert!((memory.vector.get("Bob:Trust:loyal") - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_noop_not_recorded() {
        let exp = Expression::new("Bob", "Mood", "happy", Mutation::Add, 3i64);
        let mut memory = Memory::new(vec![1]);
        memory.encode(&exp, &numeric(10, 10));
        assert!(memory.vector.is_empty());
    }

    #[test]
    fn test_key_weight_is_capped() {
        let exp = Expression::new("Bob", "Mood", "happy", Mutation::Add, 8i64);
        let mut memory = Memory::new(vec![1, 2]);
        memory.encode(&exp, &numeric(0, 8));
        memory.encode(&exp, &numeric(8, 0));
        assert!((memory.vector.get("Bob:Mood:happy") - 1.0).abs() < 0.001);
    }
}
