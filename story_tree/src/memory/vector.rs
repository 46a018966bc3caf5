//! Sparse change vectors keyed by `character:category:subtype`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse map from attribute key to a non-negative weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MemoryVector {
    weights: BTreeMap<String, f32>,
}

impl MemoryVector {
    /// Create a new empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add weight to a key (accumulates with existing weight).
    pub fn add(&mut self, key: impl Into<String>, weight: f32) {
        let current = self.weights.entry(key.into()).or_insert(0.0);
        *current += weight;
    }

    /// Add weight to a key, never letting it exceed `cap`.
    pub fn add_capped(&mut self, key: impl Into<String>, weight: f32, cap: f32) {
        let current = self.weights.entry(key.into()).or_insert(0.0);
        *current = (*current + weight).min(cap);
    }

    /// Set the weight of a key to a specific value.
    pub fn set(&mut self, key: impl Into<String>, weight: f32) {
        self.weights.insert(key.into(), weight);
    }

    /// Get the weight of a key.
    pub fn get(&self, key: &str) -> f32 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f32 {
        self.weights.values().map(|w| w * w).sum::<f32>().sqrt()
    }

    /// Scale to unit length. A zero vector normalizes to an empty one.
    pub fn normalized(&self) -> MemoryVector {
        let magnitude = self.magnitude();
        if magnitude <= 0.0 {
            return MemoryVector::new();
        }
        MemoryVector {
            weights: self
                .weights
                .iter()
                .map(|(key, weight)| (key.clone(), weight / magnitude))
                .collect(),
        }
    }

    /// Sparse dot product.
    pub fn similarity(&self, other: &MemoryVector) -> f32 {
        let (short, long) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        short
            .weights
            .iter()
            .filter_map(|(key, weight)| long.weights.get(key).map(|w| weight * w))
            .sum()
    }

    /// Sum with another vector whose every key is boosted by `boost`.
    pub fn combine(&self, other: &MemoryVector, boost: f32) -> MemoryVector {
        let mut combined = self.clone();
        for (key, weight) in &other.weights {
            combined.add(key.clone(), weight + boost);
        }
        combined
    }

    /// Iterate over all weights, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.weights.iter().map(|(key, weight)| (key.as_str(), *weight))
    }

    /// Drop every key for which the predicate returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.weights.retain(|key, _| keep(key.as_str()));
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulation() {
        let mut vector = MemoryVector::new();
        vector.add("Bob:Mood:happy", 0.3);
        vector.add("Bob:Mood:happy", 0.4);
        assert!((vector.get("Bob:Mood:happy") - 0.7).abs() < 0.001);
        assert_eq!(vector.get("Bob:Mood:sad"), 0.0);
    }

    #[test]
    fn test_add_capped() {
        let mut vector = MemoryVector::new();
        vector.add_capped("k", 0.8, 1.0);
        vector.add_capped("k", 0.8, 1.0);
        assert!((vector.get("k") - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalized() {
        let mut vector = MemoryVector::new();
        vector.add("a", 3.0);
        vector.add("b", 4.0);

        let unit = vector.normalized();
        assert!((unit.get("a") - 0.6).abs() < 0.001);
        assert!((unit.get("b") - 0.8).abs() < 0.001);
        assert!((unit.magnitude() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_normalizes_empty() {
        let mut vector = MemoryVector::new();
        vector.set("a", 0.0);
        assert!(vector.normalized().is_empty());
        assert!(MemoryVector::new().normalized().is_empty());
    }

    #[test]
    fn test_self_similarity() {
        let mut vector = MemoryVector::new();
        vector.add("a", 0.2);
        vector.add("b", 0.5);
        vector.add("c", 1.0);

        let unit = vector.normalized();
        assert!((unit.similarity(&unit) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let mut a = MemoryVector::new();
        a.add("x", 1.0);
        a.add("y", 2.0);
        a.add("z", 3.0);
        let mut b = MemoryVector::new();
        b.add("y", 0.5);

        assert!((a.similarity(&b) - 1.0).abs() < 0.001);
        assert!((b.similarity(&a) - 1.0).abs() < 0.001);
        assert_eq!(a.similarity(&MemoryVector::new()), 0.0);
    }

    #[test]
    fn test_combine() {
        let mut aggregate = MemoryVector::new();
        aggregate.add("a", 1.0);
        let mut next = MemoryVector::new();
        next.add("a", 0.5);
        next.add("b", 0.25);

        let combined = aggregate.combine(&next, 0.1);
        assert!((combined.get("a") - 1.6).abs() < 0.001);
        assert!((combined.get("b") - 0.35).abs() < 0.001);
        // Inputs are untouched
        assert!((aggregate.get("a") - 1.0).abs() < 0.001);
    }
}
