//! Copy-on-write view over attribute stores.

use std::collections::HashMap;

use super::{AttributeStore, StoreLookup};

/// A scratch layer over real stores.
///
/// Reads fall through to the base; the first write to a character copies
/// that character's store into the overlay, so the base is never mutated.
/// Cloning an overlay forks the scratch state, which lets a tree walk give
/// each branch its own hypothetical world.
pub struct StoreOverlay<'a, S: StoreLookup + ?Sized> {
    base: &'a S,
    touched: HashMap<String, AttributeStore>,
}

impl<'a, S: StoreLookup + ?Sized> StoreOverlay<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            touched: HashMap::new(),
        }
    }

    /// Number of characters whose stores have been copied.
    pub fn touched_count(&self) -> usize {
        self.touched.len()
    }
}

impl<S: StoreLookup + ?Sized> Clone for StoreOverlay<'_, S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base,
            touched: self.touched.clone(),
        }
    }
}

impl<S: StoreLookup + ?Sized> StoreLookup for StoreOverlay<'_, S> {
    fn store(&self, character: &str) -> Option<&AttributeStore> {
        self.touched
            .get(character)
            .or_else(|| self.base.store(character))
    }

    fn store_mut(&mut self, character: &str) -> Option<&mut AttributeStore> {
        if !self.touched.contains_key(character) {
            let copy = self.base.store(character)?.clone();
            self.touched.insert(character.to_string(), copy);
        }
        self.touched.get_mut(character)
    }
}
