//! Action Tree - a character's forest of conditional actions.
//!
//! The tree is a DAG: an action may be reached from several parents, but no
//! action may be reachable from itself. Structure is checked once loading is
//! complete by [`ActionTree::validate`]; traversal refuses an unvalidated tree.

mod action;

pub use action::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::StructuralError;

/// Author-assigned action id, unique within one tree.
pub type Uid = u32;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActionTree {
    /// First actions, in author order.
    roots: Vec<Uid>,

    /// All actions by uid.
    actions: BTreeMap<Uid, Action>,

    #[serde(skip)]
    validated: bool,
}

impl ActionTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an action as a first action.
    pub fn add_first(&mut self, uid: Uid) {
        if !self.roots.contains(&uid) {
            self.roots.push(uid);
            self.validated = false;
        }
    }

    /// Map a new, empty action to a uid.
    pub fn map_action(&mut self, name: impl Into<String>, uid: Uid) -> Result<&mut Action, StructuralError> {
        self.insert(Action::new(uid, name))
    }

    /// Insert a fully built action. Its own edge lists are ignored; use
    /// [`ActionTree::add_child`] to link it.
    pub fn insert(&mut self, mut action: Action) -> Result<&mut Action, StructuralError> {
        let uid = action.uid;
        if self.actions.contains_key(&uid) {
            return Err(StructuralError::DuplicateUid(uid));
        }

        // Children may be linked before they are mapped
        action.children.clear();
        action.parents = self
            .actions
            .values()
            .filter(|a| a.children.contains(&uid))
            .map(|a| a.uid)
            .collect();

        self.validated = false;
        Ok(self.actions.entry(uid).or_insert(action))
    }

    /// Link a child under a mapped parent. The child may be mapped later.
    pub fn add_child(&mut self, parent: Uid, child: Uid) -> Result<(), StructuralError> {
        let parent_action = self
            .actions
            .get_mut(&parent)
            .ok_or(StructuralError::UnmappedAction(parent))?;
        if parent_action.children.contains(&child) {
            return Ok(());
        }
        parent_action.children.push(child);

        if let Some(child_action) = self.actions.get_mut(&child) {
            child_action.parents.push(parent);
        }
        self.validated = false;
        Ok(())
    }

    /// Label an action and its unlabelled descendants with a category.
    ///
    /// Existing labels are never overwritten, and descent stops at a labelled
    /// node: the nearer label owns that subtree.
    pub fn propagate_category(&mut self, uid: Uid, category: &str) -> Result<(), StructuralError> {
        let action = self
            .actions
            .get_mut(&uid)
            .ok_or(StructuralError::UnmappedAction(uid))?;
        if action.category.is_none() {
            action.category = Some(category.to_string());
        }

        let children = action.children.clone();
        for child in children {
            self.label_descendants(child, category);
        }
        Ok(())
    }

    fn label_descendants(&mut self, uid: Uid, category: &str) {
        let Some(action) = self.actions.get_mut(&uid) else {
            return;
        };
        if action.category.is_some() {
            return;
        }
        action.category = Some(category.to_string());

        let children = action.children.clone();
        for child in children {
            self.label_descendants(child, category);
        }
    }

    /// Find a cycle, returned as the path that closes it (first and last
    /// uid equal).
    ///
    /// Walks from every root, then from any action the roots do not reach.
    pub fn find_cycle(&self) -> Option<Vec<Uid>> {
        let mut clean = HashSet::new();
        let starts = self
            .roots
            .iter()
            .copied()
            .chain(self.actions.keys().copied());

        for start in starts {
            if clean.contains(&start) {
                continue;
            }
            if let Some(cycle) = self.walk_for_cycle(start, Vec::new(), &mut clean) {
                return Some(cycle);
            }
        }
        None
    }

    // Each branch receives its own copy of the path; sharing one buffer
    // across siblings would leave stale uids on it.
    fn walk_for_cycle(&self, uid: Uid, mut path: Vec<Uid>, clean: &mut HashSet<Uid>) -> Option<Vec<Uid>> {
        if path.contains(&uid) {
            path.push(uid);
            return Some(path);
        }
        if clean.contains(&uid) {
            return None;
        }
        path.push(uid);

        if let Some(action) = self.actions.get(&uid) {
            for &child in &action.children {
                if let Some(cycle) = self.walk_for_cycle(child, path.clone(), clean) {
                    return Some(cycle);
                }
            }
        }

        // Nothing below here loops back
        clean.insert(uid);
        None
    }

    /// Check that no action is reachable from itself.
    pub fn is_acyclic(&self) -> bool {
        self.find_cycle().is_none()
    }

    /// Child links pointing at uids that were never mapped.
    pub fn dangling_children(&self) -> Vec<(Uid, Uid)> {
        self.actions
            .values()
            .flat_map(|a| {
                a.children
                    .iter()
                    .filter(|c| !self.actions.contains_key(*c))
                    .map(move |c| (a.uid, *c))
            })
            .collect()
    }

    /// Check load-time integrity and mark the tree traversable.
    pub fn validate(&mut self) -> Result<(), StructuralError> {
        if let Some(&root) = self.roots.iter().find(|r| !self.actions.contains_key(r)) {
            return Err(StructuralError::UnmappedAction(root));
        }
        if let Some(&(parent, child)) = self.dangling_children().first() {
            return Err(StructuralError::DanglingChild { parent, child });
        }
        if let Some(path) = self.find_cycle() {
            return Err(StructuralError::Cycle { path });
        }
        self.validated = true;
        Ok(())
    }

    /// An empty tree is always valid.
    pub fn is_validated(&self) -> bool {
        self.validated || (self.roots.is_empty() && self.actions.is_empty())
    }

    /// Fail unless the tree has been validated since its last structural edit.
    pub fn ensure_validated(&self) -> Result<(), StructuralError> {
        if self.is_validated() {
            Ok(())
        } else {
            Err(StructuralError::NotValidated)
        }
    }

    /// Every root-to-leaf path, ignoring preconditions.
    pub fn all_paths(&self) -> Result<Vec<Vec<Uid>>, StructuralError> {
        self.ensure_validated()?;
        let mut paths = Vec::new();
        for &root in &self.roots {
            self.collect_paths(root, Vec::new(), &mut paths);
        }
        Ok(paths)
    }

    fn collect_paths(&self, uid: Uid, mut path: Vec<Uid>, paths: &mut Vec<Vec<Uid>>) {
        let Some(action) = self.actions.get(&uid) else {
            return;
        };
        path.push(uid);
        if action.is_leaf() {
            paths.push(path);
            return;
        }
        for &child in &action.children {
            self.collect_paths(child, path.clone(), paths);
        }
    }

    /// Remove an action and every edge touching it.
    ///
    /// Children are kept; one left without parents is no longer reachable
    /// unless it is also a root.
    pub fn remove_action(&mut self, uid: Uid) -> Option<Action> {
        let removed = self.actions.remove(&uid)?;
        self.roots.retain(|r| *r != uid);
        for action in self.actions.values_mut() {
            action.children.retain(|c| *c != uid);
            action.parents.retain(|p| *p != uid);
        }
        Some(removed)
    }

    /// Get action by uid.
    pub fn action(&self, uid: Uid) -> Option<&Action> {
        self.actions.get(&uid)
    }

    /// Get mutable action by uid. Edges cannot be changed through it.
    pub fn action_mut(&mut self, uid: Uid) -> Option<&mut Action> {
        self.actions.get_mut(&uid)
    }

    /// Iterate over all actions, ordered by uid.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn actions_mut(&mut self) -> impl Iterator<Item = &mut Action> {
        self.actions.values_mut()
    }

    pub fn roots(&self) -> &[Uid] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ActionTree {
        let mut tree = ActionTree::new();
        tree.map_action("one", 1).unwrap();
        tree.map_action("two", 2).unwrap();
        tree.map_action("three", 3).unwrap();
        tree.add_first(1);
        tree.add_child(1, 2).unwrap();
        tree.add_child(2, 3).unwrap();
        tree
    }

    #[test]
    fn test_chain_is_acyclic() {
        let mut tree = chain();
        assert!(tree.is_acyclic());
        assert!(tree.validate().is_ok());
        assert!(tree.is_validated());
    }

    #[test]
    fn test_back_edge_is_cycle() {
        let mut tree = chain();
        tree.add_child(3, 1).unwrap();

        assert!(!tree.is_acyclic());
        assert_eq!(tree.find_cycle(), Some(vec![1, 2, 3, 1]));
        assert_eq!(
            tree.validate(),
            Err(StructuralError::Cycle { path: vec![1, 2, 3, 1] })
        );
        assert!(!tree.is_validated());
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4: the second visit to 4 must not look like
        // a loop just because 4 was seen on a sibling branch.
        let mut tree = ActionTree::new();
        for uid in 1..=4 {
            tree.map_action(format!("a{}", uid), uid).unwrap();
        }
        tree.add_first(1);
        tree.add_child(1, 2).unwrap();
        tree.add_child(1, 3).unwrap();
        tree.add_child(2, 4).unwrap();
        tree.add_child(3, 4).unwrap();

        assert!(tree.is_acyclic());
        assert_eq!(tree.action(4).unwrap().parents(), &[2, 3]);
        assert!(!tree.action(4).unwrap().is_first());
    }

    #[test]
    fn test_detached_cycle_is_found() {
        let mut tree = chain();
        tree.map_action("x", 10).unwrap();
        tree.map_action("y", 11).unwrap();
        tree.add_child(10, 11).unwrap();
        tree.add_child(11, 10).unwrap();

        assert!(tree.find_cycle().is_some());
    }

    #[test]
    fn test_self_loop() {
        let mut tree = ActionTree::new();
        tree.map_action("again", 7).unwrap();
        tree.add_first(7);
        tree.add_child(7, 7).unwrap();
        assert_eq!(tree.find_cycle(), Some(vec![7, 7]));
    }

    #[test]
    fn test_duplicate_uid_rejected() {
        let mut tree = ActionTree::new();
        tree.map_action("first", 1).unwrap();
        let err = tree.map_action("second", 1).unwrap_err();
        assert_eq!(err, StructuralError::DuplicateUid(1));
        assert_eq!(tree.action(1).unwrap().name, "first");
    }

    #[test]
    fn test_child_linked_before_mapping() {
        let mut tree = ActionTree::new();
        tree.map_action("parent", 1).unwrap();
        tree.add_first(1);
        tree.add_child(1, 2).unwrap();

        assert_eq!(tree.dangling_children(), vec![(1, 2)]);
        assert_eq!(
            tree.validate(),
            Err(StructuralError::DanglingChild { parent: 1, child: 2 })
        );

        tree.map_action("child", 2).unwrap();
        assert_eq!(tree.action(2).unwrap().parents(), &[1]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_unmapped_parent() {
        let mut tree = ActionTree::new();
        assert_eq!(tree.add_child(1, 2), Err(StructuralError::UnmappedAction(1)));
    }

    #[test]
    fn test_empty_tree_is_valid() {
        let mut tree = ActionTree::new();
        assert!(tree.is_validated());
        assert_eq!(tree.all_paths(), Ok(Vec::new()));

        tree.add_first(1);
        assert_eq!(tree.ensure_validated(), Err(StructuralError::NotValidated));
    }

    #[test]
    fn test_edits_invalidate() {
        let mut tree = chain();
        tree.validate().unwrap();
        tree.map_action("four", 4).unwrap();
        assert_eq!(tree.ensure_validated(), Err(StructuralError::NotValidated));
    }

    #[test]
    fn test_propagate_category() {
        let mut tree = chain();
        tree.map_action("four", 4).unwrap();
        tree.add_child(2, 4).unwrap();
        tree.action_mut(4).unwrap().category = Some("threat".to_string());

        tree.propagate_category(1, "greeting").unwrap();

        assert_eq!(tree.action(1).unwrap().category.as_deref(), Some("greeting"));
        assert_eq!(tree.action(2).unwrap().category.as_deref(), Some("greeting"));
        assert_eq!(tree.action(3).unwrap().category.as_deref(), Some("greeting"));
        // Nearer label wins
        assert_eq!(tree.action(4).unwrap().category.as_deref(), Some("threat"));
    }

    #[test]
    fn test_propagate_stops_at_labelled_node() {
        let mut tree = chain();
        tree.action_mut(2).unwrap().category = Some("bribe".to_string());

        tree.propagate_category(1, "greeting").unwrap();
        assert_eq!(tree.action(2).unwrap().category.as_deref(), Some("bribe"));
        assert!(tree.action(3).unwrap().category.is_none());

        tree.propagate_category(2, "bribe").unwrap();
        assert_eq!(tree.action(3).unwrap().category.as_deref(), Some("bribe"));
    }

    #[test]
    fn test_all_paths() {
        let mut tree = chain();
        tree.map_action("four", 4).unwrap();
        tree.map_action("five", 5).unwrap();
        tree.add_child(1, 4).unwrap();
        tree.add_first(5);

        assert_eq!(tree.all_paths(), Err(StructuralError::NotValidated));
        tree.validate().unwrap();
        assert_eq!(tree.all_paths().unwrap(), vec![vec![1, 2, 3], vec![1, 4], vec![5]]);
    }

    #[test]
    fn test_remove_action() {
        let mut tree = chain();
        tree.validate().unwrap();

        let removed = tree.remove_action(2).unwrap();
        assert_eq!(removed.name, "two");
        assert!(tree.action(1).unwrap().is_leaf());
        assert!(tree.action(3).unwrap().is_first());
        assert!(tree.validate().is_ok());
        assert_eq!(tree.all_paths().unwrap(), vec![vec![1]]);

        assert!(tree.remove_action(2).is_none());
    }

    #[test]
    fn test_is_empty() {
        let mut tree = ActionTree::new();
        assert!(tree.is_empty());
        tree.map_action("one", 1).unwrap();
        assert!(!tree.is_empty());
        assert_eq!(tree.len(), 1);
    }
}
