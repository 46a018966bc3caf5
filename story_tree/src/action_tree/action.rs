//! Action definitions - nodes in a character's action tree.

use serde::{Deserialize, Serialize};
use story_db::{Expression, Precondition};

use super::Uid;

/// An available narrative choice, gated by preconditions, with effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub uid: Uid,

    /// Display name; can be anything.
    pub name: String,

    /// All must hold for the action to be offered.
    pub preconditions: Vec<Precondition>,

    /// Applied in order when the action executes.
    pub expressions: Vec<Expression>,

    /// Groups mutually exclusive paths; at most one path per label is offered.
    pub category: Option<String>,

    // Edges are owned by the tree so parent/child stay in sync.
    pub(super) children: Vec<Uid>,
    pub(super) parents: Vec<Uid>,
}

impl Action {
    /// Create a new action with no conditions or edges.
    pub fn new(uid: Uid, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            preconditions: Vec::new(),
            expressions: Vec::new(),
            category: None,
            children: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Add a precondition.
    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    /// Add an expression.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Set the category label. Empty labels count as no label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.is_empty()).then_some(category);
        self
    }

    /// Child uids, in author order.
    pub fn children(&self) -> &[Uid] {
        &self.children
    }

    /// Parent uids; more than one at merge points.
    pub fn parents(&self) -> &[Uid] {
        &self.parents
    }

    /// No parents.
    pub fn is_first(&self) -> bool {
        self.parents.is_empty()
    }

    /// No children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
