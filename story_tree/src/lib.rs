//! # StoryTree
//!
//! Branching dialogue and action engine for interactive narrative. Builds on
//! `story_db` for typed attributes and conditions, and adds the parts that
//! decide what a character can do next.
//!
//! ## Core Components
//!
//! - **action_tree**: Per-character DAG of conditional actions
//! - **memory**: Recency-weighted record of what executed paths changed
//! - **options**: Path discovery, salience scoring and selection
//! - **story**: The `StoryTree` orchestrator owning registry, characters and config
//! - **definition**: Loader input in the story file format
//!
//! ## Design Philosophy
//!
//! - **Query/Command split**: Finding options never mutates state; only `execute` does
//! - **Validated Structure**: Trees are checked once after loading, then trusted
//! - **Self-contained**: Every `StoryTree` owns its state; instances coexist freely

pub use story_db;

pub mod action_tree;
pub mod character;
pub mod config;
pub mod definition;
pub mod error;
pub mod memory;
pub mod options;
pub mod story;

pub use action_tree::*;
pub use character::*;
pub use config::*;
pub use definition::*;
pub use error::*;
pub use memory::*;
pub use options::*;
pub use story::*;
