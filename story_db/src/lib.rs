//! # Story Database
//!
//! The typed attribute layer of StoryTree. This crate is the single source of
//! truth for what an author may reference: attribute categories and their
//! subtypes, per-character characteristics, and the preconditions and
//! expressions that read and write them. It knows nothing about action trees
//! or option ranking.

pub mod attributes;
pub mod conditions;
pub mod error;
pub mod id;
pub mod registry;

pub use attributes::*;
pub use conditions::*;
pub use error::*;
pub use id::*;
pub use registry::*;
