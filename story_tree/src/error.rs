//! Error types for the story engine.

use story_db::{ConfigurationError, ValidationError};
use thiserror::Error;

use crate::action_tree::Uid;
use crate::config::ConfigError;

/// Problems with the shape of an action tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("An action with uid {0} has already been mapped")]
    DuplicateUid(Uid),
    #[error("Action {0} has not been mapped")]
    UnmappedAction(Uid),
    #[error("Action {parent} leads to uid {child}, which was never mapped")]
    DanglingChild { parent: Uid, child: Uid },
    #[error("Cycle detected along path {path:?}")]
    Cycle { path: Vec<Uid> },
    #[error("The action tree must be validated before it is traversed")]
    NotValidated,
}

/// Something asked for at query time does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupMiss {
    #[error("There's no character named '{0}'")]
    UnknownCharacter(String),
    #[error("There's no action with uid {uid} for '{character}'")]
    UnknownAction { character: String, uid: Uid },
    #[error("There's no category called '{0}'")]
    UnknownCategory(String),
    #[error("There's no subtype '{subtype}' in category '{category}'")]
    UnknownSubtype { category: String, subtype: String },
}

/// The four kinds of failure the engine distinguishes, plus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Structural,
    LookupMiss,
    Config,
}

/// Every error the engine can return.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid action tree for '{character}': {source}")]
    Structural {
        character: String,
        #[source]
        source: StructuralError,
    },
    #[error(transparent)]
    Lookup(#[from] LookupMiss),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to parse story definition: {0}")]
    Definition(#[from] serde_json::Error),
}

impl StoryError {
    pub(crate) fn structural(character: impl Into<String>, source: StructuralError) -> Self {
        StoryError::Structural {
            character: character.into(),
            source,
        }
    }

    /// Which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoryError::Configuration(_) => ErrorKind::Configuration,
            StoryError::Validation(_) | StoryError::Definition(_) => ErrorKind::Validation,
            StoryError::Structural { .. } => ErrorKind::Structural,
            StoryError::Lookup(_) => ErrorKind::LookupMiss,
            StoryError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T, E = StoryError> = std::result::Result<T, E>;
