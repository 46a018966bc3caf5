//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for one story instance.
///
/// Every field has a default, so a TOML file only needs the ones it changes:
///
/// ```toml
/// conversation_type = 0.8
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Target salience from 0.0 (low) to 1.0 (high); 0.5 is balanced.
    pub conversation_type: f32,

    /// Boost added per interaction step when memories are aggregated.
    pub recency_weight: f32,

    /// Number of options returned when the caller does not ask for a count.
    pub default_max_options: usize,

    /// Seed for tie breaking between equally scored options. `None` seeds
    /// from entropy.
    pub seed: Option<u64>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            conversation_type: 0.5,
            recency_weight: 0.1,
            default_max_options: 3,
            seed: None,
        }
    }
}

impl StoryConfig {
    /// Parse and validate a configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_conversation_type(mut self, conversation_type: f32) -> Self {
        self.conversation_type = conversation_type;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that every field is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.conversation_type) {
            return Err(ConfigError::ConversationType(self.conversation_type));
        }
        if self.recency_weight.is_nan() || self.recency_weight < 0.0 {
            return Err(ConfigError::RecencyWeight(self.recency_weight));
        }
        Ok(())
    }
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse story config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("conversation_type must lie in [0, 1], found {0}")]
    ConversationType(f32),
    #[error("recency_weight must be non-negative, found {0}")]
    RecencyWeight(f32),
}
