//! Agent configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::Tick;

/// Configuration for the decision agent
///
/// Defaults match the game rules published by the server; changing them
/// against a live server will desynchronize the local view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // === DECISION ENGINE ===
    /// Radius (in tiles) of the nearby-entity query used when a unit
    /// falls through the expansion scan and looks for a rival marker
    /// to advance toward. Comparisons use the squared distance, so the
    /// value itself stays small.
    pub interaction_range: i32,

    // === MAP GEOMETRY ===
    /// Side length of a sector in tiles
    ///
    /// Tiles bucket into axis-aligned squares of this size; control is
    /// tracked per sector, not per tile.
    pub sector_size: i32,

    // === ACTION COOLDOWNS ===
    /// Ticks a unit is locked out after a successful build
    pub build_cooldown: Tick,

    /// Ticks a unit is locked out after a move
    ///
    /// Much shorter than the build cooldown so units keep advancing
    /// between expansion opportunities.
    pub move_cooldown: Tick,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interaction_range: 7,
            sector_size: 2,
            build_cooldown: 10,
            move_cooldown: 1,
        }
    }
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.interaction_range <= 0 {
            return Err(format!(
                "interaction_range ({}) must be positive",
                self.interaction_range
            ));
        }

        if self.sector_size <= 0 {
            return Err(format!(
                "sector_size ({}) must be positive",
                self.sector_size
            ));
        }

        // Cooldowns are ordered: building is the slow, committal action
        if self.build_cooldown < self.move_cooldown {
            return Err(format!(
                "build_cooldown ({}) should be >= move_cooldown ({})",
                self.build_cooldown, self.move_cooldown
            ));
        }

        Ok(())
    }
}
