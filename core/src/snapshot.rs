//! Persistable summary of the player's progress.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Player state written between sessions.
///
/// Weapons are stored by name and rebuilt from the catalog on load, keeping
/// the saved document small and readable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Money available to spend.
    pub money: u32,
    /// Current health, absent when the save should keep the default.
    #[serde(default)]
    pub health: Option<u32>,
    /// Inventory slot of the equipped weapon.
    #[serde(default)]
    pub equipped_index: usize,
    /// Owned weapon names in inventory order.
    #[serde(default)]
    pub inventory: Vec<String>,
    /// Upgrade level per weapon name.
    #[serde(default)]
    pub weapon_levels: BTreeMap<String, u32>,
}

/// Reasons a snapshot cannot be applied to a player.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// The equipped slot does not exist in the inventory.
    #[error("equipped slot {index} is outside an inventory of {len} weapons")]
    EquippedOutOfRange {
        /// Stored slot.
        index: usize,
        /// Stored inventory length.
        len: usize,
    },
    /// Stored health would restore a player who is already dead.
    #[error("saved player has no health left")]
    NoHealthLeft,
    /// Stored health is above the player's maximum.
    #[error("health {health} exceeds the maximum of {max}")]
    HealthAboveMaximum {
        /// Stored health.
        health: u32,
        /// Maximum the player may have.
        max: u32,
    },
}

impl PlayerSnapshot {
    /// Checks the snapshot for internally inconsistent values.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self, max_health: u32) -> Result<(), SnapshotError> {
        if !self.inventory.is_empty() && self.equipped_index >= self.inventory.len() {
            return Err(SnapshotError::EquippedOutOfRange {
                index: self.equipped_index,
                len: self.inventory.len(),
            });
        }
        if let Some(health) = self.health {
            if health == 0 {
                return Err(SnapshotError::NoHealthLeft);
            }
            if health > max_health {
                return Err(SnapshotError::HealthAboveMaximum {
                    health,
                    max: max_health,
                });
            }
        }
        Ok(())
    }
}
