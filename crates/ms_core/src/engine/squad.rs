//! Rosters, attributes and formation slots.
//!
//! Attributes use the 0-100 scale and normalize to `[0, 1]` where formulas
//! need them. A `TeamSheet` is immutable for the lifetime of a match: the
//! eleven starting slots, each tying a player to a normalized formation
//! position.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

use super::field::Side;

/// Normalize a 0-100 attribute to `[0, 1]`.
#[inline]
pub fn from_100(value: u8) -> f32 {
    (f32::from(value) / 100.0).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionRole {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

/// The attribute subset the simulation core consumes. 0-100 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub pace: u8,
    pub acceleration: u8,
    pub stamina: u8,
    /// Scanning quality in possession.
    pub attacking_awareness: u8,
    /// Scanning quality out of possession.
    pub defensive_awareness: u8,
    pub anticipation: u8,
    pub vision: u8,
    pub positioning: u8,
}

impl PlayerAttributes {
    /// The awareness variant that applies given possession.
    #[inline]
    pub fn awareness(&self, in_possession: bool) -> u8 {
        if in_possession {
            self.attacking_awareness
        } else {
            self.defensive_awareness
        }
    }

    /// Flat 50s across the board.
    pub fn average() -> Self {
        Self {
            pace: 50,
            acceleration: 50,
            stamina: 50,
            attacking_awareness: 50,
            defensive_awareness: 50,
            anticipation: 50,
            vision: 50,
            positioning: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: u32,
    pub name: String,
    pub shirt_number: u8,
    pub role: PositionRole,
    pub attributes: PlayerAttributes,
}

/// A starting slot: which player, and where in the formation region.
/// Slot coordinates are normalized `[-1, 1]` (left to right, back to front).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationSlot {
    pub player_id: u32,
    pub sx: f32,
    pub sy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub id: u32,
    pub name: String,
    pub defending_side: Side,
    pub players: Vec<PlayerProfile>,
    pub lineup: Vec<FormationSlot>,
}

impl TeamSheet {
    pub fn player(&self, id: u32) -> Option<&PlayerProfile> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Starting-lineup sanity: eleven slots, every slot resolvable, exactly
    /// one goalkeeper among them, no player fielded twice.
    pub fn validate(&self) -> Result<()> {
        if self.lineup.len() != 11 {
            return Err(EngineError::InvalidConfig(format!(
                "team {} fields {} players",
                self.name,
                self.lineup.len()
            )));
        }
        let mut keepers = 0;
        let mut seen = Vec::with_capacity(11);
        for slot in &self.lineup {
            if seen.contains(&slot.player_id) {
                return Err(EngineError::InvalidConfig(format!(
                    "player {} fielded twice",
                    slot.player_id
                )));
            }
            seen.push(slot.player_id);
            let profile = self
                .player(slot.player_id)
                .ok_or(EngineError::UnknownPlayer(slot.player_id))?;
            if profile.role == PositionRole::Goalkeeper {
                keepers += 1;
            }
            if !(-1.0..=1.0).contains(&slot.sx) || !(-1.0..=1.0).contains(&slot.sy) {
                return Err(EngineError::InvalidConfig(format!(
                    "slot for player {} outside the formation region",
                    slot.player_id
                )));
            }
        }
        if keepers != 1 {
            return Err(EngineError::InvalidConfig(format!(
                "team {} fields {keepers} goalkeepers",
                self.name
            )));
        }
        Ok(())
    }

    /// A deterministic 4-4-2 demonstration squad. Attribute spreads derive
    /// from the player index arithmetically so two calls with the same base
    /// id produce identical sheets.
    pub fn demo(team_id: u32, name: &str, defending_side: Side, base_player_id: u32) -> Self {
        let slots_442: [(f32, f32, PositionRole); 11] = [
            (0.0, -1.0, PositionRole::Goalkeeper),
            (-0.75, -0.55, PositionRole::Defender),
            (-0.25, -0.6, PositionRole::Defender),
            (0.25, -0.6, PositionRole::Defender),
            (0.75, -0.55, PositionRole::Defender),
            (-0.75, 0.1, PositionRole::Midfielder),
            (-0.25, 0.0, PositionRole::Midfielder),
            (0.25, 0.0, PositionRole::Midfielder),
            (0.75, 0.1, PositionRole::Midfielder),
            (-0.3, 0.8, PositionRole::Forward),
            (0.3, 0.8, PositionRole::Forward),
        ];
        let mut players = Vec::with_capacity(11);
        let mut lineup = Vec::with_capacity(11);
        for (i, &(sx, sy, role)) in slots_442.iter().enumerate() {
            let idx = i as u32;
            let id = base_player_id + idx;
            let spread = |offset: u32| 45 + ((idx * 7 + offset * 13) % 30) as u8;
            players.push(PlayerProfile {
                id,
                name: format!("{name} #{}", idx + 1),
                shirt_number: (idx + 1) as u8,
                role,
                attributes: PlayerAttributes {
                    pace: spread(0),
                    acceleration: spread(1),
                    stamina: spread(2),
                    attacking_awareness: spread(3),
                    defensive_awareness: spread(4),
                    anticipation: spread(5),
                    vision: spread(6),
                    positioning: spread(7),
                },
            });
            lineup.push(FormationSlot { player_id: id, sx, sy });
        }
        Self { id: team_id, name: name.to_string(), defending_side, players, lineup }
    }
}
