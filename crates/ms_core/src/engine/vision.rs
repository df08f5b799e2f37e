//! Player vision: the perceived-world snapshot and the scan cadence.
//!
//! Each player carries a private copy of where everyone (and the ball)
//! appeared at the last scan. Perception is currently ground truth — the
//! seam exists so noise, memory and decay can slot in without touching the
//! consumers. Scan cadence derives from the player's perception attributes:
//! an elite scanner refreshes every 300 ms, a poor one every 1.5 s.

use serde::{Deserialize, Serialize};

use super::geometry::{lerp, Vec2};
use super::physics_constants::scan as consts;
use super::rng::SimRng;
use super::squad::{from_100, PlayerAttributes};

/// What the scanning player knows about one other player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceivedPlayer {
    pub player_index: u32,
    pub team_id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// What the scanning player knows about the ball.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerceivedBall {
    pub position: Vec2,
    pub velocity: Vec2,
    pub height: f32,
}

/// Current attention target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    #[default]
    Ball,
    Player(u32),
}

/// Per-player perceived world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerVision {
    pub players: Vec<PerceivedPlayer>,
    pub ball: PerceivedBall,
    pub focus: FocusTarget,
    pub scan_frequency_ms: u32,
}

/// Scan interval from the perception attributes, with the awareness variant
/// picked by possession.
pub fn scan_frequency_ms(attrs: &PlayerAttributes, in_possession: bool) -> u32 {
    let score = consts::W_AWARENESS * from_100(attrs.awareness(in_possession))
        + consts::W_ANTICIPATION * from_100(attrs.anticipation)
        + consts::W_VISION * from_100(attrs.vision);
    lerp(consts::SLOWEST_MS, consts::FASTEST_MS, score) as u32
}

impl PlayerVision {
    pub fn new(attrs: &PlayerAttributes) -> Self {
        Self {
            players: Vec::new(),
            ball: PerceivedBall::default(),
            focus: FocusTarget::Ball,
            scan_frequency_ms: scan_frequency_ms(attrs, false),
        }
    }

    /// Refresh the snapshot and pick a new focus. The existing player
    /// buffer is reused; a scan allocates only on roster growth.
    pub fn scan<I>(&mut self, others: I, ball: PerceivedBall, rng: &mut SimRng)
    where
        I: IntoIterator<Item = PerceivedPlayer>,
    {
        self.players.clear();
        self.players.extend(others);
        self.ball = ball;
        self.focus = if self.players.is_empty() || rng.chance(consts::BALL_FOCUS_CHANCE) {
            FocusTarget::Ball
        } else {
            let pick = rng.pick_index(self.players.len());
            FocusTarget::Player(self.players[pick].player_index)
        };
    }

    /// Where the current focus was last seen.
    pub fn focus_position(&self) -> Vec2 {
        match self.focus {
            FocusTarget::Ball => self.ball.position,
            FocusTarget::Player(index) => self
                .players
                .iter()
                .find(|p| p.player_index == index)
                .map(|p| p.position)
                .unwrap_or(self.ball.position),
        }
    }

    /// Last-seen positions of everyone except the given player, for the
    /// collision-avoidance modifier.
    pub fn neighbor_positions_into(&self, buf: &mut Vec<Vec2>) {
        buf.clear();
        buf.extend(self.players.iter().map(|p| p.position));
    }
}
