//! High-level match phase and score state.
//!
//! The play state gates AI dispatch: setup states park players on their
//! formation slots, kick states hand the ball to a taker, ceremonies idle
//! everyone. The clock is driven by the scheduler's per-tick hook; one tick
//! is one millisecond of simulated time.

use serde::{Deserialize, Serialize};

use super::scheduler::Tick;

/// The phase the match is in. Closed set; the engine only transitions
/// between a few of these itself (kickoff, full time, goals) and external
/// tooling drives the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    PreMatch,
    KickoffSetup,
    Kickoff,
    NormalPlay,
    ThrowInSetup,
    ThrowIn,
    GoalKickSetup,
    GoalKick,
    CornerSetup,
    Corner,
    FreeKickSetup,
    FreeKick,
    PenaltySetup,
    Penalty,
    Stoppage,
    GoalCelebration,
    FullTime,
}

impl PlayState {
    /// Players move to their positions, ball is dead.
    pub fn is_setup(self) -> bool {
        matches!(
            self,
            PlayState::KickoffSetup
                | PlayState::ThrowInSetup
                | PlayState::GoalKickSetup
                | PlayState::CornerSetup
                | PlayState::FreeKickSetup
                | PlayState::PenaltySetup
        )
    }

    /// A restart is about to be taken.
    pub fn is_kick(self) -> bool {
        matches!(
            self,
            PlayState::Kickoff
                | PlayState::ThrowIn
                | PlayState::GoalKick
                | PlayState::Corner
                | PlayState::FreeKick
                | PlayState::Penalty
        )
    }

    /// Nobody plays football in these.
    pub fn is_ceremony(self) -> bool {
        matches!(
            self,
            PlayState::PreMatch | PlayState::Stoppage | PlayState::GoalCelebration | PlayState::FullTime
        )
    }

    pub fn is_open_play(self) -> bool {
        self == PlayState::NormalPlay
    }
}

/// Mutable match-level state shared by every subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub play_state: PlayState,
    pub time_elapsed_ms: Tick,
    pub home_score: u8,
    pub away_score: u8,
    /// Team id of the side in possession, if anyone is.
    pub possession: Option<u32>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            play_state: PlayState::KickoffSetup,
            time_elapsed_ms: 0,
            home_score: 0,
            away_score: 0,
            possession: None,
        }
    }
}
