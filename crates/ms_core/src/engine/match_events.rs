//! Match event log.
//!
//! The narrative record of a match: kickoff, goals, possession changes,
//! substitutions, full time. Distinct from the replay log — replay records
//! *inputs* so a run can be reproduced; this records *outcomes* so a
//! consumer (commentary, statistics, a highlights cutter) can read what
//! happened without re-simulating.

use serde::{Deserialize, Serialize};

use super::scheduler::Tick;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEventKind {
    Kickoff,
    Goal {
        team_id: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        scorer_id: Option<u32>,
    },
    PossessionWon {
        team_id: u32,
        player_id: u32,
    },
    Shot {
        player_id: u32,
    },
    Substitution {
        player_out_id: u32,
        player_in_id: u32,
    },
    FullTime,
}

/// One logged event with its simulated timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub tick: Tick,
    #[serde(flatten)]
    pub kind: MatchEventKind,
}

/// Append-only match event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchEventLog {
    events: Vec<MatchEvent>,
}

impl MatchEventLog {
    pub fn push(&mut self, tick: Tick, kind: MatchEventKind) {
        self.events.push(MatchEvent { tick, kind });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter()
    }

    /// Goals only, in order.
    pub fn goals(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, MatchEventKind::Goal { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_accumulates_in_order() {
        let mut log = MatchEventLog::default();
        log.push(0, MatchEventKind::Kickoff);
        log.push(1200, MatchEventKind::PossessionWon { team_id: 0, player_id: 7 });
        log.push(90_000, MatchEventKind::Goal { team_id: 0, scorer_id: Some(7) });
        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[2].tick, 90_000);
        assert_eq!(log.goals().count(), 1);
    }

    #[test]
    fn test_event_json_shape() {
        let event = MatchEvent {
            tick: 500,
            kind: MatchEventKind::Goal { team_id: 1, scorer_id: None },
        };
        let json = serde_json::to_string(&event).unwrap();
        // Flattened tag rides next to the tick
        assert!(json.contains("\"tick\":500"));
        assert!(json.contains("\"kind\":\"goal\""));
        assert!(!json.contains("scorer_id"));
        let back: MatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_log_round_trip() {
        let mut log = MatchEventLog::default();
        log.push(0, MatchEventKind::Kickoff);
        log.push(100, MatchEventKind::Shot { player_id: 3 });
        log.push(5000, MatchEventKind::FullTime);
        let json = serde_json::to_string(&log).unwrap();
        let back: MatchEventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, back);
    }
}
