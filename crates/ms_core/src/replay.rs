//! Persisted record of externally injected events.
//!
//! A match is deterministic given its seed, field, rosters and tactics; the
//! only free inputs are the external events. Each one is recorded with the
//! `(tick, seq)` the scheduler assigned it, so feeding the same log back
//! into a fresh match with the same setup reproduces the run bit for bit.

use serde::{Deserialize, Serialize};

use crate::engine::events::ExternalEvent;
use crate::error::Result;

/// One recorded external event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub tick: u32,
    pub seq: u64,
    pub data: ExternalEvent,
}

/// Append-only log of a match's external inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    records: Vec<ExternalRecord>,
}

impl ReplayLog {
    pub fn push(&mut self, tick: u32, seq: u64, data: ExternalEvent) {
        self.records.push(ExternalRecord { tick, seq, data });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ExternalRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalRecord> {
        self.records.iter()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
