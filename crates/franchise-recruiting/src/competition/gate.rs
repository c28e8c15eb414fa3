use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::CompetitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleState {
    Open,
    Locked,
}

/// Open/locked flag owned by the weekly resolution job. The engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleGate {
    state: CycleState,
    week: u32,
    changed_at: Option<DateTime<Utc>>,
}

impl Default for CycleGate {
    fn default() -> Self {
        Self {
            state: CycleState::Open,
            week: 0,
            changed_at: None,
        }
    }
}

impl CycleGate {
    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed_at
    }

    pub fn is_locked(&self) -> bool {
        self.state == CycleState::Locked
    }

    pub fn ensure_open(&self) -> Result<(), CompetitionError> {
        if self.is_locked() {
            Err(CompetitionError::CycleLocked)
        } else {
            Ok(())
        }
    }

    /// Record the state published by the sync job. Returns whether the state flipped.
    pub fn apply(&mut self, state: CycleState, week: u32, at: DateTime<Utc>) -> bool {
        let flipped = self.state != state;
        self.state = state;
        self.week = week;
        if flipped {
            self.changed_at = Some(at);
        }
        flipped
    }
}
