use serde::{Deserialize, Serialize};

use crate::participant::ActiveParticipant;
use crate::ranking::FinishRecord;
use crate::traps::TrapPhase;

/// Serializable view of a round for host broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub tick: u64,
    pub countdown_ticks: u32,
    pub started: bool,
    pub round_complete: bool,
    pub participants: Vec<ActiveParticipant>,
    pub finishes: Vec<FinishRecord>,
    pub trap_phases: Vec<TrapPhase>,
    pub pending_resets: usize,
}

#[derive(Debug)]
pub enum SnapshotError {
    Encode(String),
    Decode(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "snapshot encode error: {e}"),
            Self::Decode(e) => write!(f, "snapshot decode error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl RoundSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        rmp_serde::to_vec(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        rmp_serde::from_slice(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let snapshot = RoundSnapshot {
            tick: 12,
            countdown_ticks: 188,
            started: false,
            round_complete: false,
            participants: Vec::new(),
            finishes: Vec::new(),
            trap_phases: vec![TrapPhase::Armed],
            pending_resets: 0,
        };
        let bytes = snapshot.encode().unwrap();
        let err = RoundSnapshot::decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }
}
