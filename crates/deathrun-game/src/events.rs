use serde::{Deserialize, Serialize};

use deathrun_core::geometry::Vec3;
use deathrun_core::player::PlayerId;

use crate::death::DeathCause;
use crate::participant::{Team, TeamRequest};
use crate::ranking::{FinishRecord, OrdinalLabel};

/// Presentation cues raised by the round and the lobby. The host drains
/// them after every tick or interaction and decides how to show them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TeamRequested {
        player_id: PlayerId,
        request: TeamRequest,
    },
    RoundStarted {
        runners: Vec<PlayerId>,
        deaths: Vec<PlayerId>,
    },
    Countdown {
        seconds: u32,
        final_stretch: bool,
    },
    Go,
    GateOpened {
        removed: usize,
    },
    TrapTriggered {
        zone: usize,
        by: PlayerId,
    },
    TrapReset {
        zone: usize,
    },
    /// A death condition sent a runner back to the start.
    RunnerEliminated {
        player_id: PlayerId,
        cause: DeathCause,
    },
    /// The host reported a death; the player was healed and respawned.
    Died {
        player_id: PlayerId,
        team: Team,
    },
    CheckpointReached {
        player_id: PlayerId,
        checkpoint: usize,
    },
    Boosted {
        player_id: PlayerId,
        velocity: Vec3,
    },
    Finished {
        player_id: PlayerId,
        place: usize,
        elapsed_ticks: u32,
        /// `m:ss` of the run.
        time: String,
        label: OrdinalLabel,
        color: u32,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    RoundComplete {
        results: Vec<FinishRecord>,
    },
}

/// Answer to a block or item interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseResult {
    /// Consumed by the round.
    Success,
    /// Not ours; let the host handle it.
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDecision {
    Accept,
    Reject(&'static str),
}

/// Whether the host should apply damage or a death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmDecision {
    Allow,
    Deny,
}
