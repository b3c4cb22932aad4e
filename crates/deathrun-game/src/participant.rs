use serde::{Deserialize, Serialize};

use deathrun_core::player::PlayerId;
use deathrun_core::world::Item;

/// The two sides of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Runners,
    Deaths,
}

impl Team {
    /// Items handed out at round start and on every respawn, by slot.
    pub fn loadout(self) -> &'static [(u8, Item)] {
        match self {
            Team::Runners => &[(0, Item::BoostFeather)],
            Team::Deaths => &[],
        }
    }
}

/// Team preference chosen while waiting in the lobby.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRequest {
    Runners,
    Deaths,
    #[default]
    None,
}

/// Role tag used to dispatch per-tick behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Waiting,
    Runner,
    Death,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingParticipant {
    pub id: PlayerId,
    pub requested: TeamRequest,
}

impl WaitingParticipant {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            requested: TeamRequest::None,
        }
    }
}

/// Per-round state of an assigned player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveParticipant {
    pub id: PlayerId,
    pub team: Team,
    pub started: bool,
    pub finished: bool,
    pub elapsed_ticks: u32,
    /// Index into the map's checkpoint list.
    pub checkpoint: Option<usize>,
    pub boost_cooldown: u32,
}

impl ActiveParticipant {
    pub fn new(id: PlayerId, team: Team) -> Self {
        Self {
            id,
            team,
            started: false,
            finished: false,
            elapsed_ticks: 0,
            checkpoint: None,
            boost_cooldown: 0,
        }
    }

    /// A runner still on the course after the gate opened.
    pub fn is_racing(&self) -> bool {
        self.team == Team::Runners && self.started && !self.finished
    }

    /// Per-tick counters. The race clock only runs between start and finish.
    pub fn advance_timers(&mut self) {
        if self.started && !self.finished {
            self.elapsed_ticks += 1;
        }
        self.boost_cooldown = self.boost_cooldown.saturating_sub(1);
    }
}

/// A registry entry: either still waiting or assigned to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    Waiting(WaitingParticipant),
    Active(ActiveParticipant),
}

impl Participant {
    pub fn id(&self) -> PlayerId {
        match self {
            Participant::Waiting(p) => p.id,
            Participant::Active(p) => p.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Participant::Waiting(_) => Role::Waiting,
            Participant::Active(p) => match p.team {
                Team::Runners => Role::Runner,
                Team::Deaths => Role::Death,
            },
        }
    }

    pub fn as_active(&self) -> Option<&ActiveParticipant> {
        match self {
            Participant::Active(p) => Some(p),
            Participant::Waiting(_) => None,
        }
    }

    pub fn as_active_mut(&mut self) -> Option<&mut ActiveParticipant> {
        match self {
            Participant::Active(p) => Some(p),
            Participant::Waiting(_) => None,
        }
    }

    pub fn as_waiting(&self) -> Option<&WaitingParticipant> {
        match self {
            Participant::Waiting(p) => Some(p),
            Participant::Active(_) => None,
        }
    }

    pub fn as_waiting_mut(&mut self) -> Option<&mut WaitingParticipant> {
        match self {
            Participant::Waiting(p) => Some(p),
            Participant::Active(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_ticks_only_run_between_start_and_finish() {
        let mut runner = ActiveParticipant::new(1, Team::Runners);
        runner.advance_timers();
        assert_eq!(runner.elapsed_ticks, 0);

        runner.started = true;
        runner.advance_timers();
        runner.advance_timers();
        assert_eq!(runner.elapsed_ticks, 2);

        runner.finished = true;
        runner.advance_timers();
        assert_eq!(runner.elapsed_ticks, 2);
    }

    #[test]
    fn roles_follow_team() {
        let waiting = Participant::Waiting(WaitingParticipant::new(1));
        let runner = Participant::Active(ActiveParticipant::new(2, Team::Runners));
        let death = Participant::Active(ActiveParticipant::new(3, Team::Deaths));
        assert_eq!(waiting.role(), Role::Waiting);
        assert_eq!(runner.role(), Role::Runner);
        assert_eq!(death.role(), Role::Death);
        assert!(waiting.as_active().is_none());
        assert_eq!(death.id(), 3);
    }

    #[test]
    fn only_runners_carry_a_loadout() {
        assert_eq!(Team::Runners.loadout(), &[(0, Item::BoostFeather)]);
        assert!(Team::Deaths.loadout().is_empty());
    }
}
