use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use deathrun_core::player::PlayerId;

use crate::config::DeathRunConfig;
use crate::participant::{TeamRequest, WaitingParticipant};

/// Result of sorting the lobby into teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamAssignment {
    pub runners: Vec<PlayerId>,
    pub deaths: Vec<PlayerId>,
}

impl TeamAssignment {
    pub fn len(&self) -> usize {
        self.runners.len() + self.deaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty() && self.deaths.is_empty()
    }
}

/// Split waiting players into runners and deaths.
///
/// The lobby is shuffled with `rng`, then walked twice. The first pass
/// honors explicit requests: death requests while slots remain, runner
/// requests always. The second pass places everyone left over (no request,
/// or a death request that lost the race for a slot) into the remaining
/// death slots first and overflows the rest to runners.
pub fn assign_teams<R: Rng + ?Sized>(
    waiting: &[WaitingParticipant],
    config: &DeathRunConfig,
    rng: &mut R,
) -> TeamAssignment {
    let mut shuffled: Vec<&WaitingParticipant> = waiting.iter().collect();
    shuffled.shuffle(rng);

    let max_deaths = config.death_capacity(shuffled.len());
    let mut teams = TeamAssignment::default();
    let mut placed: HashSet<PlayerId> = HashSet::with_capacity(shuffled.len());

    for player in &shuffled {
        match player.requested {
            TeamRequest::Deaths if teams.deaths.len() < max_deaths => {
                teams.deaths.push(player.id);
                placed.insert(player.id);
            },
            TeamRequest::Runners => {
                teams.runners.push(player.id);
                placed.insert(player.id);
            },
            _ => {},
        }
    }

    for player in &shuffled {
        if placed.contains(&player.id) {
            continue;
        }
        if teams.deaths.len() < max_deaths {
            teams.deaths.push(player.id);
        } else {
            teams.runners.push(player.id);
        }
        placed.insert(player.id);
    }

    teams
}
