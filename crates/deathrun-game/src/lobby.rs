use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use deathrun_core::player::PlayerId;
use deathrun_core::world::{Item, World};

use crate::DeathRunGame;
use crate::config::DeathRunConfig;
use crate::events::{GameEvent, HarmDecision, JoinDecision, UseResult};
use crate::map::DeathRunMap;
use crate::participant::{Participant, TeamRequest, WaitingParticipant};
use crate::registry::Registry;
use crate::teams::assign_teams;

const WAITING_LOADOUT: &[(u8, Item)] = &[
    (3, Item::RequestRunner),
    (4, Item::RequestClear),
    (5, Item::RequestDeath),
    (8, Item::LeaveGame),
];

const RUNNERS_ONLY_LOADOUT: &[(u8, Item)] = &[(4, Item::RunnersOnlyBadge), (8, Item::LeaveGame)];

/// Pre-round waiting room. Collects players and their team requests until
/// the host calls [`Lobby::start`].
pub struct Lobby {
    map: DeathRunMap,
    config: DeathRunConfig,
    players: Registry,
    rng: StdRng,
    outbox: Vec<GameEvent>,
}

impl Lobby {
    pub fn new(map: DeathRunMap, config: DeathRunConfig, rng: StdRng) -> Self {
        Self {
            map,
            config,
            players: Registry::new(),
            rng,
            outbox: Vec::new(),
        }
    }

    /// Items a waiting player holds, by slot.
    pub fn waiting_loadout(&self) -> &'static [(u8, Item)] {
        if self.config.runners_only {
            RUNNERS_ONLY_LOADOUT
        } else {
            WAITING_LOADOUT
        }
    }

    pub fn on_join(&mut self, player: PlayerId, world: &mut dyn World) -> JoinDecision {
        if !self.players.contains(player) {
            self.players
                .add(Participant::Waiting(WaitingParticipant::new(player)));
            debug!(player_id = player, waiting = self.players.len(), "player joined lobby");
        }
        self.reset_waiting(player, world);
        JoinDecision::Accept
    }

    /// Put a waiting player back on the spawn floor with the lobby items.
    pub fn reset_waiting(&mut self, player: PlayerId, world: &mut dyn World) {
        let at = self.map.spawn.random_column(&mut self.rng);
        world.teleport(player, at);
        world.clear_inventory(player);
        for &(slot, item) in self.waiting_loadout() {
            world.give_item(player, slot, item);
        }
    }

    /// Record a team preference. Ignored in runners-only mode and for
    /// players not in the lobby.
    pub fn request_team(&mut self, player: PlayerId, request: TeamRequest) -> bool {
        if self.config.runners_only {
            return false;
        }
        let Some(waiting) = self.players.get_mut(player).and_then(Participant::as_waiting_mut) else {
            return false;
        };
        waiting.requested = request;
        self.outbox.push(GameEvent::TeamRequested {
            player_id: player,
            request,
        });
        true
    }

    pub fn on_use_item(&mut self, player: PlayerId, item: Item) -> UseResult {
        let handled = match item {
            Item::RequestRunner => self.request_team(player, TeamRequest::Runners),
            Item::RequestDeath => self.request_team(player, TeamRequest::Deaths),
            Item::RequestClear => self.request_team(player, TeamRequest::None),
            Item::LeaveGame => self.on_leave(player),
            Item::BoostFeather | Item::RunnersOnlyBadge => false,
        };
        if handled {
            UseResult::Success
        } else {
            UseResult::Pass
        }
    }

    pub fn on_leave(&mut self, player: PlayerId) -> bool {
        if self.players.remove(player).is_none() {
            return false;
        }
        self.outbox.push(GameEvent::PlayerLeft { player_id: player });
        true
    }

    pub fn on_damage(&self, _player: PlayerId) -> HarmDecision {
        HarmDecision::Deny
    }

    pub fn on_death(&mut self, player: PlayerId, world: &mut dyn World) -> HarmDecision {
        world.heal(player);
        if self.players.contains(player) {
            self.reset_waiting(player, world);
        }
        HarmDecision::Deny
    }

    pub fn participant(&self, player: PlayerId) -> Option<&WaitingParticipant> {
        self.players.get(player).and_then(Participant::as_waiting)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Sort everyone waiting into teams and open the round. The lobby is
    /// left empty; its players now belong to the returned game.
    pub fn start(&mut self, world: &mut dyn World) -> DeathRunGame {
        let waiting: Vec<WaitingParticipant> = self
            .players
            .drain()
            .into_iter()
            .filter_map(|p| match p {
                Participant::Waiting(w) => Some(w),
                Participant::Active(_) => None,
            })
            .collect();

        let teams = assign_teams(&waiting, &self.config, &mut self.rng);
        info!(
            players = waiting.len(),
            runners = teams.runners.len(),
            deaths = teams.deaths.len(),
            "teams assigned"
        );
        let round_rng = StdRng::seed_from_u64(self.rng.random());
        DeathRunGame::start(
            self.map.clone(),
            self.config.clone(),
            teams,
            round_rng,
            world,
        )
    }
}
