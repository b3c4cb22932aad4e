pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod death;
pub mod events;
pub mod lobby;
pub mod map;
pub mod participant;
pub mod ranking;
pub mod registry;
pub mod snapshot;
pub mod teams;
pub mod traps;

use std::collections::HashMap;

use rand::rngs::StdRng;
use tracing::{debug, info};

use deathrun_core::geometry::{BlockPos, Vec3};
use deathrun_core::player::PlayerId;
use deathrun_core::time::format_clock;
use deathrun_core::world::{Block, Item, World};

use checkpoint::CheckpointOutcome;
use clock::{ClockSignal, RoundClock};
use config::DeathRunConfig;
use death::RunnerProbe;
use events::{GameEvent, HarmDecision, JoinDecision, UseResult};
use map::DeathRunMap;
use participant::{ActiveParticipant, Participant, Role, Team};
use ranking::{FinishBoard, FinishRecord, OrdinalLabel, place_color};
use registry::Registry;
use snapshot::{RoundSnapshot, SnapshotError};
use teams::TeamAssignment;
use traps::TrapBoard;

/// Launch velocity of the boost feather for a player facing `yaw` degrees.
pub fn boost_velocity(yaw: f32) -> Vec3 {
    let heading = (-(yaw as f64)).to_radians();
    Vec3::new(2.0 * heading.sin(), 0.6, 2.0 * heading.cos())
}

/// One Death Run round, from team assignment until every runner is done.
///
/// The round never holds on to the world. Every entry point takes the
/// host's `&mut dyn World`, applies its edits immediately, and queues
/// presentation cues in an outbox the host drains (`tick` returns them).
pub struct DeathRunGame {
    map: DeathRunMap,
    config: DeathRunConfig,
    /// Trap index by control position.
    controls: HashMap<BlockPos, usize>,
    players: Registry,
    clock: RoundClock,
    traps: TrapBoard,
    finishes: FinishBoard,
    rng: StdRng,
    outbox: Vec<GameEvent>,
    round_complete: bool,
    tick: u64,
}

impl DeathRunGame {
    /// Build the round from an assignment and put everyone at their team
    /// start with their loadout.
    pub fn start(
        map: DeathRunMap,
        config: DeathRunConfig,
        teams: TeamAssignment,
        rng: StdRng,
        world: &mut dyn World,
    ) -> Self {
        let mut game = Self {
            controls: map.control_index(),
            traps: TrapBoard::new(map.trap_zones.len(), config.trap_cooldown_ticks),
            clock: RoundClock::new(config.countdown_ticks),
            players: Registry::new(),
            finishes: FinishBoard::new(),
            outbox: Vec::new(),
            round_complete: false,
            tick: 0,
            map,
            config,
            rng,
        };

        for &id in &teams.runners {
            game.players
                .add(Participant::Active(ActiveParticipant::new(id, Team::Runners)));
        }
        for &id in &teams.deaths {
            game.players
                .add(Participant::Active(ActiveParticipant::new(id, Team::Deaths)));
        }
        for id in game.players.ids() {
            game.respawn(id, world);
        }

        info!(
            runners = teams.runners.len(),
            deaths = teams.deaths.len(),
            "round started"
        );
        game.outbox.push(GameEvent::RoundStarted {
            runners: teams.runners,
            deaths: teams.deaths,
        });
        game
    }

    /// Advance the round by one step: clock, then traps, then every
    /// participant. Returns the events raised since the last drain.
    pub fn tick(&mut self, world: &mut dyn World) -> Vec<GameEvent> {
        self.tick += 1;
        self.tick_clock(world);
        self.tick_traps(world);
        for id in self.players.ids() {
            self.tick_participant(id, world);
        }
        self.check_round_complete();
        self.drain_events()
    }

    fn tick_clock(&mut self, world: &mut dyn World) {
        match self.clock.tick() {
            ClockSignal::Idle => {},
            ClockSignal::Countdown {
                seconds,
                final_stretch,
            } => self.outbox.push(GameEvent::Countdown {
                seconds,
                final_stretch,
            }),
            ClockSignal::Go => {
                info!(tick = self.tick, "countdown over, gate opening");
                self.outbox.push(GameEvent::Go);
                for id in self.players.ids() {
                    if let Some(p) = self.players.get_mut(id).and_then(Participant::as_active_mut) {
                        p.started = true;
                    }
                }
                self.open_gate(world);
            },
        }
    }

    fn tick_traps(&mut self, world: &mut dyn World) {
        let zones = &self.map.trap_zones;
        let outbox = &mut self.outbox;
        self.traps.tick(|zone| {
            if let Some(trap) = zones.get(zone) {
                world.reset_trap(&trap.zone, trap.mechanism.effect());
            }
            debug!(zone, "trap reset");
            outbox.push(GameEvent::TrapReset { zone });
        });
    }

    fn tick_participant(&mut self, id: PlayerId, world: &mut dyn World) {
        let Some(participant) = self.players.get_mut(id) else {
            return;
        };
        match participant.role() {
            Role::Waiting => {},
            Role::Death => {
                if let Some(death) = participant.as_active_mut() {
                    death.advance_timers();
                }
            },
            Role::Runner => self.tick_runner(id, world),
        }
    }

    fn tick_runner(&mut self, id: PlayerId, world: &mut dyn World) {
        let Some(runner) = self.players.get_mut(id).and_then(Participant::as_active_mut) else {
            return;
        };
        runner.advance_timers();
        if !runner.is_racing() {
            return;
        }
        let previous = runner.checkpoint;

        let (Some(position), Some(bounds)) = (world.position(id), world.bounding_box(id)) else {
            return;
        };

        if let Some(cause) = death::evaluate(&RunnerProbe { position, bounds }, &*world) {
            debug!(player_id = id, ?cause, "runner eliminated");
            self.respawn(id, world);
            self.outbox.push(GameEvent::RunnerEliminated {
                player_id: id,
                cause,
            });
            return;
        }

        match checkpoint::track(previous, BlockPos::containing(position), &self.map) {
            CheckpointOutcome::Finish => {
                self.finish(id, world);
            },
            CheckpointOutcome::Entered(index) => {
                if let Some(runner) = self.players.get_mut(id).and_then(Participant::as_active_mut) {
                    runner.checkpoint = Some(index);
                }
                debug!(player_id = id, checkpoint = index, "checkpoint reached");
                self.outbox.push(GameEvent::CheckpointReached {
                    player_id: id,
                    checkpoint: index,
                });
            },
            CheckpointOutcome::Unchanged | CheckpointOutcome::Outside => {},
        }
    }

    fn check_round_complete(&mut self) {
        if self.round_complete || self.clock.is_running() {
            return;
        }
        let all_finished = self
            .players
            .all()
            .filter_map(Participant::as_active)
            .filter(|p| p.team == Team::Runners)
            .all(|p| p.finished);
        if all_finished {
            self.round_complete = true;
            info!(
                tick = self.tick,
                finishers = self.finishes.len(),
                "round complete"
            );
            self.outbox.push(GameEvent::RoundComplete {
                results: self.finishes.records().to_vec(),
            });
        }
    }

    /// A player used a block. Deaths pressing a ready trap control fire it.
    pub fn on_interact(&mut self, player: PlayerId, pos: BlockPos, world: &mut dyn World) -> UseResult {
        let Some(&zone) = self.controls.get(&pos) else {
            return UseResult::Pass;
        };
        if self.trigger(player, zone, world) {
            UseResult::Success
        } else {
            UseResult::Pass
        }
    }

    /// Fire trap `zone` on behalf of `player`. Only deaths can fire traps,
    /// and only while the control is not cooling down.
    pub fn trigger(&mut self, player: PlayerId, zone: usize, world: &mut dyn World) -> bool {
        let is_death = self
            .players
            .get(player)
            .is_some_and(|p| p.role() == Role::Death);
        if !is_death {
            return false;
        }
        let Some(trap) = self.map.trap_zones.get(zone).copied() else {
            return false;
        };
        if !self.traps.trigger(zone, trap.mechanism) {
            return false;
        }

        world.trigger_trap(&trap.zone, trap.mechanism.effect());
        debug!(zone, player_id = player, mechanism = ?trap.mechanism, "trap triggered");
        self.outbox.push(GameEvent::TrapTriggered { zone, by: player });
        true
    }

    /// Item use. Handles the runner boost; everything else passes.
    pub fn on_use_item(&mut self, player: PlayerId, item: Item, world: &mut dyn World) -> UseResult {
        if item != Item::BoostFeather {
            return UseResult::Pass;
        }
        let Some(runner) = self.players.get_mut(player).and_then(Participant::as_active_mut) else {
            return UseResult::Pass;
        };
        if !runner.is_racing() || runner.boost_cooldown > 0 {
            return UseResult::Pass;
        }
        let Some(yaw) = world.yaw(player) else {
            return UseResult::Pass;
        };

        runner.boost_cooldown = self.config.boost_cooldown_ticks;
        let velocity = boost_velocity(yaw);
        world.set_velocity(player, velocity);
        self.outbox.push(GameEvent::Boosted {
            player_id: player,
            velocity,
        });
        UseResult::Success
    }

    /// Drop a player from the round. Returns whether they were in it.
    pub fn on_leave(&mut self, player: PlayerId) -> bool {
        if self.players.remove(player).is_none() {
            return false;
        }
        debug!(player_id = player, "player left the round");
        self.outbox.push(GameEvent::PlayerLeft { player_id: player });
        true
    }

    pub fn on_join(&self, _player: PlayerId) -> JoinDecision {
        JoinDecision::Reject("round in progress")
    }

    pub fn on_damage(&self, _player: PlayerId) -> HarmDecision {
        HarmDecision::Deny
    }

    /// The host is about to kill `player`. Cancelled: the player is healed
    /// and sent back to their team start instead.
    pub fn on_death(&mut self, player: PlayerId, world: &mut dyn World) -> HarmDecision {
        world.heal(player);
        if self.respawn(player, world)
            && let Some(team) = self.participant(player).map(|p| p.team)
        {
            debug!(player_id = player, ?team, "death cancelled, respawned");
            self.outbox.push(GameEvent::Died {
                player_id: player,
                team,
            });
        }
        HarmDecision::Deny
    }

    /// Record a runner crossing the finish. No-op for anyone who is not an
    /// unfinished runner.
    pub fn finish(&mut self, player: PlayerId, world: &mut dyn World) -> Option<FinishRecord> {
        let runner = self.players.get_mut(player).and_then(Participant::as_active_mut)?;
        if runner.team != Team::Runners || runner.finished {
            return None;
        }
        runner.finished = true;
        let record = self.finishes.record(player, runner.elapsed_ticks)?;

        world.set_invisible(player, true);
        world.clear_inventory(player);

        let time = format_clock(record.elapsed_ticks);
        info!(player_id = player, place = record.place, %time, "runner finished");
        self.outbox.push(GameEvent::Finished {
            player_id: player,
            place: record.place,
            elapsed_ticks: record.elapsed_ticks,
            time,
            label: OrdinalLabel::for_place(record.place),
            color: place_color(record.place),
        });
        Some(record)
    }

    /// Remove gate blocks that are still iron bars. Returns how many went.
    pub fn open_gate(&mut self, world: &mut dyn World) -> usize {
        let mut removed = 0;
        for &pos in &self.map.gate {
            if world.block_at(pos) == Block::IronBars {
                world.remove_block(pos);
                removed += 1;
            }
        }
        if removed > 0 {
            self.outbox.push(GameEvent::GateOpened { removed });
        }
        removed
    }

    /// Send an active participant to a random column of their team start
    /// and hand them a fresh loadout.
    pub fn respawn(&mut self, player: PlayerId, world: &mut dyn World) -> bool {
        let Some(team) = self.participant(player).map(|p| p.team) else {
            return false;
        };
        let at = self.map.team_start(team).random_column(&mut self.rng);
        world.teleport(player, at);
        world.clear_inventory(player);
        for &(slot, item) in team.loadout() {
            world.give_item(player, slot, item);
        }
        true
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            tick: self.tick,
            countdown_ticks: self.clock.ticks_remaining(),
            started: self.is_started(),
            round_complete: self.round_complete,
            participants: self
                .players
                .all()
                .filter_map(Participant::as_active)
                .cloned()
                .collect(),
            finishes: self.finishes.records().to_vec(),
            trap_phases: self.traps.phases().to_vec(),
            pending_resets: self.traps.resets().len(),
        }
    }

    pub fn serialize_state(&self) -> Result<Vec<u8>, SnapshotError> {
        self.snapshot().encode()
    }

    /// Finish records in arrival order.
    pub fn results(&self) -> &[FinishRecord] {
        self.finishes.records()
    }

    pub fn is_round_complete(&self) -> bool {
        self.round_complete
    }

    pub fn is_started(&self) -> bool {
        !self.clock.is_running()
    }

    pub fn participant(&self, player: PlayerId) -> Option<&ActiveParticipant> {
        self.players.get(player).and_then(Participant::as_active)
    }

    pub fn players(&self) -> &Registry {
        &self.players
    }

    pub fn map(&self) -> &DeathRunMap {
        &self.map
    }

    pub fn config(&self) -> &DeathRunConfig {
        &self.config
    }

    pub fn traps(&self) -> &TrapBoard {
        &self.traps
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
