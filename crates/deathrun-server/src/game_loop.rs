use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use deathrun_core::geometry::{BlockPos, Vec3};
use deathrun_core::memory_world::MemoryWorld;
use deathrun_core::player::PlayerId;
use deathrun_core::world::{Item, World};
use deathrun_game::DeathRunGame;
use deathrun_game::events::GameEvent;
use deathrun_game::ranking::FinishRecord;

use crate::sim::Autopilot;

/// Commands sent to the round task. The task is the only writer of the
/// round and its world; everything else goes through this queue.
#[derive(Debug)]
pub enum GameCommand {
    Interact { player_id: PlayerId, pos: BlockPos },
    UseItem { player_id: PlayerId, item: Item },
    /// Host-side movement; the in-memory world has no physics of its own.
    Move { player_id: PlayerId, to: Vec3 },
    Damage { player_id: PlayerId },
    Death { player_id: PlayerId },
    Leave { player_id: PlayerId },
    Stop,
}

/// Broadcasts sent from the round task to whoever hosts it.
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Events { tick: u64, events: Vec<GameEvent> },
    /// MessagePack round snapshot, sent every `snapshot_interval` ticks.
    State { tick: u64, data: Vec<u8> },
    /// The loop has exited.
    RoundEnded { tick: u64, results: Vec<FinishRecord> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Complete,
    TickLimit,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub ticks: u64,
    pub reason: EndReason,
    pub results: Vec<FinishRecord>,
}

pub struct SessionConfig {
    pub tick_rate_hz: u32,
    pub max_ticks: u64,
    /// 0 disables snapshots.
    pub snapshot_interval: u64,
    pub autopilot: Option<Autopilot>,
}

/// Spawn the round tick loop as a tokio task.
/// Returns the command sender, the broadcast receiver and the task handle.
pub fn spawn_round(
    game: DeathRunGame,
    world: MemoryWorld,
    config: SessionConfig,
) -> (
    mpsc::UnboundedSender<GameCommand>,
    mpsc::UnboundedReceiver<GameBroadcast>,
    JoinHandle<RoundSummary>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(run_round_loop(game, world, config, cmd_rx, broadcast_tx));

    (cmd_tx, broadcast_rx, handle)
}

async fn run_round_loop(
    mut game: DeathRunGame,
    mut world: MemoryWorld,
    mut config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<GameCommand>,
    broadcast_tx: mpsc::UnboundedSender<GameBroadcast>,
) -> RoundSummary {
    let tick_interval = Duration::from_secs_f64(1.0 / f64::from(config.tick_rate_hz.max(1)));
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Events raised at start-up (team announcement) go out first.
    send_events(&broadcast_tx, game.tick_count(), game.drain_events());

    let reason = loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(pilot) = config.autopilot.as_mut() {
                    pilot.step(&mut game, &mut world);
                }
                world.advance();
                let events = game.tick(&mut world);
                let tick = game.tick_count();
                send_events(&broadcast_tx, tick, events);

                if config.snapshot_interval > 0 && tick % config.snapshot_interval == 0 {
                    match game.serialize_state() {
                        Ok(data) => {
                            let _ = broadcast_tx.send(GameBroadcast::State { tick, data });
                        },
                        Err(e) => tracing::error!(error = %e, "Failed to encode round state"),
                    }
                }

                if game.is_round_complete() {
                    break EndReason::Complete;
                }
                if tick >= config.max_ticks {
                    tracing::warn!(tick, "Round hit the tick limit");
                    break EndReason::TickLimit;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(GameCommand::Stop) | None => break EndReason::Stopped,
                    Some(cmd) => {
                        apply_command(&mut game, &mut world, cmd);
                        send_events(&broadcast_tx, game.tick_count(), game.drain_events());
                    },
                }
            }
        }
    };

    let ticks = game.tick_count();
    let results = game.results().to_vec();
    tracing::info!(ticks, ?reason, finishers = results.len(), "Round loop exiting");
    let _ = broadcast_tx.send(GameBroadcast::RoundEnded {
        tick: ticks,
        results: results.clone(),
    });
    RoundSummary {
        ticks,
        reason,
        results,
    }
}

fn apply_command(game: &mut DeathRunGame, world: &mut MemoryWorld, cmd: GameCommand) {
    match cmd {
        GameCommand::Interact { player_id, pos } => {
            let result = game.on_interact(player_id, pos, world);
            tracing::trace!(player_id, ?pos, ?result, "interact");
        },
        GameCommand::UseItem { player_id, item } => {
            let result = game.on_use_item(player_id, item, world);
            tracing::trace!(player_id, ?item, ?result, "use item");
        },
        GameCommand::Move { player_id, to } => world.teleport(player_id, to),
        GameCommand::Damage { player_id } => {
            // Always denied; nothing to apply.
            game.on_damage(player_id);
        },
        GameCommand::Death { player_id } => {
            game.on_death(player_id, world);
        },
        GameCommand::Leave { player_id } => {
            if game.on_leave(player_id) {
                world.despawn_player(player_id);
            }
        },
        GameCommand::Stop => {},
    }
}

fn send_events(tx: &mpsc::UnboundedSender<GameBroadcast>, tick: u64, events: Vec<GameEvent>) {
    if events.is_empty() {
        return;
    }
    let _ = tx.send(GameBroadcast::Events { tick, events });
}
