use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use deathrun_core::player::{Player, PlayerId};
use deathrun_core::time::format_clock;
use deathrun_game::config::DeathRunConfig;
use deathrun_game::lobby::Lobby;
use deathrun_game::map::DeathRunMap;
use deathrun_game::participant::TeamRequest;
use deathrun_server::config::ServerConfig;
use deathrun_server::game_loop::{GameBroadcast, GameCommand, SessionConfig, spawn_round};
use deathrun_server::sim::{Autopilot, build_world};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    config.validate();
    let rules = DeathRunConfig::load();

    let map = match DeathRunMap::load(&config.map_path) {
        Ok(map) => map,
        Err(e) => {
            tracing::error!(path = %config.map_path, error = %e, "Failed to load map");
            std::process::exit(1);
        },
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, players = config.simulation.players, "Death Run host starting");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut world = build_world(&map);
    let mut lobby = Lobby::new(map.clone(), rules, StdRng::seed_from_u64(rng.random()));
    let players: Vec<Player> = (1..=config.simulation.players as PlayerId)
        .map(|id| Player::new(id, format!("Runner{id}")))
        .collect();
    for (i, player) in players.iter().enumerate() {
        world.spawn_player(player.id, map.spawn.center_bottom());
        lobby.on_join(player.id, &mut world);
        if i < config.simulation.death_requests {
            lobby.request_team(player.id, TeamRequest::Deaths);
        }
    }

    let game = lobby.start(&mut world);
    let session = SessionConfig {
        tick_rate_hz: config.tick_rate_hz,
        max_ticks: config.limits.max_ticks,
        snapshot_interval: 0,
        autopilot: Some(Autopilot::new(
            &config.simulation,
            StdRng::seed_from_u64(rng.random()),
        )),
    };
    let (cmd_tx, mut broadcast_rx, handle) = spawn_round(game, world, session);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping round");
            let _ = cmd_tx.send(GameCommand::Stop);
        }
    });

    while let Some(broadcast) = broadcast_rx.recv().await {
        match broadcast {
            GameBroadcast::Events { tick, events } => {
                for event in events {
                    tracing::debug!(tick, ?event, "event");
                }
            },
            GameBroadcast::State { tick, data } => {
                tracing::trace!(tick, bytes = data.len(), "state");
            },
            GameBroadcast::RoundEnded { .. } => break,
        }
    }

    match handle.await {
        Ok(summary) => {
            tracing::info!(ticks = summary.ticks, reason = ?summary.reason, "Round over");
            for record in &summary.results {
                let name = players
                    .iter()
                    .find(|p| p.id == record.player_id)
                    .map_or("?", |p| p.display_name.as_str());
                tracing::info!(
                    place = record.place,
                    name,
                    time = %format_clock(record.elapsed_ticks),
                    "Finisher"
                );
            }
        },
        Err(e) => tracing::error!(error = %e, "Round task failed"),
    }
}
