use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use deathrun_core::geometry::{BlockPos, Vec3};
use deathrun_core::memory_world::MemoryWorld;
use deathrun_core::test_helpers::make_players;
use deathrun_game::DeathRunGame;
use deathrun_game::config::DeathRunConfig;
use deathrun_game::events::GameEvent;
use deathrun_game::lobby::Lobby;
use deathrun_game::map::DeathRunMap;
use deathrun_game::participant::{Team, TeamRequest};
use deathrun_game::snapshot::RoundSnapshot;
use deathrun_game::teams::TeamAssignment;
use deathrun_server::config::SimulationConfig;
use deathrun_server::game_loop::{
    EndReason, GameBroadcast, GameCommand, SessionConfig, spawn_round,
};
use deathrun_server::sim::{Autopilot, build_world};

fn map() -> DeathRunMap {
    DeathRunMap::from_toml(include_str!("../../../config/map.toml")).unwrap()
}

/// Runners 1 and 2, death 3, standing in the lobby spawn.
fn fixed_round() -> (DeathRunGame, MemoryWorld) {
    let map = map();
    let mut world = build_world(&map);
    for p in make_players(3) {
        world.spawn_player(p.id, map.spawn.center_bottom());
    }
    let teams = TeamAssignment {
        runners: vec![1, 2],
        deaths: vec![3],
    };
    let game = DeathRunGame::start(
        map,
        DeathRunConfig::default(),
        teams,
        StdRng::seed_from_u64(7),
        &mut world,
    );
    (game, world)
}

fn session(max_ticks: u64) -> SessionConfig {
    SessionConfig {
        tick_rate_hz: 20,
        max_ticks,
        snapshot_interval: 0,
        autopilot: None,
    }
}

async fn collect(mut rx: mpsc::UnboundedReceiver<GameBroadcast>) -> Vec<GameBroadcast> {
    let mut out = Vec::new();
    while let Some(b) = rx.recv().await {
        out.push(b);
    }
    out
}

fn events(broadcasts: &[GameBroadcast]) -> Vec<GameEvent> {
    broadcasts
        .iter()
        .filter_map(|b| match b {
            GameBroadcast::Events { events, .. } => Some(events.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test(start_paused = true)]
async fn simulated_round_runs_to_completion() {
    let map = map();
    let mut world = build_world(&map);
    let players = make_players(8);
    let mut lobby = Lobby::new(map.clone(), DeathRunConfig::default(), StdRng::seed_from_u64(3));
    for p in &players {
        world.spawn_player(p.id, map.spawn.center_bottom());
        lobby.on_join(p.id, &mut world);
    }
    lobby.request_team(1, TeamRequest::Deaths);
    let game = lobby.start(&mut world);
    let runners = game
        .players()
        .all()
        .filter_map(|p| p.as_active())
        .filter(|p| p.team == Team::Runners)
        .count();
    assert_eq!(runners, 6);

    let pilot = Autopilot::new(
        &SimulationConfig {
            runner_speed: 0.5,
            trap_chance: 0.0,
            ..SimulationConfig::default()
        },
        StdRng::seed_from_u64(4),
    );
    let config = SessionConfig {
        autopilot: Some(pilot),
        ..session(2000)
    };
    let (_cmd_tx, rx, handle) = spawn_round(game, world, config);

    let broadcasts = collect(rx).await;
    let summary = handle.await.unwrap();

    assert_eq!(summary.reason, EndReason::Complete);
    assert_eq!(summary.results.len(), runners);
    assert!(summary.ticks > 200 && summary.ticks < 2000);

    let events = events(&broadcasts);
    assert!(matches!(events.first(), Some(GameEvent::RoundStarted { .. })));
    assert_eq!(events.iter().filter(|e| **e == GameEvent::Go).count(), 1);
    assert!(events.contains(&GameEvent::GateOpened { removed: 14 }));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundComplete { .. }))
            .count(),
        1
    );
    assert!(matches!(
        broadcasts.last(),
        Some(GameBroadcast::RoundEnded { results, .. }) if results.len() == runners
    ));
}

#[tokio::test(start_paused = true)]
async fn commands_reach_the_round_in_order() {
    let (game, world) = fixed_round();
    let (cmd_tx, rx, handle) = spawn_round(game, world, session(1000));

    cmd_tx
        .send(GameCommand::Interact {
            player_id: 3,
            pos: BlockPos::new(8, 6, 8),
        })
        .unwrap();
    cmd_tx
        .send(GameCommand::Interact {
            player_id: 1,
            pos: BlockPos::new(8, 6, 24),
        })
        .unwrap();
    cmd_tx.send(GameCommand::Leave { player_id: 2 }).unwrap();
    cmd_tx.send(GameCommand::Stop).unwrap();

    let broadcasts = collect(rx).await;
    let summary = handle.await.unwrap();
    assert_eq!(summary.reason, EndReason::Stopped);

    let events = events(&broadcasts);
    let triggered: Vec<&GameEvent> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TrapTriggered { .. }))
        .collect();
    assert_eq!(triggered, vec![&GameEvent::TrapTriggered { zone: 0, by: 3 }]);
    assert!(events.contains(&GameEvent::PlayerLeft { player_id: 2 }));
}

#[tokio::test(start_paused = true)]
async fn runners_moved_into_the_finish_finish_on_go() {
    let (game, world) = fixed_round();
    let (cmd_tx, rx, handle) = spawn_round(game, world, session(1000));

    for player_id in [1, 2] {
        cmd_tx
            .send(GameCommand::Move {
                player_id,
                to: Vec3::new(0.5, 1.0, 62.5),
            })
            .unwrap();
    }

    let _broadcasts = collect(rx).await;
    let summary = handle.await.unwrap();
    assert_eq!(summary.reason, EndReason::Complete);
    assert_eq!(summary.ticks, 200);
    let order: Vec<(u64, usize, u32)> = summary
        .results
        .iter()
        .map(|r| (r.player_id, r.place, r.elapsed_ticks))
        .collect();
    assert_eq!(order, vec![(1, 1, 1), (2, 2, 1)]);
}

#[tokio::test(start_paused = true)]
async fn unresolved_round_stops_at_tick_limit() {
    let (game, world) = fixed_round();
    let config = SessionConfig {
        snapshot_interval: 10,
        ..session(30)
    };
    let (_cmd_tx, rx, handle) = spawn_round(game, world, config);

    let broadcasts = collect(rx).await;
    let summary = handle.await.unwrap();
    assert_eq!(summary.reason, EndReason::TickLimit);
    assert_eq!(summary.ticks, 30);
    assert!(summary.results.is_empty());

    let snapshots: Vec<RoundSnapshot> = broadcasts
        .iter()
        .filter_map(|b| match b {
            GameBroadcast::State { data, .. } => Some(RoundSnapshot::decode(data).unwrap()),
            _ => None,
        })
        .collect();
    let ticks: Vec<u64> = snapshots.iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![10, 20, 30]);
    assert!(snapshots.iter().all(|s| !s.started));
    assert_eq!(snapshots[2].countdown_ticks, 170);
}
