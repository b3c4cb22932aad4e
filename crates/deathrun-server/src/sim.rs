use rand::Rng;
use rand::rngs::StdRng;

use deathrun_core::geometry::Vec3;
use deathrun_core::memory_world::MemoryWorld;
use deathrun_core::player::PlayerId;
use deathrun_core::world::{Block, TrapEffect, World};
use deathrun_game::DeathRunGame;
use deathrun_game::map::DeathRunMap;
use deathrun_game::participant::{Participant, Team};

use crate::config::SimulationConfig;

/// Lay out the blocks a map expects: gate bars, trap buttons, and the
/// floors that vanishing-floor traps remove.
pub fn build_world(map: &DeathRunMap) -> MemoryWorld {
    let mut world = MemoryWorld::new();
    for &pos in &map.gate {
        world.set_block(pos, Block::IronBars);
    }
    for trap in &map.trap_zones {
        world.set_block(trap.control, Block::Button);
        if trap.mechanism.effect() == TrapEffect::VanishingFloor {
            world.fill(&trap.zone, Block::Stone);
        }
    }
    world
}

/// Drives simulated players: runners walk straight at the finish, deaths
/// press random trap controls now and then.
pub struct Autopilot {
    rng: StdRng,
    speed: f64,
    trap_chance: f64,
}

impl Autopilot {
    pub fn new(config: &SimulationConfig, rng: StdRng) -> Self {
        Self {
            rng,
            speed: config.runner_speed,
            trap_chance: config.trap_chance.clamp(0.0, 1.0),
        }
    }

    pub fn step(&mut self, game: &mut DeathRunGame, world: &mut MemoryWorld) {
        if !game.is_started() {
            return;
        }

        let target = game.map().finish.center_bottom();
        for id in members(game, Team::Runners) {
            let Some(pos) = world.position(id) else {
                continue;
            };
            let (dx, dz) = (target.x - pos.x, target.z - pos.z);
            let dist = pos.distance_to(Vec3::new(target.x, pos.y, target.z));
            if dist < f64::EPSILON {
                continue;
            }
            let step = self.speed.min(dist);
            world.teleport(
                id,
                Vec3::new(pos.x + dx / dist * step, pos.y, pos.z + dz / dist * step),
            );
        }

        let zones = game.map().trap_zones.len();
        if zones == 0 || self.trap_chance == 0.0 {
            return;
        }
        for id in members(game, Team::Deaths) {
            if self.rng.random_bool(self.trap_chance) {
                let control = game.map().trap_zones[self.rng.random_range(0..zones)].control;
                game.on_interact(id, control, world);
            }
        }
    }
}

fn members(game: &DeathRunGame, team: Team) -> Vec<PlayerId> {
    game.players()
        .all()
        .filter_map(Participant::as_active)
        .filter(|p| p.team == team && !p.finished)
        .map(|p| p.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use deathrun_core::test_helpers::make_players;
    use deathrun_game::config::DeathRunConfig;
    use deathrun_game::teams::TeamAssignment;

    use super::*;

    fn map() -> DeathRunMap {
        DeathRunMap::from_toml(include_str!("../../../config/map.toml")).unwrap()
    }

    #[test]
    fn world_has_gate_and_buttons() {
        let map = map();
        let world = build_world(&map);
        assert!(map.gate.iter().all(|&p| world.block_at(p) == Block::IronBars));
        assert!(
            map.trap_zones
                .iter()
                .all(|t| world.block_at(t.control) == Block::Button)
        );
    }

    #[test]
    fn runners_wait_for_the_gate() {
        let map = map();
        let mut world = build_world(&map);
        for p in make_players(2) {
            world.spawn_player(p.id, map.spawn.center_bottom());
        }
        let teams = TeamAssignment {
            runners: vec![1],
            deaths: vec![2],
        };
        let mut game = DeathRunGame::start(
            map,
            DeathRunConfig::default(),
            teams,
            StdRng::seed_from_u64(1),
            &mut world,
        );
        let before = world.position(1);
        let mut pilot = Autopilot::new(&SimulationConfig::default(), StdRng::seed_from_u64(2));
        pilot.step(&mut game, &mut world);
        assert_eq!(world.position(1), before);

        for _ in 0..game.config().countdown_ticks {
            game.tick(&mut world);
        }
        pilot.step(&mut game, &mut world);
        let after = world.position(1).unwrap();
        assert!(after.z > before.unwrap().z);
    }
}
