use serde::{Deserialize, Serialize};

use deathrun_core::geometry::{Aabb, BlockPos, Vec3};
use deathrun_core::world::{Block, EntityKind, World};

/// Runners below this height have fallen out of the course.
pub const VOID_Y: f64 = 0.0;
/// Height above the feet sampled for water.
pub const SUBMERSION_OFFSET: f64 = 0.65;
/// How close a lightning strike has to land to count.
pub const LIGHTNING_REACH: f64 = 1.5;
/// Falling block type that eliminates on contact.
pub const HAZARD_BLOCK: Block = Block::PointedDripstone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Void,
    Submersion,
    Lightning,
    FallingHazard,
}

/// What the predicates know about a runner this tick.
#[derive(Debug, Clone, Copy)]
pub struct RunnerProbe {
    pub position: Vec3,
    pub bounds: Aabb,
}

pub type DeathPredicate = fn(&RunnerProbe, &dyn World) -> bool;

/// Checked in order; the first hit wins.
pub const DEATH_CONDITIONS: [(DeathCause, DeathPredicate); 4] = [
    (DeathCause::Void, fell_into_void),
    (DeathCause::Submersion, submerged),
    (DeathCause::Lightning, struck_by_lightning),
    (DeathCause::FallingHazard, hit_by_falling_hazard),
];

pub fn evaluate(probe: &RunnerProbe, world: &dyn World) -> Option<DeathCause> {
    DEATH_CONDITIONS
        .iter()
        .find(|(_, predicate)| predicate(probe, world))
        .map(|&(cause, _)| cause)
}

fn fell_into_void(probe: &RunnerProbe, _world: &dyn World) -> bool {
    probe.position.y < VOID_Y
}

fn submerged(probe: &RunnerProbe, world: &dyn World) -> bool {
    let eyes = BlockPos::containing(probe.position.offset(0.0, SUBMERSION_OFFSET, 0.0));
    world.fluid_at(eyes).is_water()
}

fn struck_by_lightning(probe: &RunnerProbe, world: &dyn World) -> bool {
    world
        .entities_in(&probe.bounds.expand(LIGHTNING_REACH))
        .iter()
        .any(|kind| *kind == EntityKind::Lightning)
}

fn hit_by_falling_hazard(probe: &RunnerProbe, world: &dyn World) -> bool {
    world
        .entities_in(&probe.bounds)
        .iter()
        .any(|kind| *kind == EntityKind::FallingBlock(HAZARD_BLOCK))
}
