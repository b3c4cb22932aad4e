use std::collections::{BTreeMap, HashMap, HashSet};

use crate::geometry::{Aabb, BlockBounds, BlockPos, Vec3};
use crate::player::PlayerId;
use crate::world::{Block, EntityKind, Fluid, Item, TrapEffect, World};

/// Player collision box width.
pub const PLAYER_WIDTH: f64 = 0.6;
/// Player collision box height.
pub const PLAYER_HEIGHT: f64 = 1.8;
/// Ticks a lightning strike stays dangerous.
pub const LIGHTNING_TTL: u32 = 8;
/// Ticks falling dripstone stays in the air.
pub const DRIPSTONE_TTL: u32 = 20;

#[derive(Debug, Clone, Default)]
struct Body {
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    invisible: bool,
    inventory: BTreeMap<u8, Item>,
    heals: u32,
}

#[derive(Debug, Clone)]
struct Transient {
    kind: EntityKind,
    area: Aabb,
    ttl: u32,
}

/// A trap effect the world was asked to apply, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapLogEntry {
    Triggered(BlockBounds, TrapEffect),
    Reset(BlockBounds, TrapEffect),
}

/// Self-contained world used by the headless host and by tests.
///
/// There is no physics: bodies stay where they are put. Trap effects are
/// modeled just far enough for the hazard checks to see them (transient
/// entities, removed blocks, water).
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    bodies: HashMap<PlayerId, Body>,
    blocks: HashMap<BlockPos, Block>,
    fluids: HashMap<BlockPos, Fluid>,
    entities: Vec<Transient>,
    vanished: HashMap<BlockPos, Block>,
    flooded: HashSet<BlockPos>,
    trap_log: Vec<TrapLogEntry>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a body for `player`, replacing any existing one.
    pub fn spawn_player(&mut self, player: PlayerId, at: Vec3) {
        self.bodies.insert(
            player,
            Body {
                position: at,
                ..Body::default()
            },
        );
    }

    pub fn despawn_player(&mut self, player: PlayerId) {
        self.bodies.remove(&player);
    }

    pub fn set_yaw(&mut self, player: PlayerId, yaw: f32) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.yaw = yaw;
        }
    }

    pub fn set_block(&mut self, pos: BlockPos, block: Block) {
        if block == Block::Air {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn fill(&mut self, bounds: &BlockBounds, block: Block) {
        for pos in bounds.positions() {
            self.set_block(pos, block);
        }
    }

    pub fn set_fluid(&mut self, pos: BlockPos, fluid: Fluid) {
        if fluid == Fluid::Empty {
            self.fluids.remove(&pos);
        } else {
            self.fluids.insert(pos, fluid);
        }
    }

    /// Add an entity occupying `area` for `ttl` calls to [`advance`](Self::advance).
    pub fn spawn_entity(&mut self, kind: EntityKind, area: Aabb, ttl: u32) {
        self.entities.push(Transient { kind, area, ttl });
    }

    /// Age transient entities by one tick, dropping expired ones.
    pub fn advance(&mut self) {
        for entity in &mut self.entities {
            entity.ttl = entity.ttl.saturating_sub(1);
        }
        self.entities.retain(|e| e.ttl > 0);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn velocity(&self, player: PlayerId) -> Option<Vec3> {
        self.bodies.get(&player).map(|b| b.velocity)
    }

    pub fn inventory(&self, player: PlayerId) -> Option<&BTreeMap<u8, Item>> {
        self.bodies.get(&player).map(|b| &b.inventory)
    }

    pub fn is_invisible(&self, player: PlayerId) -> bool {
        self.bodies.get(&player).is_some_and(|b| b.invisible)
    }

    pub fn heal_count(&self, player: PlayerId) -> u32 {
        self.bodies.get(&player).map_or(0, |b| b.heals)
    }

    pub fn trap_log(&self) -> &[TrapLogEntry] {
        &self.trap_log
    }
}

impl World for MemoryWorld {
    fn position(&self, player: PlayerId) -> Option<Vec3> {
        self.bodies.get(&player).map(|b| b.position)
    }

    fn bounding_box(&self, player: PlayerId) -> Option<Aabb> {
        self.position(player)
            .map(|feet| Aabb::from_feet(feet, PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    fn yaw(&self, player: PlayerId) -> Option<f32> {
        self.bodies.get(&player).map(|b| b.yaw)
    }

    fn fluid_at(&self, pos: BlockPos) -> Fluid {
        self.fluids.get(&pos).copied().unwrap_or_default()
    }

    fn block_at(&self, pos: BlockPos) -> Block {
        self.blocks.get(&pos).copied().unwrap_or_default()
    }

    fn entities_in(&self, area: &Aabb) -> Vec<EntityKind> {
        self.entities
            .iter()
            .filter(|e| e.area.intersects(area))
            .map(|e| e.kind)
            .collect()
    }

    fn teleport(&mut self, player: PlayerId, to: Vec3) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.position = to;
            body.velocity = Vec3::default();
        }
    }

    fn set_velocity(&mut self, player: PlayerId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.velocity = velocity;
        }
    }

    fn remove_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
    }

    fn trigger_trap(&mut self, zone: &BlockBounds, effect: TrapEffect) {
        tracing::debug!(?zone, ?effect, "trap effect applied");
        self.trap_log.push(TrapLogEntry::Triggered(*zone, effect));
        match effect {
            TrapEffect::Lightning => {
                self.spawn_entity(EntityKind::Lightning, zone.to_aabb(), LIGHTNING_TTL);
            },
            TrapEffect::DripstoneRain => {
                self.spawn_entity(
                    EntityKind::FallingBlock(Block::PointedDripstone),
                    zone.to_aabb(),
                    DRIPSTONE_TTL,
                );
            },
            TrapEffect::VanishingFloor => {
                for pos in zone.positions() {
                    if let Some(block) = self.blocks.remove(&pos) {
                        self.vanished.insert(pos, block);
                    }
                }
            },
            TrapEffect::Flood => {
                for pos in zone.positions() {
                    if self.fluid_at(pos) == Fluid::Empty {
                        self.fluids.insert(pos, Fluid::Water);
                        self.flooded.insert(pos);
                    }
                }
            },
        }
    }

    fn reset_trap(&mut self, zone: &BlockBounds, effect: TrapEffect) {
        self.trap_log.push(TrapLogEntry::Reset(*zone, effect));
        match effect {
            TrapEffect::Lightning | TrapEffect::DripstoneRain => {},
            TrapEffect::VanishingFloor => {
                for pos in zone.positions() {
                    if let Some(block) = self.vanished.remove(&pos) {
                        self.blocks.insert(pos, block);
                    }
                }
            },
            TrapEffect::Flood => {
                for pos in zone.positions() {
                    if self.flooded.remove(&pos) {
                        self.fluids.remove(&pos);
                    }
                }
            },
        }
    }

    fn clear_inventory(&mut self, player: PlayerId) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.inventory.clear();
        }
    }

    fn give_item(&mut self, player: PlayerId, slot: u8, item: Item) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.inventory.insert(slot, item);
        }
    }

    fn set_invisible(&mut self, player: PlayerId, invisible: bool) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.invisible = invisible;
        }
    }

    fn heal(&mut self, player: PlayerId) {
        if let Some(body) = self.bodies.get_mut(&player) {
            body.heals += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> BlockBounds {
        BlockBounds::new(BlockPos::new(0, 0, 0), BlockPos::new(2, 0, 2))
    }

    #[test]
    fn vanishing_floor_restores_original_blocks() {
        let mut world = MemoryWorld::new();
        world.fill(&zone(), Block::Stone);
        world.trigger_trap(&zone(), TrapEffect::VanishingFloor);
        assert_eq!(world.block_at(BlockPos::new(1, 0, 1)), Block::Air);

        world.reset_trap(&zone(), TrapEffect::VanishingFloor);
        assert_eq!(world.block_at(BlockPos::new(1, 0, 1)), Block::Stone);
        assert_eq!(world.trap_log().len(), 2);
    }

    #[test]
    fn flood_drains_only_what_it_filled() {
        let mut world = MemoryWorld::new();
        world.set_fluid(BlockPos::new(0, 0, 0), Fluid::Lava);
        world.trigger_trap(&zone(), TrapEffect::Flood);
        assert_eq!(world.fluid_at(BlockPos::new(2, 0, 2)), Fluid::Water);

        world.reset_trap(&zone(), TrapEffect::Flood);
        assert_eq!(world.fluid_at(BlockPos::new(2, 0, 2)), Fluid::Empty);
        assert_eq!(world.fluid_at(BlockPos::new(0, 0, 0)), Fluid::Lava);
    }

    #[test]
    fn lightning_expires_after_ttl() {
        let mut world = MemoryWorld::new();
        world.trigger_trap(&zone(), TrapEffect::Lightning);
        let probe = zone().to_aabb();
        assert_eq!(world.entities_in(&probe), vec![EntityKind::Lightning]);
        assert_eq!(world.entity_count(), 1);

        for _ in 0..LIGHTNING_TTL {
            world.advance();
        }
        assert!(world.entities_in(&probe).is_empty());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn teleport_clears_velocity() {
        let mut world = MemoryWorld::new();
        world.spawn_player(1, Vec3::new(0.5, 1.0, 0.5));
        world.set_velocity(1, Vec3::new(1.0, 0.0, 0.0));
        world.teleport(1, Vec3::new(5.5, 1.0, 5.5));
        assert_eq!(world.velocity(1), Some(Vec3::default()));
        assert_eq!(world.position(1), Some(Vec3::new(5.5, 1.0, 5.5)));
    }

    #[test]
    fn edits_to_missing_players_are_ignored() {
        let mut world = MemoryWorld::new();
        world.give_item(9, 0, Item::BoostFeather);
        world.heal(9);
        assert!(world.inventory(9).is_none());
        assert_eq!(world.heal_count(9), 0);
    }
}
