use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, BlockBounds, BlockPos, Vec3};
use crate::player::PlayerId;

/// Fluid occupying a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fluid {
    #[default]
    Empty,
    Water,
    FlowingWater,
    Lava,
}

impl Fluid {
    pub fn is_water(self) -> bool {
        matches!(self, Fluid::Water | Fluid::FlowingWater)
    }
}

/// The block kinds the round logic cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    #[default]
    Air,
    Stone,
    IronBars,
    PointedDripstone,
    Button,
    Other(u16),
}

/// Entities the hazard checks look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lightning,
    FallingBlock(Block),
}

/// Items handed out by the lobby and the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    BoostFeather,
    LeaveGame,
    RequestRunner,
    RequestDeath,
    RequestClear,
    RunnersOnlyBadge,
}

/// Hazard effect a trap mechanism applies to its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapEffect {
    /// Lightning strikes inside the zone.
    Lightning,
    /// Pointed dripstone falls through the zone.
    DripstoneRain,
    /// Solid blocks in the zone disappear until reset.
    VanishingFloor,
    /// The zone fills with water until reset.
    Flood,
}

/// The host world as seen by the round engine.
///
/// The engine never owns the world: every operation that needs it takes a
/// `&mut dyn World`, so the host keeps physics, rendering, and networking to
/// itself and only answers these queries and applies these edits. All edits
/// are fire-and-forget; the engine never inspects their outcome.
pub trait World {
    /// Feet position of a player, or `None` if the player has no body.
    fn position(&self, player: PlayerId) -> Option<Vec3>;

    /// Collision box of a player.
    fn bounding_box(&self, player: PlayerId) -> Option<Aabb>;

    /// Facing yaw in degrees.
    fn yaw(&self, player: PlayerId) -> Option<f32>;

    fn fluid_at(&self, pos: BlockPos) -> Fluid;

    fn block_at(&self, pos: BlockPos) -> Block;

    /// Entities whose bounds overlap `area`.
    fn entities_in(&self, area: &Aabb) -> Vec<EntityKind>;

    fn teleport(&mut self, player: PlayerId, to: Vec3);

    fn set_velocity(&mut self, player: PlayerId, velocity: Vec3);

    /// Replace the block at `pos` with air.
    fn remove_block(&mut self, pos: BlockPos);

    /// Run a trap mechanism's trigger effect over its zone.
    fn trigger_trap(&mut self, zone: &BlockBounds, effect: TrapEffect);

    /// Undo a resetting trap mechanism's effect over its zone.
    fn reset_trap(&mut self, zone: &BlockBounds, effect: TrapEffect);

    fn clear_inventory(&mut self, player: PlayerId);

    fn give_item(&mut self, player: PlayerId, slot: u8, item: Item);

    fn set_invisible(&mut self, player: PlayerId, invisible: bool);

    /// Restore a player to full health.
    fn heal(&mut self, player: PlayerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_water_states_count_as_water() {
        assert!(Fluid::Water.is_water());
        assert!(Fluid::FlowingWater.is_water());
        assert!(!Fluid::Lava.is_water());
        assert!(!Fluid::Empty.is_water());
    }
}
