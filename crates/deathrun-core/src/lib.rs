pub mod geometry;
pub mod memory_world;
pub mod player;
pub mod time;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::geometry::{BlockBounds, BlockPos, Vec3};
    use crate::memory_world::MemoryWorld;
    use crate::player::{Player, PlayerId};

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(i as PlayerId + 1, format!("Player{}", i + 1)))
            .collect()
    }

    /// A world with a body for every player, all standing at `at`.
    pub fn world_with_players(players: &[Player], at: Vec3) -> MemoryWorld {
        let mut world = MemoryWorld::new();
        for player in players {
            world.spawn_player(player.id, at);
        }
        world
    }

    /// Shorthand for an inclusive box from two corner triples.
    pub fn bounds(a: [i32; 3], b: [i32; 3]) -> BlockBounds {
        BlockBounds::new(BlockPos::from(a), BlockPos::from(b))
    }
}
