use rand::Rng;
use serde::{Deserialize, Serialize};

/// Integer block coordinate. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block a world-space point lies in.
    pub fn containing(point: Vec3) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
            z: point.z.floor() as i32,
        }
    }

    /// Center of the block's bottom face.
    pub fn center_bottom(self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<BlockPos> for [i32; 3] {
    fn from(pos: BlockPos) -> Self {
        [pos.x, pos.y, pos.z]
    }
}

/// World-space point or vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance_to(self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Inclusive box of blocks, as authored in map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBounds {
    pub min: BlockPos,
    pub max: BlockPos,
}

impl BlockBounds {
    /// Build bounds from two corners in any order.
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn single(pos: BlockPos) -> Self {
        Self { min: pos, max: pos }
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    pub fn intersects(&self, other: &BlockBounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center_bottom(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x + 1) as f64 / 2.0,
            self.min.y as f64,
            (self.min.z + self.max.z + 1) as f64 / 2.0,
        )
    }

    /// The world-space volume covered by these blocks.
    pub fn to_aabb(&self) -> Aabb {
        Aabb {
            min: Vec3::new(self.min.x as f64, self.min.y as f64, self.min.z as f64),
            max: Vec3::new(
                (self.max.x + 1) as f64,
                (self.max.y + 1) as f64,
                (self.max.z + 1) as f64,
            ),
        }
    }

    /// Every block position inside the bounds, x fastest.
    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        (self.min.y..=self.max.y).flat_map(move |y| {
            (self.min.z..=self.max.z)
                .flat_map(move |z| (self.min.x..=self.max.x).map(move |x| BlockPos::new(x, y, z)))
        })
    }

    /// Pick a standing point on the floor of the bounds: a random block
    /// column (the max edge excluded), centered, at the minimum height.
    pub fn random_column<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let x = self.min.x + random_offset(rng, self.max.x - self.min.x);
        let z = self.min.z + random_offset(rng, self.max.z - self.min.z);
        Vec3::new(x as f64 + 0.5, self.min.y as f64, z as f64 + 0.5)
    }
}

fn random_offset<R: Rng + ?Sized>(rng: &mut R, span: i32) -> i32 {
    if span <= 0 {
        0
    } else {
        rng.random_range(0..span)
    }
}

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box for a body standing at `feet`.
    pub fn from_feet(feet: Vec3, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self {
            min: Vec3::new(feet.x - half, feet.y, feet.z - half),
            max: Vec3::new(feet.x + half, feet.y + height, feet.z + half),
        }
    }

    /// Grow the box by `amount` on every side of every axis.
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: self.min.offset(-amount, -amount, -amount),
            max: self.max.offset(amount, amount, amount),
        }
    }

    /// Strict overlap: boxes that only touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn distance_between_points() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(a.distance_to(a), 0.0);
        assert_eq!(a.distance_to(Vec3::new(4.0, 2.0, 7.0)), 5.0);
    }

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = BlockPos::containing(Vec3::new(-0.2, 3.99, 7.0));
        assert_eq!(pos, BlockPos::new(-1, 3, 7));
    }

    #[test]
    fn bounds_are_inclusive_and_normalized() {
        let bounds = BlockBounds::new(BlockPos::new(4, 2, 4), BlockPos::new(0, 0, 0));
        assert_eq!(bounds.min, BlockPos::new(0, 0, 0));
        assert!(bounds.contains(BlockPos::new(4, 2, 4)));
        assert!(bounds.contains(BlockPos::new(0, 0, 0)));
        assert!(!bounds.contains(BlockPos::new(5, 0, 0)));
        assert_eq!(bounds.positions().count(), 5 * 3 * 5);
    }

    #[test]
    fn random_column_stays_inside_floor() {
        let bounds = BlockBounds::new(BlockPos::new(10, 64, -3), BlockPos::new(14, 66, 1));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let point = bounds.random_column(&mut rng);
            assert_eq!(point.y, 64.0);
            assert!(point.x >= 10.5 && point.x <= 13.5);
            assert!(point.z >= -2.5 && point.z <= 0.5);
        }
    }

    #[test]
    fn random_column_of_single_block_is_its_center() {
        let bounds = BlockBounds::single(BlockPos::new(3, 5, 9));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(bounds.random_column(&mut rng), Vec3::new(3.5, 5.0, 9.5));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::from_feet(Vec3::new(0.0, 0.0, 0.0), 1.0, 1.0);
        let b = Aabb::from_feet(Vec3::new(1.0, 0.0, 0.0), 1.0, 1.0);
        assert!(!a.intersects(&b));
        assert!(a.expand(0.1).intersects(&b));
    }
}
