use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use deathrun_core::geometry::{BlockBounds, BlockPos};

use crate::participant::Team;
use crate::traps::TrapMechanism;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointZone {
    pub bounds: BlockBounds,
}

/// A trap: the button deaths press and the region it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapZone {
    pub control: BlockPos,
    pub zone: BlockBounds,
    pub mechanism: TrapMechanism,
}

/// Course layout, authored as TOML. Positions are `[x, y, z]` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRunMap {
    /// Where waiting players stand before the round.
    pub spawn: BlockBounds,
    pub runner_start: BlockBounds,
    pub death_start: BlockBounds,
    /// In course order.
    #[serde(default)]
    pub checkpoints: Vec<CheckpointZone>,
    pub finish: BlockBounds,
    /// Iron bars holding runners back until the countdown ends.
    #[serde(default)]
    pub gate: Vec<BlockPos>,
    #[serde(default)]
    pub trap_zones: Vec<TrapZone>,
}

#[derive(Debug)]
pub enum MapError {
    Io(String),
    Parse(String),
    DuplicateTrapControl(BlockPos),
    FinishOverlapsStart,
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read map: {e}"),
            Self::Parse(e) => write!(f, "failed to parse map: {e}"),
            Self::DuplicateTrapControl(pos) => write!(
                f,
                "trap control at [{}, {}, {}] is used by more than one trap",
                pos.x, pos.y, pos.z
            ),
            Self::FinishOverlapsStart => write!(f, "finish region overlaps the runner start"),
        }
    }
}

impl std::error::Error for MapError {}

impl DeathRunMap {
    /// Parse and validate a map.
    pub fn from_toml(content: &str) -> Result<Self, MapError> {
        let map: DeathRunMap =
            toml::from_str(content).map_err(|e| MapError::Parse(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| MapError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), MapError> {
        let mut seen = HashSet::with_capacity(self.trap_zones.len());
        for trap in &self.trap_zones {
            if !seen.insert(trap.control) {
                return Err(MapError::DuplicateTrapControl(trap.control));
            }
        }
        if self.finish.intersects(&self.runner_start) {
            return Err(MapError::FinishOverlapsStart);
        }
        Ok(())
    }

    /// Trap index by control position.
    pub fn control_index(&self) -> HashMap<BlockPos, usize> {
        self.trap_zones
            .iter()
            .enumerate()
            .map(|(i, trap)| (trap.control, i))
            .collect()
    }

    pub fn team_start(&self, team: Team) -> &BlockBounds {
        match team {
            Team::Runners => &self.runner_start,
            Team::Deaths => &self.death_start,
        }
    }
}

/// Small straight course used across the crate's tests.
///
/// Runners start south of a gate at z = 0 and run north: checkpoint 0 at
/// z 8..=12, a vanishing floor at z 14..=18, checkpoint 1 at z 20..=24,
/// a lightning trap at z 26..=30, finish at z 40..=44.
#[cfg(test)]
pub(crate) fn test_map() -> DeathRunMap {
    use deathrun_core::test_helpers::bounds;
    use deathrun_core::world::TrapEffect;

    DeathRunMap {
        spawn: bounds([-2, 1, -12], [2, 1, -8]),
        runner_start: bounds([-2, 1, -4], [2, 1, -1]),
        death_start: bounds([5, 5, -4], [7, 5, -2]),
        checkpoints: vec![
            CheckpointZone {
                bounds: bounds([-3, 0, 8], [3, 4, 12]),
            },
            CheckpointZone {
                bounds: bounds([-3, 0, 20], [3, 4, 24]),
            },
        ],
        finish: bounds([-3, 0, 40], [3, 4, 44]),
        gate: (-2..=2)
            .flat_map(|x| [BlockPos::new(x, 1, 0), BlockPos::new(x, 2, 0)])
            .collect(),
        trap_zones: vec![
            TrapZone {
                control: BlockPos::new(6, 6, 5),
                zone: bounds([-3, 0, 14], [3, 0, 18]),
                mechanism: TrapMechanism::Resetting(TrapEffect::VanishingFloor),
            },
            TrapZone {
                control: BlockPos::new(6, 6, 25),
                zone: bounds([-3, 1, 26], [3, 3, 30]),
                mechanism: TrapMechanism::OneShot(TrapEffect::Lightning),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use deathrun_core::world::TrapEffect;

    use super::*;

    const MAP_TOML: &str = r#"
spawn = { min = [-2, 1, -12], max = [2, 1, -8] }
runner_start = { min = [-2, 1, -4], max = [2, 1, -1] }
death_start = { min = [5, 5, -4], max = [7, 5, -2] }
finish = { min = [-3, 0, 40], max = [3, 4, 44] }
gate = [[0, 1, 0], [0, 2, 0]]

[[checkpoints]]
bounds = { min = [-3, 0, 8], max = [3, 4, 12] }

[[trap_zones]]
control = [6, 6, 5]
zone = { min = [-3, 0, 14], max = [3, 0, 18] }
mechanism = { kind = "resetting", effect = "vanishing_floor" }

[[trap_zones]]
control = [6, 6, 25]
zone = { min = [-3, 1, 26], max = [3, 3, 30] }
mechanism = { kind = "one_shot", effect = "lightning" }
"#;

    #[test]
    fn parses_authored_map() {
        let map = DeathRunMap::from_toml(MAP_TOML).unwrap();
        assert_eq!(map.gate, vec![BlockPos::new(0, 1, 0), BlockPos::new(0, 2, 0)]);
        assert_eq!(map.checkpoints.len(), 1);
        assert_eq!(
            map.trap_zones[0].mechanism,
            TrapMechanism::Resetting(TrapEffect::VanishingFloor)
        );
        assert_eq!(
            map.trap_zones[1].mechanism,
            TrapMechanism::OneShot(TrapEffect::Lightning)
        );
        assert_eq!(map.control_index().get(&BlockPos::new(6, 6, 25)), Some(&1));
    }

    #[test]
    fn positions_serialize_as_arrays() {
        let text = toml::to_string(&test_map()).unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        let control = value["trap_zones"][0]["control"].as_array().unwrap();
        assert_eq!(control.len(), 3);
        assert_eq!(control[2].as_integer(), Some(5));
        let back: DeathRunMap = toml::from_str(&text).unwrap();
        assert_eq!(back, test_map());
    }

    #[test]
    fn duplicate_controls_are_rejected() {
        let mut map = test_map();
        map.trap_zones[1].control = map.trap_zones[0].control;
        assert!(matches!(
            map.validate(),
            Err(MapError::DuplicateTrapControl(pos)) if pos == BlockPos::new(6, 6, 5)
        ));
    }

    #[test]
    fn finish_on_start_is_rejected() {
        let mut map = test_map();
        map.finish = map.runner_start;
        assert!(matches!(map.validate(), Err(MapError::FinishOverlapsStart)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = DeathRunMap::from_toml("spawn = 3").unwrap_err();
        assert!(matches!(err, MapError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse map"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DeathRunMap::load("/nonexistent/deathrun/map.toml").unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }

    #[test]
    fn test_map_is_valid() {
        assert!(test_map().validate().is_ok());
    }
}
