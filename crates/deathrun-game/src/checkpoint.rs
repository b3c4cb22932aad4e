use deathrun_core::geometry::BlockPos;

use crate::map::DeathRunMap;

/// Where a runner's block position puts them this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointOutcome {
    /// Inside the finish region. Checkpoints are not looked at.
    Finish,
    /// Entered a checkpoint other than the one on record.
    Entered(usize),
    /// Still inside the recorded checkpoint.
    Unchanged,
    /// Not inside any checkpoint.
    Outside,
}

pub fn track(previous: Option<usize>, pos: BlockPos, map: &DeathRunMap) -> CheckpointOutcome {
    if map.finish.contains(pos) {
        return CheckpointOutcome::Finish;
    }
    match map.checkpoints.iter().position(|cp| cp.bounds.contains(pos)) {
        Some(index) if previous == Some(index) => CheckpointOutcome::Unchanged,
        Some(index) => CheckpointOutcome::Entered(index),
        None => CheckpointOutcome::Outside,
    }
}

#[cfg(test)]
mod tests {
    use deathrun_core::test_helpers::bounds;

    use super::*;
    use crate::map::{CheckpointZone, test_map};

    #[test]
    fn entering_reports_once() {
        let map = test_map();
        let inside = BlockPos::new(0, 1, 10);
        let first = track(None, inside, &map);
        assert_eq!(first, CheckpointOutcome::Entered(0));
        assert_eq!(track(Some(0), inside, &map), CheckpointOutcome::Unchanged);
    }

    #[test]
    fn leaving_keeps_the_recorded_checkpoint() {
        let map = test_map();
        assert_eq!(
            track(Some(0), BlockPos::new(0, 1, 15), &map),
            CheckpointOutcome::Outside
        );
    }

    #[test]
    fn finish_takes_precedence() {
        let mut map = test_map();
        map.checkpoints.push(CheckpointZone {
            bounds: map.finish,
        });
        let pos = map.finish.min;
        assert_eq!(track(Some(0), pos, &map), CheckpointOutcome::Finish);
    }

    #[test]
    fn first_registered_zone_wins_on_overlap() {
        let mut map = test_map();
        map.checkpoints = vec![
            CheckpointZone {
                bounds: bounds([-2, 0, 0], [2, 3, 4]),
            },
            CheckpointZone {
                bounds: bounds([-2, 0, 2], [2, 3, 6]),
            },
        ];
        assert_eq!(
            track(None, BlockPos::new(0, 1, 3), &map),
            CheckpointOutcome::Entered(0)
        );
        assert_eq!(
            track(Some(0), BlockPos::new(0, 1, 5), &map),
            CheckpointOutcome::Entered(1)
        );
    }
}
