use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use deathrun_core::world::TrapEffect;

/// Ticks between a reset firing and its control becoming usable again.
/// The reset countdown is always `control_cooldown - RESET_LEAD_TICKS`.
pub const RESET_LEAD_TICKS: u32 = 35;

/// The hazard behind a trap control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "effect", rename_all = "snake_case")]
pub enum TrapMechanism {
    /// Fires once and is never re-armed by the round.
    OneShot(TrapEffect),
    /// Fires, then undoes itself shortly before the control cools down.
    Resetting(TrapEffect),
}

impl TrapMechanism {
    pub fn effect(self) -> TrapEffect {
        match self {
            TrapMechanism::OneShot(effect) | TrapMechanism::Resetting(effect) => effect,
        }
    }

    pub fn resets(self) -> bool {
        matches!(self, TrapMechanism::Resetting(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapPhase {
    #[default]
    Armed,
    Triggered,
    /// A reset is counting down.
    Resetting,
}

/// A scheduled re-arm of a resetting trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCandidate {
    pub zone: usize,
    pub countdown: i32,
}

/// Pending resets, stored in index-stable slots.
///
/// Advancing never removes while iterating: every live candidate is ticked
/// first, and those that came due are compacted out afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResetQueue {
    slots: Vec<Option<ResetCandidate>>,
    live: BTreeSet<usize>,
    free: Vec<usize>,
}

impl ResetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reset for `zone`. Refused if that zone already has one.
    pub fn schedule(&mut self, zone: usize, countdown: i32) -> bool {
        if self.pending_for(zone).is_some() {
            return false;
        }
        let candidate = Some(ResetCandidate { zone, countdown });
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = candidate;
                slot
            },
            None => {
                self.slots.push(candidate);
                self.slots.len() - 1
            },
        };
        self.live.insert(slot);
        true
    }

    /// Tick every candidate once. `on_due` receives the zone of each
    /// candidate whose countdown reached zero, in slot order.
    pub fn advance(&mut self, mut on_due: impl FnMut(usize)) {
        let mut done = Vec::new();
        for &slot in &self.live {
            if let Some(candidate) = self.slots[slot].as_mut() {
                candidate.countdown -= 1;
                if candidate.countdown <= 0 {
                    on_due(candidate.zone);
                    done.push(slot);
                }
            }
        }
        for slot in done {
            self.live.remove(&slot);
            self.slots[slot] = None;
            self.free.push(slot);
        }
    }

    pub fn pending_for(&self, zone: usize) -> Option<&ResetCandidate> {
        self.live
            .iter()
            .filter_map(|&slot| self.slots[slot].as_ref())
            .find(|c| c.zone == zone)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Phase and control cooldown of every trap zone on the map, plus the
/// shared reset queue. Zones are addressed by their index in the map.
#[derive(Debug, Clone)]
pub struct TrapBoard {
    phases: Vec<TrapPhase>,
    control_cooldowns: Vec<u32>,
    cooldown_ticks: u32,
    resets: ResetQueue,
}

impl TrapBoard {
    pub fn new(zone_count: usize, cooldown_ticks: u32) -> Self {
        Self {
            phases: vec![TrapPhase::Armed; zone_count],
            control_cooldowns: vec![0; zone_count],
            cooldown_ticks,
            resets: ResetQueue::new(),
        }
    }

    pub fn control_ready(&self, zone: usize) -> bool {
        self.control_cooldowns.get(zone).is_some_and(|&c| c == 0)
    }

    pub fn phase(&self, zone: usize) -> Option<TrapPhase> {
        self.phases.get(zone).copied()
    }

    pub fn phases(&self) -> &[TrapPhase] {
        &self.phases
    }

    pub fn resets(&self) -> &ResetQueue {
        &self.resets
    }

    /// Countdown a freshly scheduled reset starts from.
    pub fn reset_countdown(&self) -> i32 {
        self.cooldown_ticks.saturating_sub(RESET_LEAD_TICKS) as i32
    }

    /// Fire the trap at `zone` if its control is ready and no reset is
    /// still pending for it. Returns whether it fired; the caller applies
    /// the world effect.
    pub fn trigger(&mut self, zone: usize, mechanism: TrapMechanism) -> bool {
        if !self.control_ready(zone) {
            return false;
        }
        if mechanism.resets() {
            let countdown = self.reset_countdown();
            if !self.resets.schedule(zone, countdown) {
                return false;
            }
        }
        self.control_cooldowns[zone] = self.cooldown_ticks;
        self.phases[zone] = TrapPhase::Triggered;
        true
    }

    /// Advance control cooldowns and pending resets by one tick. `on_due`
    /// runs for every zone whose reset fires this tick.
    pub fn tick(&mut self, mut on_due: impl FnMut(usize)) {
        for cooldown in &mut self.control_cooldowns {
            *cooldown = cooldown.saturating_sub(1);
        }

        let phases = &mut self.phases;
        self.resets.advance(|zone| {
            phases[zone] = TrapPhase::Armed;
            on_due(zone);
        });

        for (zone, phase) in self.phases.iter_mut().enumerate() {
            if *phase == TrapPhase::Triggered && self.resets.pending_for(zone).is_some() {
                *phase = TrapPhase::Resetting;
            }
        }
    }
}
