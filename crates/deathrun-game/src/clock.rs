use serde::{Deserialize, Serialize};

use deathrun_core::time::TICKS_PER_SECOND;

/// Seconds left at which the countdown switches to its final cue.
pub const FINAL_STRETCH_SECONDS: u32 = 3;

/// What the clock asks the controller to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    Idle,
    Countdown { seconds: u32, final_stretch: bool },
    /// The countdown just hit zero. Fires exactly once.
    Go,
}

/// Pre-round countdown. Runs down once and then stays at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundClock {
    ticks_remaining: u32,
}

impl RoundClock {
    /// A clock of at least one tick, so the start sequence always fires.
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks_remaining: ticks.max(1),
        }
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    pub fn is_running(&self) -> bool {
        self.ticks_remaining > 0
    }

    pub fn tick(&mut self) -> ClockSignal {
        if self.ticks_remaining == 0 {
            return ClockSignal::Idle;
        }

        let signal = if self.ticks_remaining % TICKS_PER_SECOND == 0 {
            let seconds = self.ticks_remaining / TICKS_PER_SECOND;
            ClockSignal::Countdown {
                seconds,
                final_stretch: seconds <= FINAL_STRETCH_SECONDS,
            }
        } else {
            ClockSignal::Idle
        };

        self.ticks_remaining -= 1;
        if self.ticks_remaining == 0 {
            ClockSignal::Go
        } else {
            signal
        }
    }
}
