/// Simulation ticks per wall-clock second.
pub const TICKS_PER_SECOND: u32 = 20;

/// Convert whole seconds to ticks.
pub const fn seconds(secs: u32) -> u32 {
    secs * TICKS_PER_SECOND
}

/// Split a tick count into whole minutes and the remaining seconds.
pub fn clock_parts(ticks: u32) -> (u32, u32) {
    let total_secs = ticks / TICKS_PER_SECOND;
    (total_secs / 60, total_secs % 60)
}

/// Render a tick count as `m:ss`.
pub fn format_clock(ticks: u32) -> String {
    let (min, sec) = clock_parts(ticks);
    format!("{min}:{sec:02}")
}
