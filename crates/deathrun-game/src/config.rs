use serde::{Deserialize, Serialize};

use deathrun_core::time::seconds;

use crate::traps::RESET_LEAD_TICKS;

/// Countdown before the gate opens.
pub const COUNTDOWN_TICKS: u32 = seconds(10);
/// How long a trap control stays pressed after use.
pub const TRAP_CONTROL_COOLDOWN_TICKS: u32 = seconds(10);
/// Item cooldown of the runner boost.
pub const BOOST_COOLDOWN_TICKS: u32 = 150;
/// Fraction of the lobby that may become deaths, before the cap.
pub const DEATH_RATIO: f64 = 0.17;
/// Hard cap on the deaths team.
pub const MAX_DEATHS: usize = 3;

/// Tunable round rules, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathRunConfig {
    pub countdown_ticks: u32,
    pub trap_cooldown_ticks: u32,
    pub boost_cooldown_ticks: u32,
    pub death_ratio: f64,
    pub max_deaths: usize,
    /// Everyone runs; team requests are ignored.
    pub runners_only: bool,
}

impl Default for DeathRunConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: COUNTDOWN_TICKS,
            trap_cooldown_ticks: TRAP_CONTROL_COOLDOWN_TICKS,
            boost_cooldown_ticks: BOOST_COOLDOWN_TICKS,
            death_ratio: DEATH_RATIO,
            max_deaths: MAX_DEATHS,
            runners_only: false,
        }
    }
}

impl DeathRunConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("DEATHRUN_CONFIG")
            .unwrap_or_else(|_| "config/deathrun.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_or_default(&content, &path),
            Err(_) => DeathRunConfig::default(),
        }
    }

    fn from_toml_or_default(content: &str, origin: &str) -> Self {
        match toml::from_str::<DeathRunConfig>(content) {
            Ok(cfg) => cfg.checked(origin),
            Err(e) => {
                tracing::warn!("Failed to parse {origin}: {e}, using defaults");
                DeathRunConfig::default()
            },
        }
    }

    /// Replace values the round cannot run with by their defaults. The trap
    /// cooldown must exceed the reset lead.
    fn checked(mut self, origin: &str) -> Self {
        if self.trap_cooldown_ticks <= RESET_LEAD_TICKS {
            tracing::warn!(
                "{origin}: trap_cooldown_ticks {} must exceed {RESET_LEAD_TICKS}, using {TRAP_CONTROL_COOLDOWN_TICKS}",
                self.trap_cooldown_ticks
            );
            self.trap_cooldown_ticks = TRAP_CONTROL_COOLDOWN_TICKS;
        }
        self
    }

    /// Death slots for a lobby of `total` players.
    pub fn death_capacity(&self, total: usize) -> usize {
        if self.runners_only {
            return 0;
        }
        let by_ratio = (total as f64 * self.death_ratio).ceil() as usize;
        self.max_deaths.min(by_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ten_second_round_rules() {
        let cfg = DeathRunConfig::default();
        assert_eq!(cfg.countdown_ticks, 200);
        assert_eq!(cfg.trap_cooldown_ticks, 200);
        assert_eq!(cfg.boost_cooldown_ticks, 150);
        assert!(!cfg.runners_only);
    }

    #[test]
    fn death_capacity_is_ratio_capped_at_three() {
        let cfg = DeathRunConfig::default();
        assert_eq!(cfg.death_capacity(0), 0);
        assert_eq!(cfg.death_capacity(1), 1);
        assert_eq!(cfg.death_capacity(6), 2);
        assert_eq!(cfg.death_capacity(12), 3);
        assert_eq!(cfg.death_capacity(20), 3);
        assert_eq!(cfg.death_capacity(500), 3);
    }

    #[test]
    fn runners_only_has_no_death_slots() {
        let cfg = DeathRunConfig {
            runners_only: true,
            ..DeathRunConfig::default()
        };
        assert_eq!(cfg.death_capacity(20), 0);
    }

    #[test]
    fn parse_partial_toml() {
        let cfg: DeathRunConfig = toml::from_str("runners_only = true\nmax_deaths = 5\n").unwrap();
        assert!(cfg.runners_only);
        assert_eq!(cfg.max_deaths, 5);
        assert_eq!(cfg.countdown_ticks, 200);
    }

    #[test]
    fn trap_cooldown_within_reset_lead_falls_back() {
        for ticks in [0, 20, RESET_LEAD_TICKS] {
            let cfg = DeathRunConfig::from_toml_or_default(
                &format!("trap_cooldown_ticks = {ticks}\nmax_deaths = 2\n"),
                "test",
            );
            assert_eq!(cfg.trap_cooldown_ticks, TRAP_CONTROL_COOLDOWN_TICKS);
            assert_eq!(cfg.max_deaths, 2);
        }
        let cfg = DeathRunConfig::from_toml_or_default("trap_cooldown_ticks = 36", "test");
        assert_eq!(cfg.trap_cooldown_ticks, 36);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let cfg = DeathRunConfig::from_toml_or_default("countdown_ticks = \"soon\"", "test");
        assert_eq!(cfg, DeathRunConfig::default());
    }
}
