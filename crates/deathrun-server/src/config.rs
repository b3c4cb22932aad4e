use serde::Deserialize;

use deathrun_core::time::TICKS_PER_SECOND;

/// Host configuration, loaded from `deathrun-server.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub tick_rate_hz: u32,
    pub map_path: String,
    /// Fixed seed for team shuffles and spawn points. Random when unset.
    pub seed: Option<u64>,
    pub simulation: SimulationConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICKS_PER_SECOND,
            map_path: "config/map.toml".to_string(),
            seed: None,
            simulation: SimulationConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Simulated lobby seated by the headless host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub players: usize,
    /// How many of the simulated players ask to be deaths.
    pub death_requests: usize,
    /// Blocks per tick a simulated runner covers.
    pub runner_speed: f64,
    /// Per-tick chance that a simulated death presses a trap control.
    pub trap_chance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 12,
            death_requests: 2,
            runner_speed: 0.28,
            trap_chance: 0.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Hard stop for rounds that never resolve.
    pub max_ticks: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ticks: u64::from(TICKS_PER_SECOND) * 60 * 5,
        }
    }
}

impl ServerConfig {
    /// Validate configuration. Unusable values are fatal.
    pub fn validate(&self) {
        if let Err(msg) = self.check() {
            tracing::error!("{msg}");
            std::process::exit(1);
        }
        if self.simulation.death_requests > self.simulation.players {
            tracing::warn!(
                death_requests = self.simulation.death_requests,
                players = self.simulation.players,
                "more death requests than simulated players"
            );
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 {
            return Err("tick_rate_hz must be > 0".to_string());
        }
        if self.limits.max_ticks == 0 {
            return Err("limits.max_ticks must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.simulation.trap_chance) {
            return Err("simulation.trap_chance must be within 0..=1".to_string());
        }
        if self.simulation.runner_speed <= 0.0 {
            return Err("simulation.runner_speed must be > 0".to_string());
        }
        Ok(())
    }

    /// Load config from `deathrun-server.toml` if it exists, then apply env
    /// var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("deathrun-server.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from deathrun-server.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse deathrun-server.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No deathrun-server.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(path) = std::env::var("DEATHRUN_MAP")
            && !path.is_empty()
        {
            config.map_path = path;
        }
        if let Ok(val) = std::env::var("DEATHRUN_TICK_RATE")
            && let Ok(n) = val.parse::<u32>()
        {
            config.tick_rate_hz = n;
        }
        if let Ok(val) = std::env::var("DEATHRUN_SEED")
            && let Ok(n) = val.parse::<u64>()
        {
            config.seed = Some(n);
        }
        if let Ok(val) = std::env::var("DEATHRUN_PLAYERS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.simulation.players = n;
        }
        if let Ok(val) = std::env::var("DEATHRUN_MAX_TICKS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.limits.max_ticks = n;
        }

        config
    }
}
