use serde::{Deserialize, Serialize};

/// Stable identifier for a player across the lobby and the round.
pub type PlayerId = u64;

/// A player offered to a Death Run game by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
