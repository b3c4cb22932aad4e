use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use deathrun_core::player::PlayerId;

/// Label family used to announce a place. Only first and second place
/// endings get their own label; everything else shares the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrdinalLabel {
    St,
    Nd,
    Default,
}

impl OrdinalLabel {
    /// Places 11 to 19 always take the default label.
    pub fn for_place(place: usize) -> Self {
        if (11..=19).contains(&(place % 100)) {
            return OrdinalLabel::Default;
        }
        match place % 10 {
            1 => OrdinalLabel::St,
            2 => OrdinalLabel::Nd,
            _ => OrdinalLabel::Default,
        }
    }

    /// Client-side translation key; the place number is its argument.
    pub fn translation_key(self) -> &'static str {
        match self {
            OrdinalLabel::St => "insert.deathrun.xst_place",
            OrdinalLabel::Nd => "insert.deathrun.xnd_place",
            OrdinalLabel::Default => "insert.deathrun.xrd_place",
        }
    }
}

/// Text color of a place in the finish announcement.
pub fn place_color(place: usize) -> u32 {
    match place {
        1 => 0xEBA721,
        2 => 0xC3D8E8,
        3 => 0xB04C00,
        _ => 0x7A7FFF,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishRecord {
    pub player_id: PlayerId,
    pub elapsed_ticks: u32,
    pub place: usize,
}

/// Arrival-ordered finish list. Places are handed out on insertion and
/// never revisited.
#[derive(Debug, Clone, Default)]
pub struct FinishBoard {
    records: Vec<FinishRecord>,
    finished: HashSet<PlayerId>,
}

impl FinishBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finish. A player already on the board gets `None`.
    pub fn record(&mut self, player_id: PlayerId, elapsed_ticks: u32) -> Option<FinishRecord> {
        if !self.finished.insert(player_id) {
            return None;
        }
        let record = FinishRecord {
            player_id,
            elapsed_ticks,
            place: self.records.len() + 1,
        };
        self.records.push(record);
        Some(record)
    }

    pub fn records(&self) -> &[FinishRecord] {
        &self.records
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.finished.contains(&player_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
