use std::collections::HashMap;

use deathrun_core::player::PlayerId;

use crate::participant::Participant;

/// Participants keyed by player, iterated in insertion order.
///
/// Insertion order keeps iteration stable between runs, which is what makes
/// seeded team shuffles reproducible.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<PlayerId, Participant>,
    order: Vec<PlayerId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn add(&mut self, participant: Participant) {
        let id = participant.id();
        if self.entries.insert(id, participant).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a participant. Absent ids are a no-op.
    pub fn remove(&mut self, id: PlayerId) -> Option<Participant> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            self.order.retain(|&other| other != id);
        }
        removed
    }

    pub fn get(&self, id: PlayerId) -> Option<&Participant> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Participant> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Participant> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Snapshot of the ids, for loops that mutate the registry as they go.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Empty the registry, yielding entries in insertion order.
    pub fn drain(&mut self) -> Vec<Participant> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}
