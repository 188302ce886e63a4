//! Per-turn correlation between typing placeholders and replies.
//!
//! Each turn gets a [`TurnId`] when its placeholder is created, and that id
//! is required to resolve it. Resolving an unknown or already-resolved id
//! is refused, so a late or duplicated reply can never remove someone
//! else's placeholder.

use std::collections::VecDeque;
use std::fmt;

use crate::transcript::EntryId;

/// Held thought lists beyond this are dropped, oldest first.
pub const MAX_UNCLAIMED_THOUGHTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

/// A turn whose reply has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub id: TurnId,
    pub placeholder: EntryId,
    pub thoughts: Option<Vec<String>>,
}

/// Open turns in the order they were started.
#[derive(Debug, Default)]
pub struct TurnTracker {
    next_id: u64,
    pending: VecDeque<PendingTurn>,
    // Thoughts that arrived while no turn was open; the next reply takes them.
    unclaimed_thoughts: VecDeque<Vec<String>>,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, placeholder: EntryId) -> TurnId {
        self.next_id += 1;
        let id = TurnId(self.next_id);
        self.pending.push_back(PendingTurn {
            id,
            placeholder,
            thoughts: None,
        });
        id
    }

    /// Queues thoughts on the oldest open turn that has none yet.
    ///
    /// Returns the turn that received them, or `None` when they were held
    /// for the next reply. Empty thought lists are dropped.
    pub fn queue_thoughts(&mut self, thoughts: Vec<String>) -> Option<TurnId> {
        if thoughts.is_empty() {
            return None;
        }
        if let Some(turn) = self.pending.iter_mut().find(|t| t.thoughts.is_none()) {
            turn.thoughts = Some(thoughts);
            return Some(turn.id);
        }
        if self.unclaimed_thoughts.len() == MAX_UNCLAIMED_THOUGHTS {
            self.unclaimed_thoughts.pop_front();
        }
        self.unclaimed_thoughts.push_back(thoughts);
        None
    }

    pub fn oldest(&self) -> Option<TurnId> {
        self.pending.front().map(|t| t.id)
    }

    /// Closes a turn. `None` if the id is unknown or already resolved.
    pub fn resolve(&mut self, id: TurnId) -> Option<PendingTurn> {
        let index = self.pending.iter().position(|t| t.id == id)?;
        self.pending.remove(index)
    }

    pub fn take_unclaimed_thoughts(&mut self) -> Option<Vec<String>> {
        self.unclaimed_thoughts.pop_front()
    }

    /// Closes every open turn and forgets held thoughts.
    ///
    /// Returns the closed turns, oldest first.
    pub fn drain(&mut self) -> Vec<PendingTurn> {
        self.unclaimed_thoughts.clear();
        self.pending.drain(..).collect()
    }

    pub fn unclaimed_len(&self) -> usize {
        self.unclaimed_thoughts.len()
    }

    pub fn is_pending(&self, id: TurnId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
