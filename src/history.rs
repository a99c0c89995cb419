use std::collections::{HashMap, HashSet};

use crate::model::{Interaction, ItemId, UserId};

/// Read access to past user-item interactions.
pub trait InteractionHistory: Send + Sync {
    /// Number of recorded interactions for `user_id`; 0 for unknown users.
    fn history_size(&self, user_id: UserId) -> usize;

    /// Distinct items the user touched, most recent first, at most `limit`.
    fn recent_items(&self, user_id: UserId, limit: usize) -> Vec<ItemId>;
}

/// In-memory history keyed by user, preserving chronological order.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    by_user: HashMap<UserId, Vec<ItemId>>,
}

impl InteractionLog {
    /// `interactions` must be ordered oldest first.
    pub fn from_interactions<'a, I>(interactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Interaction>,
    {
        let mut by_user = HashMap::<UserId, Vec<ItemId>>::new();
        for interaction in interactions {
            by_user
                .entry(interaction.user_id)
                .or_default()
                .push(interaction.item_id);
        }
        Self { by_user }
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn items_for(&self, user_id: UserId) -> &[ItemId] {
        self.by_user
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn users(&self) -> impl Iterator<Item = (UserId, &[ItemId])> {
        self.by_user
            .iter()
            .map(|(user_id, items)| (*user_id, items.as_slice()))
    }
}

impl InteractionHistory for InteractionLog {
    fn history_size(&self, user_id: UserId) -> usize {
        self.items_for(user_id).len()
    }

    fn recent_items(&self, user_id: UserId, limit: usize) -> Vec<ItemId> {
        let mut seen = HashSet::<ItemId>::new();
        self.items_for(user_id)
            .iter()
            .rev()
            .copied()
            .filter(|item_id| seen.insert(*item_id))
            .take(limit)
            .collect()
    }
}
