use crate::history::InteractionHistory;
use crate::model::UserId;

/// History-size tiers mapping to the collaborative blend weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceTiers {
    /// Histories shorter than this use `sparse_weight`.
    pub balanced_from: usize,
    /// Histories at least this long use `rich_weight`.
    pub rich_from: usize,
    pub sparse_weight: f64,
    pub balanced_weight: f64,
    pub rich_weight: f64,
}

impl Default for ConfidenceTiers {
    fn default() -> Self {
        Self {
            balanced_from: 5,
            rich_from: 20,
            sparse_weight: 0.3,
            balanced_weight: 0.5,
            rich_weight: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator {
    tiers: ConfidenceTiers,
}

impl ConfidenceEstimator {
    pub fn new(tiers: ConfidenceTiers) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &ConfidenceTiers {
        &self.tiers
    }

    pub fn for_history_size(&self, history_size: usize) -> f64 {
        if history_size < self.tiers.balanced_from {
            self.tiers.sparse_weight
        } else if history_size < self.tiers.rich_from {
            self.tiers.balanced_weight
        } else {
            self.tiers.rich_weight
        }
    }

    /// Weight for the collaborative signal; the content signal gets the rest.
    pub fn confidence(&self, history: &dyn InteractionHistory, user_id: UserId) -> f64 {
        self.for_history_size(history.history_size(user_id))
    }
}
