use std::collections::HashMap;

use crate::model::{Interaction, ItemId};

/// Normalized item popularity, built once and read-only afterwards.
///
/// Scores are the accumulated weight per item divided by the largest
/// accumulated weight, so the most popular item scores exactly 1.0.
#[derive(Debug, Clone, Default)]
pub struct PopularityIndex {
    scores: HashMap<ItemId, f64>,
    ranked: Vec<(ItemId, f64)>,
}

impl PopularityIndex {
    /// Builds the table from `(item_id, weight)` pairs. Negative and
    /// non-finite weights count as zero.
    pub fn build<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (ItemId, f64)>,
    {
        let mut totals = HashMap::<ItemId, f64>::new();
        for (item_id, weight) in weights {
            let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
            *totals.entry(item_id).or_insert(0.0) += weight;
        }

        let max_total = totals.values().copied().fold(0.0_f64, f64::max);
        let scores = totals
            .into_iter()
            .map(|(item_id, total)| {
                let score = if max_total > 0.0 {
                    (total / max_total).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (item_id, score)
            })
            .collect::<HashMap<_, _>>();

        let mut ranked = scores
            .iter()
            .map(|(item_id, score)| (*item_id, *score))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Self { scores, ranked }
    }

    /// Interaction counts, one unit of weight per record.
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        Self::build(
            interactions
                .iter()
                .map(|interaction| (interaction.item_id, 1.0)),
        )
    }

    pub fn get(&self, item_id: ItemId) -> Option<f64> {
        self.scores.get(&item_id).copied()
    }

    pub fn score_or(&self, item_id: ItemId, default: f64) -> f64 {
        self.get(item_id).unwrap_or(default)
    }

    /// Items by descending popularity, ties by ascending item id.
    pub fn ranked(&self) -> &[(ItemId, f64)] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}
