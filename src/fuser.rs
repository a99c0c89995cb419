//! Reciprocal-rank fusion of the collaborative and content candidate lists.
//!
//! Each list contributes `1 / (rank + 1)` per item, weighted by `alpha` for
//! the collaborative list and `1 - alpha` for the content list. Contributions
//! are summed, so an item endorsed by both lists outranks one endorsed by a
//! single list at a similar position.

use std::collections::HashMap;

use crate::model::{ItemId, Provenance};
use crate::popularity::PopularityIndex;

/// Scores closer than this are ranked as ties.
const SCORE_TIE_EPSILON: f64 = 1e-9;

/// The popularity multiplier spans `[0.8, 1.0]`.
const POPULARITY_FLOOR: f64 = 0.8;
const POPULARITY_SPAN: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub item_id: ItemId,
    pub score: f64,
    pub collaborative_rank: Option<usize>,
    pub content_rank: Option<usize>,
}

impl FusedCandidate {
    fn seed(item_id: ItemId) -> Self {
        Self {
            item_id,
            score: 0.0,
            collaborative_rank: None,
            content_rank: None,
        }
    }

    pub fn provenance(&self) -> Provenance {
        match (self.collaborative_rank, self.content_rank) {
            (Some(_), Some(_)) => Provenance::Both,
            (None, Some(_)) => Provenance::Content,
            _ => Provenance::Collaborative,
        }
    }
}

/// Positional score for a 0-indexed rank.
pub fn reciprocal_rank(rank: usize) -> f64 {
    1.0 / (rank as f64 + 1.0)
}

/// Multiplier applied to fused scores when popularity adjustment is on.
pub fn popularity_multiplier(popularity: f64) -> f64 {
    POPULARITY_FLOOR + POPULARITY_SPAN * popularity
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreFuser<'a> {
    popularity: Option<&'a PopularityIndex>,
    missing_popularity: f64,
}

impl<'a> ScoreFuser<'a> {
    pub fn new() -> Self {
        Self {
            popularity: None,
            missing_popularity: crate::config::DEFAULT_MISSING_POPULARITY,
        }
    }

    /// Enables the popularity nudge; items absent from `index` use
    /// `missing_popularity`.
    #[must_use]
    pub fn with_popularity(mut self, index: &'a PopularityIndex, missing_popularity: f64) -> Self {
        self.popularity = Some(index);
        self.missing_popularity = missing_popularity;
        self
    }

    /// Fuses both lists into a ranking, best first.
    ///
    /// Ties keep first-insertion order: collaborative items are inserted
    /// before content-only items. A repeated id within one list keeps its
    /// best rank.
    pub fn fuse(&self, collaborative: &[ItemId], content: &[ItemId], alpha: f64) -> Vec<FusedCandidate> {
        let mut merged = Vec::<FusedCandidate>::with_capacity(collaborative.len() + content.len());
        let mut slots = HashMap::<ItemId, usize>::with_capacity(merged.capacity());

        for (rank, item_id) in collaborative.iter().enumerate() {
            let entry = entry_for(&mut merged, &mut slots, *item_id);
            if entry.collaborative_rank.is_some() {
                continue;
            }
            entry.score += alpha * reciprocal_rank(rank);
            entry.collaborative_rank = Some(rank);
        }

        for (rank, item_id) in content.iter().enumerate() {
            let entry = entry_for(&mut merged, &mut slots, *item_id);
            if entry.content_rank.is_some() {
                continue;
            }
            entry.score += (1.0 - alpha) * reciprocal_rank(rank);
            entry.content_rank = Some(rank);
        }

        if let Some(index) = self.popularity {
            for entry in &mut merged {
                let popularity = index.score_or(entry.item_id, self.missing_popularity);
                entry.score *= popularity_multiplier(popularity);
            }
        }

        merged.sort_by_key(|entry| std::cmp::Reverse(tie_key(entry.score)));
        merged
    }
}

impl Default for ScoreFuser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_for<'m>(
    merged: &'m mut Vec<FusedCandidate>,
    slots: &mut HashMap<ItemId, usize>,
    item_id: ItemId,
) -> &'m mut FusedCandidate {
    let slot = *slots.entry(item_id).or_insert_with(|| {
        merged.push(FusedCandidate::seed(item_id));
        merged.len() - 1
    });
    &mut merged[slot]
}

// Quantized so that sort_by_key sees a total order and equal-within-epsilon
// scores fall back to the stable insertion order.
fn tie_key(score: f64) -> i64 {
    (score / SCORE_TIE_EPSILON).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(fused: &[FusedCandidate]) -> Vec<ItemId> {
        fused.iter().map(|entry| entry.item_id).collect()
    }

    #[test]
    fn reciprocal_rank_decreases_with_rank() {
        assert_eq!(reciprocal_rank(0), 1.0);
        assert_eq!(reciprocal_rank(1), 0.5);
        assert!(reciprocal_rank(2) > reciprocal_rank(3));
    }

    #[test]
    fn fuse_sums_contributions_from_both_lists() {
        let fused = ScoreFuser::new().fuse(&[10, 20, 30], &[20, 40], 0.6);

        assert_eq!(ids(&fused), vec![20, 10, 30, 40]);
        assert!((fused[0].score - 0.7).abs() < 1e-12);
        assert!((fused[1].score - 0.6).abs() < 1e-12);
        assert!((fused[2].score - 0.2).abs() < 1e-12);
        assert!((fused[3].score - 0.2).abs() < 1e-12);
        assert_eq!(fused[0].provenance(), Provenance::Both);
        assert_eq!(fused[0].collaborative_rank, Some(1));
        assert_eq!(fused[0].content_rank, Some(0));
        assert_eq!(fused[3].provenance(), Provenance::Content);
    }

    #[test]
    fn exact_ties_favor_collaborative_insertion() {
        let fused = ScoreFuser::new().fuse(&[1], &[2], 0.5);
        assert_eq!(ids(&fused), vec![1, 2]);
    }

    #[test]
    fn alpha_extremes_silence_one_source() {
        let fused = ScoreFuser::new().fuse(&[1, 2], &[3], 1.0);
        assert_eq!(fused.iter().find(|entry| entry.item_id == 3).map(|e| e.score), Some(0.0));

        let fused = ScoreFuser::new().fuse(&[1, 2], &[3], 0.0);
        assert_eq!(fused[0].item_id, 3);
    }

    #[test]
    fn popularity_nudges_within_twenty_percent() {
        let index = PopularityIndex::build([(1, 1.0), (2, 10.0)]);
        let fused = ScoreFuser::new()
            .with_popularity(&index, 0.1)
            .fuse(&[1, 2, 3], &[], 1.0);

        let score = |item| {
            fused
                .iter()
                .find(|entry| entry.item_id == item)
                .map(|entry| entry.score)
                .unwrap_or_default()
        };
        assert!((score(1) - 1.0 * (0.8 + 0.2 * 0.1)).abs() < 1e-12);
        assert!((score(2) - 0.5).abs() < 1e-12);
        assert!((score(3) - (1.0 / 3.0) * (0.8 + 0.2 * 0.1)).abs() < 1e-12);
        assert_eq!(ids(&fused), vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_ids_keep_best_rank() {
        let fused = ScoreFuser::new().fuse(&[5, 5, 6], &[], 1.0);
        assert_eq!(ids(&fused), vec![5, 6]);
        assert_eq!(fused[0].score, 1.0);
        assert!((fused[1].score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_fuse_to_nothing() {
        assert!(ScoreFuser::new().fuse(&[], &[], 0.3).is_empty());
    }
}
