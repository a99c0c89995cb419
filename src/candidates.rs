//! Candidate retrieval from the two recommendation signals.

use std::collections::{HashMap, HashSet};

use crate::history::InteractionHistory;
use crate::model::{ItemId, UserId};

/// A model that ranks items for a query key (a user id for collaborative
/// models, an item id for content models), best first.
///
/// Implementations may return fewer than `count` items and must not repeat
/// an id within one call.
pub trait CandidateSource: Send + Sync {
    fn recommend(&self, query_key: i64, count: usize) -> Vec<ItemId>;
}

/// Collaborative candidates for a user, oversampled so enough material
/// survives fusion.
pub fn collaborative_candidates(
    source: &dyn CandidateSource,
    user_id: UserId,
    n_items: usize,
    oversample: usize,
) -> Vec<ItemId> {
    let count = n_items.saturating_mul(oversample);
    let items = source.recommend(user_id, count);
    let mut seen = HashSet::<ItemId>::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item_id| seen.insert(*item_id))
        .take(count)
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ContentQuery {
    pub seed_limit: usize,
    pub per_seed: usize,
    pub pool: usize,
}

/// Content candidates seeded from the user's recent items.
///
/// Every seed asks for `n_items * per_seed` similar items. The merged pool is
/// ranked by how many seeds recommended each item, ties by first-seen order,
/// and cut to `n_items * pool`. Users without history get nothing.
pub fn content_candidates(
    source: &dyn CandidateSource,
    history: &dyn InteractionHistory,
    user_id: UserId,
    n_items: usize,
    query: ContentQuery,
) -> Vec<ItemId> {
    let seeds = history.recent_items(user_id, query.seed_limit);
    if seeds.is_empty() {
        return Vec::new();
    }

    let per_seed = n_items.saturating_mul(query.per_seed);
    let mut first_seen = Vec::<ItemId>::new();
    let mut counts = HashMap::<ItemId, usize>::new();
    for seed in seeds {
        for item_id in source.recommend(seed, per_seed) {
            let count = counts.entry(item_id).or_insert(0);
            if *count == 0 {
                first_seen.push(item_id);
            }
            *count += 1;
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    first_seen.sort_by_key(|item_id| std::cmp::Reverse(counts[item_id]));
    first_seen.truncate(n_items.saturating_mul(query.pool));
    first_seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::InteractionLog;
    use crate::model::Interaction;

    struct FixedSource(HashMap<i64, Vec<ItemId>>);

    impl CandidateSource for FixedSource {
        fn recommend(&self, query_key: i64, count: usize) -> Vec<ItemId> {
            self.0
                .get(&query_key)
                .map(|items| items.iter().copied().take(count).collect())
                .unwrap_or_default()
        }
    }

    const QUERY: ContentQuery = ContentQuery {
        seed_limit: 5,
        per_seed: 2,
        pool: 3,
    };

    #[test]
    fn collaborative_requests_oversampled_count() {
        let source = FixedSource(HashMap::from([(1, (100..200).collect())]));
        let items = collaborative_candidates(&source, 1, 4, 3);
        assert_eq!(items.len(), 12);
        assert_eq!(items[0], 100);
        assert!(collaborative_candidates(&source, 2, 4, 3).is_empty());
    }

    #[test]
    fn collaborative_count_saturates_without_reserving_it() {
        let source = FixedSource(HashMap::from([(1, vec![3, 1, 3, 2])]));
        assert_eq!(collaborative_candidates(&source, 1, usize::MAX, 3), vec![3, 1, 2]);
    }

    #[test]
    fn content_pool_ranks_by_frequency_then_first_seen() {
        // Seeds, newest first: 3, 2, 1.
        let log = InteractionLog::from_interactions(&[
            Interaction::new(7, 1, 5),
            Interaction::new(7, 2, 5),
            Interaction::new(7, 3, 5),
        ]);
        let source = FixedSource(HashMap::from([
            (3, vec![30, 40]),
            (2, vec![50, 40]),
            (1, vec![60, 50]),
        ]));

        let items = content_candidates(&source, &log, 7, 2, QUERY);
        assert_eq!(items, vec![40, 50, 30, 60]);
    }

    #[test]
    fn content_pool_is_truncated_after_ranking() {
        let log = InteractionLog::from_interactions(&[
            Interaction::new(7, 1, 5),
            Interaction::new(7, 2, 5),
        ]);
        let source = FixedSource(HashMap::from([
            (2, vec![11, 12, 13, 14]),
            (1, vec![21, 22, 23, 14]),
        ]));

        let items = content_candidates(&source, &log, 7, 2, QUERY);
        assert_eq!(items, vec![14, 11, 12, 13, 21, 22]);
    }

    #[test]
    fn content_is_empty_without_history() {
        let log = InteractionLog::default();
        let source = FixedSource(HashMap::from([(1, vec![2, 3])]));
        assert!(content_candidates(&source, &log, 7, 5, QUERY).is_empty());
    }

    #[test]
    fn content_uses_at_most_seed_limit_seeds() {
        let records = (1..=7)
            .map(|item| Interaction::new(9, item, 3))
            .collect::<Vec<_>>();
        let log = InteractionLog::from_interactions(&records);
        let source = FixedSource((1..=7).map(|seed| (seed, vec![seed * 100])).collect());

        let items = content_candidates(&source, &log, 9, 10, QUERY);
        assert_eq!(items, vec![700, 600, 500, 400, 300]);
    }
}
