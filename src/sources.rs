//! Training-free candidate sources used by the command line front end.

use std::collections::{HashMap, HashSet};

use crate::candidates::CandidateSource;
use crate::history::InteractionLog;
use crate::model::{ItemId, ItemRecord, UserId};

/// Collaborative source: items touched by users who share items with the
/// query user, ranked by how many co-touching interactions point at them.
/// Items the query user already has are excluded.
#[derive(Debug, Clone, Default)]
pub struct CooccurrenceSource {
    user_items: HashMap<UserId, Vec<ItemId>>,
    item_users: HashMap<ItemId, Vec<UserId>>,
}

impl CooccurrenceSource {
    pub fn from_log(log: &InteractionLog) -> Self {
        let mut user_items = HashMap::<UserId, Vec<ItemId>>::new();
        let mut item_users = HashMap::<ItemId, Vec<UserId>>::new();

        for (user_id, items) in log.users() {
            let mut distinct = items.to_vec();
            distinct.sort_unstable();
            distinct.dedup();
            for item_id in &distinct {
                item_users.entry(*item_id).or_default().push(user_id);
            }
            user_items.insert(user_id, distinct);
        }

        for users in item_users.values_mut() {
            users.sort_unstable();
        }

        Self {
            user_items,
            item_users,
        }
    }
}

impl CandidateSource for CooccurrenceSource {
    fn recommend(&self, query_key: i64, count: usize) -> Vec<ItemId> {
        let Some(owned) = self.user_items.get(&query_key) else {
            return Vec::new();
        };
        let owned_set = owned.iter().copied().collect::<HashSet<_>>();

        let mut neighbours = HashMap::<UserId, usize>::new();
        for item_id in owned {
            for user_id in self.item_users.get(item_id).into_iter().flatten() {
                if *user_id != query_key {
                    *neighbours.entry(*user_id).or_insert(0) += 1;
                }
            }
        }

        let mut scores = HashMap::<ItemId, usize>::new();
        for (user_id, overlap) in neighbours {
            for item_id in self.user_items.get(&user_id).into_iter().flatten() {
                if !owned_set.contains(item_id) {
                    *scores.entry(*item_id).or_insert(0) += overlap;
                }
            }
        }

        let mut ranked = scores.into_iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(count).map(|(item_id, _)| item_id).collect()
    }
}

/// Content source: cosine similarity between item feature vectors.
/// The query item itself is never returned; unknown items yield nothing.
#[derive(Debug, Clone, Default)]
pub struct FeatureSimilaritySource {
    items: Vec<(ItemId, Vec<f32>)>,
}

impl FeatureSimilaritySource {
    pub fn new(records: &[ItemRecord]) -> Self {
        let mut items = records
            .iter()
            .map(|record| (record.item_id, unit_vector(&record.features)))
            .collect::<Vec<_>>();
        items.sort_by_key(|(item_id, _)| *item_id);
        items.dedup_by_key(|(item_id, _)| *item_id);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CandidateSource for FeatureSimilaritySource {
    fn recommend(&self, query_key: i64, count: usize) -> Vec<ItemId> {
        let Ok(position) = self
            .items
            .binary_search_by_key(&query_key, |(item_id, _)| *item_id)
        else {
            return Vec::new();
        };
        let query = &self.items[position].1;

        let mut ranked = self
            .items
            .iter()
            .filter(|(item_id, _)| *item_id != query_key)
            .map(|(item_id, features)| (*item_id, cosine_similarity(query, features)))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(count).map(|(item_id, _)| item_id).collect()
    }
}

/// Dot product of two unit vectors; 0.0 on length mismatch.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    if left.len() != right.len() || left.is_empty() {
        return 0.0;
    }

    left.iter()
        .zip(right.iter())
        .map(|(left_value, right_value)| f64::from(*left_value) * f64::from(*right_value))
        .sum::<f64>()
}

fn unit_vector(values: &[f32]) -> Vec<f32> {
    let norm = values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|value| (f64::from(*value) / norm) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Interaction;

    fn item(item_id: ItemId, features: &[f32]) -> ItemRecord {
        ItemRecord {
            item_id,
            kind: "deposit".to_string(),
            features: features.to_vec(),
        }
    }

    #[test]
    fn cooccurrence_ranks_items_of_overlapping_users() {
        let log = InteractionLog::from_interactions(&[
            Interaction::new(1, 10, 5),
            Interaction::new(1, 11, 4),
            Interaction::new(2, 10, 3),
            Interaction::new(2, 11, 3),
            Interaction::new(2, 12, 5),
            Interaction::new(3, 10, 2),
            Interaction::new(3, 13, 1),
            Interaction::new(4, 99, 1),
        ]);
        let source = CooccurrenceSource::from_log(&log);

        assert_eq!(source.recommend(1, 10), vec![12, 13]);
        assert_eq!(source.recommend(1, 1), vec![12]);
        assert!(source.recommend(4, 10).is_empty());
        assert!(source.recommend(77, 10).is_empty());
    }

    #[test]
    fn similarity_excludes_query_item_and_ranks_by_cosine() {
        let source = FeatureSimilaritySource::new(&[
            item(1, &[1.0, 0.0]),
            item(2, &[0.9, 0.1]),
            item(3, &[0.0, 1.0]),
            item(4, &[2.0, 0.0]),
        ]);

        assert_eq!(source.recommend(1, 3), vec![4, 2, 3]);
        assert_eq!(source.recommend(1, 1), vec![4]);
        assert!(source.recommend(42, 3).is_empty());
        assert_eq!(source.len(), 4);
    }

    #[test]
    fn cosine_similarity_rejects_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
