use std::collections::HashSet;

use crate::model::ItemId;
use crate::popularity::PopularityIndex;

/// Popular items, with their popularity, that would pad `current` up to
/// `target_count`. Items already present are skipped.
pub fn popular_fill(
    current: &[ItemId],
    target_count: usize,
    popularity: &PopularityIndex,
) -> Vec<(ItemId, f64)> {
    let needed = target_count.saturating_sub(current.len());
    if needed == 0 {
        return Vec::new();
    }

    let present = current.iter().copied().collect::<HashSet<_>>();
    popularity
        .ranked()
        .iter()
        .filter(|(item_id, _)| !present.contains(item_id))
        .take(needed)
        .copied()
        .collect()
}

/// Extends `current` with popular items until it holds `target_count`
/// entries or the popularity pool runs out. Never adds unknown ids.
pub fn backfill(current: &[ItemId], target_count: usize, popularity: &PopularityIndex) -> Vec<ItemId> {
    let mut out = current.to_vec();
    out.extend(
        popular_fill(current, target_count, popularity)
            .into_iter()
            .map(|(item_id, _)| item_id),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PopularityIndex {
        PopularityIndex::build([(1, 5.0), (2, 4.0), (3, 3.0), (4, 2.0)])
    }

    #[test]
    fn backfill_appends_most_popular_missing_items() {
        assert_eq!(backfill(&[2, 9], 4, &index()), vec![2, 9, 1, 3]);
    }

    #[test]
    fn backfill_leaves_full_lists_untouched() {
        assert_eq!(backfill(&[9, 8], 2, &index()), vec![9, 8]);
        assert_eq!(backfill(&[9, 8, 7], 2, &index()), vec![9, 8, 7]);
    }

    #[test]
    fn backfill_stops_when_pool_is_exhausted() {
        assert_eq!(backfill(&[3], 10, &index()), vec![3, 1, 2, 4]);
        assert!(backfill(&[], 3, &PopularityIndex::default()).is_empty());
    }

    #[test]
    fn popular_fill_reports_scores() {
        let fill = popular_fill(&[1], 2, &index());
        assert_eq!(fill, vec![(2, 0.8)]);
    }
}
