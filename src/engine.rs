//! The serving entry point: resolves the blend weight, gathers both candidate
//! lists, fuses them and pads the result from the popularity table.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backfill::popular_fill;
use crate::candidates::{CandidateSource, ContentQuery, collaborative_candidates, content_candidates};
use crate::confidence::ConfidenceEstimator;
use crate::config::{FusionConfig, WeightStrategy};
use crate::error::{FusionError, Result};
use crate::fuser::ScoreFuser;
use crate::history::InteractionHistory;
use crate::model::{ItemId, Provenance, Recommendation, RecommendedItem, UserId};
use crate::popularity::PopularityIndex;

/// Hybrid recommender over a collaborative and a content source.
///
/// Holds no per-request state; one engine can serve concurrent callers.
pub struct FusionEngine {
    collaborative: Arc<dyn CandidateSource>,
    content: Arc<dyn CandidateSource>,
    history: Arc<dyn InteractionHistory>,
    popularity: Arc<PopularityIndex>,
    estimator: ConfidenceEstimator,
    config: FusionConfig,
}

impl std::fmt::Debug for FusionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionEngine")
            .field("popular_items", &self.popularity.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FusionEngine {
    pub fn new(
        collaborative: Arc<dyn CandidateSource>,
        content: Arc<dyn CandidateSource>,
        history: Arc<dyn InteractionHistory>,
        popularity: Arc<PopularityIndex>,
    ) -> Self {
        let config = FusionConfig::default();
        Self {
            collaborative,
            content,
            history,
            popularity,
            estimator: ConfidenceEstimator::new(config.tiers),
            config,
        }
    }

    /// Replaces the default configuration after validating it.
    pub fn with_config(mut self, config: FusionConfig) -> Result<Self> {
        config.validate()?;
        self.estimator = ConfidenceEstimator::new(config.tiers);
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn popularity(&self) -> &PopularityIndex {
        &self.popularity
    }

    /// Up to `n_items` item ids for `user_id`, best first.
    ///
    /// `alpha`, when given, is the collaborative weight for this call and
    /// bypasses the configured weight strategy.
    pub fn recommend(&self, user_id: UserId, n_items: usize, alpha: Option<f64>) -> Result<Vec<ItemId>> {
        Ok(self.explain(user_id, n_items, alpha)?.item_ids())
    }

    /// Same ranking as [`FusionEngine::recommend`], with scores and the
    /// signal each item came from.
    pub fn explain(&self, user_id: UserId, n_items: usize, alpha: Option<f64>) -> Result<Recommendation> {
        if n_items == 0 {
            return Err(FusionError::InvalidArgument(
                "n_items must be greater than zero".to_string(),
            ));
        }
        if let Some(value) = alpha {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(FusionError::InvalidArgument(format!(
                    "alpha must be within [0, 1], got {value}"
                )));
            }
        }

        let resolved_alpha = alpha.unwrap_or_else(|| self.resolve_alpha(user_id));

        let collaborative = collaborative_candidates(
            self.collaborative.as_ref(),
            user_id,
            n_items,
            self.config.collaborative_oversample,
        );
        let content = content_candidates(
            self.content.as_ref(),
            self.history.as_ref(),
            user_id,
            n_items,
            ContentQuery {
                seed_limit: self.config.content_seed_limit,
                per_seed: self.config.content_per_seed,
                pool: self.config.content_pool,
            },
        );

        if collaborative.is_empty() {
            warn!(user_id, "collaborative signal empty; continuing with content and backfill");
        }
        if content.is_empty() {
            warn!(user_id, "content signal empty; continuing with collaborative and backfill");
        }

        let mut fuser = ScoreFuser::new();
        if self.config.use_popularity {
            fuser = fuser.with_popularity(&self.popularity, self.config.missing_popularity);
        }

        let mut items = fuser
            .fuse(&collaborative, &content, resolved_alpha)
            .into_iter()
            .take(n_items)
            .map(|candidate| RecommendedItem {
                item_id: candidate.item_id,
                score: candidate.score,
                source: candidate.provenance(),
                collaborative_rank: candidate.collaborative_rank,
                content_rank: candidate.content_rank,
            })
            .collect::<Vec<_>>();

        let fused_ids = items.iter().map(|item| item.item_id).collect::<Vec<_>>();
        let fill = popular_fill(&fused_ids, n_items, &self.popularity);
        let backfilled = fill.len();
        items.extend(fill.into_iter().map(|(item_id, popularity)| RecommendedItem {
            item_id,
            score: popularity,
            source: Provenance::Popularity,
            collaborative_rank: None,
            content_rank: None,
        }));
        items.truncate(n_items);

        if items.is_empty() {
            warn!(user_id, "no signal and no popular items; returning empty recommendation");
        }

        debug!(
            user_id,
            n_items,
            alpha = resolved_alpha,
            alpha_overridden = alpha.is_some(),
            collaborative = collaborative.len(),
            content = content.len(),
            backfilled,
            returned = items.len(),
            "recommendation computed"
        );

        Ok(Recommendation {
            user_id,
            requested: n_items,
            alpha: resolved_alpha,
            alpha_overridden: alpha.is_some(),
            collaborative_candidates: collaborative.len(),
            content_candidates: content.len(),
            backfilled,
            items,
        })
    }

    fn resolve_alpha(&self, user_id: UserId) -> f64 {
        match self.config.weight_strategy {
            WeightStrategy::Adaptive => self.estimator.confidence(self.history.as_ref(), user_id),
            WeightStrategy::Fixed(weight) => weight,
        }
    }
}
