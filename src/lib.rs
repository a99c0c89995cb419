//! Hybrid financial-product recommendations.
//!
//! Two independently ranked candidate lists, one from a collaborative model
//! and one from a content model, are merged with weighted reciprocal-rank
//! fusion and padded from a popularity table when they run short.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use finrec::{CandidateSource, FusionEngine, InteractionLog, ItemId, PopularityIndex};
//!
//! struct Fixed(Vec<ItemId>);
//!
//! impl CandidateSource for Fixed {
//!     fn recommend(&self, _query_key: i64, count: usize) -> Vec<ItemId> {
//!         self.0.iter().copied().take(count).collect()
//!     }
//! }
//!
//! let engine = FusionEngine::new(
//!     Arc::new(Fixed(vec![10, 20, 30])),
//!     Arc::new(Fixed(vec![20, 40])),
//!     Arc::new(InteractionLog::default()),
//!     Arc::new(PopularityIndex::build([(50, 1.0)])),
//! );
//!
//! // No history for user 1: the content path is empty, so the result is the
//! // collaborative order padded with popular items.
//! let items = engine.recommend(1, 4, None).unwrap();
//! assert_eq!(items, vec![10, 20, 30, 50]);
//! ```

pub mod backfill;
pub mod candidates;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod fuser;
pub mod history;
pub mod model;
pub mod popularity;
pub mod sources;
pub mod store;

pub use backfill::backfill;
pub use candidates::CandidateSource;
pub use confidence::{ConfidenceEstimator, ConfidenceTiers};
pub use config::{FusionConfig, WeightStrategy};
pub use engine::FusionEngine;
pub use error::{FusionError, Result};
pub use fuser::ScoreFuser;
pub use history::{InteractionHistory, InteractionLog};
pub use model::{Interaction, ItemId, ItemRecord, Provenance, Recommendation, UserId};
pub use popularity::PopularityIndex;
pub use sources::{CooccurrenceSource, FeatureSimilaritySource};
