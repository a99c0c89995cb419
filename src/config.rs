use crate::confidence::ConfidenceTiers;
use crate::error::{FusionError, Result};

/// How the collaborative blend weight is chosen when a call does not
/// supply one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WeightStrategy {
    /// Tier the weight by the user's history size.
    #[default]
    Adaptive,
    /// Use the same weight for every user.
    Fixed(f64),
}

/// Weight used by [`WeightStrategy::Fixed`] when none is given.
pub const DEFAULT_FIXED_ALPHA: f64 = 0.6;

/// Popularity assumed for items missing from the popularity table.
pub const DEFAULT_MISSING_POPULARITY: f64 = 0.1;

/// Engine configuration.
///
/// ```rust
/// use finrec::{FusionConfig, WeightStrategy};
///
/// let config = FusionConfig::default()
///     .with_weight_strategy(WeightStrategy::Fixed(0.6))
///     .with_popularity(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    pub weight_strategy: WeightStrategy,
    pub use_popularity: bool,
    /// Collaborative candidates requested per wanted item.
    pub collaborative_oversample: usize,
    /// Similar items requested per content seed, per wanted item.
    pub content_per_seed: usize,
    /// Content pool kept after frequency ranking, per wanted item.
    pub content_pool: usize,
    /// Maximum number of history items used as content seeds.
    pub content_seed_limit: usize,
    pub missing_popularity: f64,
    pub tiers: ConfidenceTiers,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weight_strategy: WeightStrategy::Adaptive,
            use_popularity: false,
            collaborative_oversample: 3,
            content_per_seed: 2,
            content_pool: 3,
            content_seed_limit: 5,
            missing_popularity: DEFAULT_MISSING_POPULARITY,
            tiers: ConfidenceTiers::default(),
        }
    }
}

impl FusionConfig {
    #[must_use]
    pub fn with_weight_strategy(mut self, strategy: WeightStrategy) -> Self {
        self.weight_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_popularity(mut self, enabled: bool) -> Self {
        self.use_popularity = enabled;
        self
    }

    #[must_use]
    pub fn with_collaborative_oversample(mut self, factor: usize) -> Self {
        self.collaborative_oversample = factor;
        self
    }

    #[must_use]
    pub fn with_content_per_seed(mut self, factor: usize) -> Self {
        self.content_per_seed = factor;
        self
    }

    #[must_use]
    pub fn with_content_pool(mut self, factor: usize) -> Self {
        self.content_pool = factor;
        self
    }

    #[must_use]
    pub fn with_missing_popularity(mut self, popularity: f64) -> Self {
        self.missing_popularity = popularity;
        self
    }

    #[must_use]
    pub fn with_content_seed_limit(mut self, limit: usize) -> Self {
        self.content_seed_limit = limit;
        self
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: ConfidenceTiers) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let WeightStrategy::Fixed(weight) = self.weight_strategy {
            check_unit_weight("fixed weight", weight)?;
        }
        check_unit_weight("missing popularity", self.missing_popularity)?;
        check_unit_weight("sparse tier weight", self.tiers.sparse_weight)?;
        check_unit_weight("balanced tier weight", self.tiers.balanced_weight)?;
        check_unit_weight("rich tier weight", self.tiers.rich_weight)?;

        if self.tiers.balanced_from > self.tiers.rich_from {
            return Err(FusionError::InvalidConfig(format!(
                "balanced tier starts at {} but rich tier starts at {}",
                self.tiers.balanced_from, self.tiers.rich_from
            )));
        }

        for (name, factor) in [
            ("collaborative oversample", self.collaborative_oversample),
            ("content per-seed factor", self.content_per_seed),
            ("content pool factor", self.content_pool),
        ] {
            if factor == 0 {
                return Err(FusionError::InvalidConfig(format!("{name} must be >= 1")));
            }
        }

        Ok(())
    }
}

fn check_unit_weight(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FusionError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weight_strategy, WeightStrategy::Adaptive);
        assert!(!config.use_popularity);
    }

    #[test]
    fn builders_set_content_and_popularity_fields() {
        let config = FusionConfig::default()
            .with_content_per_seed(4)
            .with_content_pool(5)
            .with_missing_popularity(0.25)
            .with_content_seed_limit(3);
        assert_eq!(config.content_per_seed, 4);
        assert_eq!(config.content_pool, 5);
        assert_eq!(config.missing_popularity, 0.25);
        assert_eq!(config.content_seed_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let config = FusionConfig::default().with_weight_strategy(WeightStrategy::Fixed(1.5));
        assert!(matches!(
            config.validate(),
            Err(FusionError::InvalidConfig(_))
        ));

        let config = FusionConfig::default().with_collaborative_oversample(0);
        assert!(config.validate().is_err());
        assert!(FusionConfig::default().with_content_pool(0).validate().is_err());
        assert!(FusionConfig::default().with_content_per_seed(0).validate().is_err());
        assert!(FusionConfig::default().with_missing_popularity(-0.1).validate().is_err());

        let tiers = ConfidenceTiers {
            balanced_from: 30,
            ..ConfidenceTiers::default()
        };
        assert!(FusionConfig::default().with_tiers(tiers).validate().is_err());
    }
}
