use serde::{Deserialize, Serialize};

pub type ItemId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: i64,
}

impl Interaction {
    pub fn new(user_id: UserId, item_id: ItemId, rating: i64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }
}

/// A catalog product with its precomputed feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: ItemId,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<f32>,
}

/// Interchange shape accepted by `finrec ingest`. Interactions are listed
/// oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Collaborative,
    Content,
    Both,
    Popularity,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::Content => "content",
            Self::Both => "both",
            Self::Popularity => "popularity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedItem {
    pub item_id: ItemId,
    pub score: f64,
    pub source: Provenance,
    pub collaborative_rank: Option<usize>,
    pub content_rank: Option<usize>,
}

/// Ranked output of one engine call together with the signal trace that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub user_id: UserId,
    pub requested: usize,
    pub alpha: f64,
    pub alpha_overridden: bool,
    pub collaborative_candidates: usize,
    pub content_candidates: usize,
    pub backfilled: usize,
    pub items: Vec<RecommendedItem>,
}

impl Recommendation {
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.item_id).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCounts {
    pub items: i64,
    pub users: i64,
    pub interactions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub dataset_path: String,
    pub dataset_sha256: String,
    pub db_path: String,
    pub db_schema_version: String,
    pub counts: StoreCounts,
    pub warnings: Vec<String>,
}
