use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "finrec",
    version,
    about = "Hybrid collaborative and content recommendations for financial products"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Recommend(RecommendArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/finrec")]
    pub cache_root: PathBuf,

    /// JSON file with `items` and `interactions` arrays.
    #[arg(long)]
    pub dataset: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum WeightStrategyArg {
    Adaptive,
    Fixed,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Args, Debug, Clone)]
pub struct RecommendArgs {
    #[arg(long, default_value = ".cache/finrec")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub user_id: i64,

    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Collaborative weight for this request; overrides the strategy.
    #[arg(long)]
    pub alpha: Option<f64>,

    #[arg(long, value_enum, default_value_t = WeightStrategyArg::Adaptive)]
    pub weight_strategy: WeightStrategyArg,

    #[arg(long, default_value_t = finrec::config::DEFAULT_FIXED_ALPHA)]
    pub fixed_alpha: f64,

    #[arg(long, default_value_t = false)]
    pub use_popularity: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/finrec")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}
