use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use finrec::model::{ItemId, Recommendation};
use finrec::{
    CooccurrenceSource, FeatureSimilaritySource, FusionConfig, FusionEngine, InteractionLog,
    PopularityIndex, WeightStrategy, store,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{OutputFormat, RecommendArgs, WeightStrategyArg};
use crate::util::resolve_db_path;

#[derive(Debug, Serialize)]
struct RecommendResponse<'a> {
    duration_ms: f64,
    weight_strategy: &'static str,
    use_popularity: bool,
    kinds: BTreeMap<ItemId, &'a str>,
    #[serde(flatten)]
    recommendation: &'a Recommendation,
}

#[derive(Debug)]
struct RecommendOutcome {
    recommendation: Recommendation,
    /// Product kind for every returned item found in the catalog.
    kinds: BTreeMap<ItemId, String>,
    duration_ms: f64,
}

pub fn run(args: RecommendArgs) -> Result<()> {
    let outcome = recommend_from_store(&args)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    match args.format {
        OutputFormat::Json => write_json_response(&mut output, &args, &outcome)?,
        OutputFormat::Text => write_text_response(&mut output, &outcome)?,
    }
    output.flush()?;
    Ok(())
}

fn recommend_from_store(args: &RecommendArgs) -> Result<RecommendOutcome> {
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_deref());
    let connection = store::open_read_only(&db_path)?;

    let items = store::load_items(&connection)?;
    let interactions = store::load_interactions(&connection)?;
    info!(
        items = items.len(),
        interactions = interactions.len(),
        "loaded store"
    );

    let log = InteractionLog::from_interactions(&interactions);
    let engine = FusionEngine::new(
        Arc::new(CooccurrenceSource::from_log(&log)),
        Arc::new(FeatureSimilaritySource::new(&items)),
        Arc::new(log),
        Arc::new(PopularityIndex::from_interactions(&interactions)),
    )
    .with_config(build_config(args))
    .context("invalid recommendation settings")?;

    let started = Instant::now();
    let recommendation = engine
        .explain(args.user_id, args.count, args.alpha)
        .with_context(|| format!("failed to recommend for user {}", args.user_id))?;
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    info!(
        user_id = args.user_id,
        returned = recommendation.items.len(),
        alpha = recommendation.alpha,
        duration_ms,
        "recommendation ready"
    );

    let catalog = items
        .into_iter()
        .map(|item| (item.item_id, item.kind))
        .collect::<BTreeMap<_, _>>();
    let kinds = recommendation
        .items
        .iter()
        .filter_map(|item| {
            catalog
                .get(&item.item_id)
                .map(|kind| (item.item_id, kind.clone()))
        })
        .collect();

    Ok(RecommendOutcome {
        recommendation,
        kinds,
        duration_ms,
    })
}

fn build_config(args: &RecommendArgs) -> FusionConfig {
    let strategy = match args.weight_strategy {
        WeightStrategyArg::Adaptive => WeightStrategy::Adaptive,
        WeightStrategyArg::Fixed => WeightStrategy::Fixed(args.fixed_alpha),
    };
    FusionConfig::default()
        .with_weight_strategy(strategy)
        .with_popularity(args.use_popularity)
}

fn strategy_name(strategy: WeightStrategyArg) -> &'static str {
    match strategy {
        WeightStrategyArg::Adaptive => "adaptive",
        WeightStrategyArg::Fixed => "fixed",
    }
}

fn write_json_response<W: Write>(
    output: &mut W,
    args: &RecommendArgs,
    outcome: &RecommendOutcome,
) -> Result<()> {
    let response = RecommendResponse {
        duration_ms: outcome.duration_ms,
        weight_strategy: strategy_name(args.weight_strategy),
        use_popularity: args.use_popularity,
        kinds: outcome
            .kinds
            .iter()
            .map(|(item_id, kind)| (*item_id, kind.as_str()))
            .collect(),
        recommendation: &outcome.recommendation,
    };

    serde_json::to_writer_pretty(&mut *output, &response)
        .context("failed to serialize recommendation json output")?;
    writeln!(output)?;
    Ok(())
}

fn write_text_response<W: Write>(output: &mut W, outcome: &RecommendOutcome) -> Result<()> {
    let recommendation = &outcome.recommendation;

    writeln!(output, "User: {}", recommendation.user_id)?;
    writeln!(
        output,
        "Signals: alpha={:.2} overridden={} collaborative={} content={} backfilled={} duration_ms={:.3}",
        recommendation.alpha,
        recommendation.alpha_overridden,
        recommendation.collaborative_candidates,
        recommendation.content_candidates,
        recommendation.backfilled,
        outcome.duration_ms,
    )?;
    writeln!(
        output,
        "Results: {} of {}",
        recommendation.items.len(),
        recommendation.requested
    )?;

    for (index, item) in recommendation.items.iter().enumerate() {
        let kind = outcome
            .kinds
            .get(&item.item_id)
            .map(String::as_str)
            .unwrap_or("(uncatalogued)");
        writeln!(
            output,
            "{}.\titem {}\t{}\tsource={} score={:.6}",
            index + 1,
            item.item_id,
            kind,
            item.source.as_str(),
            item.score
        )?;
    }

    Ok(())
}
